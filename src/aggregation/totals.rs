//! Summing record amounts, overall and per group.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// The category used for records without one.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The sum of the amounts of `records`.
///
/// Malformed or missing amounts count as zero and an empty sequence sums to zero.
pub fn total<'a>(records: impl IntoIterator<Item = &'a Record>) -> Decimal {
    records
        .into_iter()
        .fold(Decimal::ZERO, |sum, record| {
            sum.saturating_add(record.amount.value())
        })
}

/// The total of one group of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    /// The value the group's records share, e.g. a category name.
    pub key: String,
    /// The sum of the group's amounts.
    #[serde(with = "crate::record::exact_decimal")]
    pub total: Decimal,
    /// How many records are in the group.
    pub count: usize,
}

/// Group `records` by the key `key_extractor` gives each one and total each group.
///
/// Keys are compared exactly, without any normalisation of case or
/// whitespace. Groups are sorted by total, largest first, and groups with
/// equal totals are sorted by key in ascending order.
pub fn group_totals<'a, K>(
    records: impl IntoIterator<Item = &'a Record>,
    mut key_extractor: impl FnMut(&'a Record) -> K,
) -> Vec<GroupTotal>
where
    K: AsRef<str>,
{
    let mut groups: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();

    for record in records {
        let key = key_extractor(record);
        let (sum, count) = groups
            .entry(key.as_ref().to_owned())
            .or_insert((Decimal::ZERO, 0));
        *sum = sum.saturating_add(record.amount.value());
        *count += 1;
    }

    let mut totals: Vec<GroupTotal> = groups
        .into_iter()
        .map(|(key, (total, count))| GroupTotal { key, total, count })
        .collect();

    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));

    totals
}

/// The category of `record`, or [UNCATEGORIZED_LABEL] if it has none.
pub fn category_key(record: &Record) -> &str {
    record
        .category
        .as_deref()
        .filter(|category| !category.is_empty())
        .unwrap_or(UNCATEGORIZED_LABEL)
}
