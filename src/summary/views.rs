//! Builds the daily, monthly and running total summaries from a list of records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    aggregation::{
        CurrencyFormat, RecordFilter, Window, YearMonth, category_key, group_totals,
        select_window, total,
    },
    record::Record,
};

/// The records for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// The day being summarised.
    pub date: Date,
    /// The category filter that was applied, if any.
    pub category: Option<String>,
    /// The payment method filter that was applied, if any.
    pub payment_method: Option<String>,
    /// The matching records, in the order they were listed.
    pub records: Vec<Record>,
    /// How many records matched.
    pub count: usize,
    /// The sum of the matching amounts.
    #[serde(with = "crate::record::exact_decimal")]
    pub total: Decimal,
    /// `total` formatted as money.
    pub total_display: String,
}

/// The spending in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The category name.
    pub category: String,
    /// How many records are in the category.
    pub count: usize,
    /// The sum of the category's amounts.
    #[serde(with = "crate::record::exact_decimal")]
    pub total: Decimal,
    /// `total` formatted as money.
    pub total_display: String,
}

/// The spending in a month, broken down by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The month being summarised.
    pub month: YearMonth,
    /// How many records fall in the month.
    pub count: usize,
    /// The sum of the month's amounts.
    #[serde(with = "crate::record::exact_decimal")]
    pub total: Decimal,
    /// `total` formatted as money.
    pub total_display: String,
    /// Totals per category, largest first.
    pub categories: Vec<CategorySummary>,
}

/// Spending so far today and so far this month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningTotals {
    /// The date treated as today.
    pub today: Date,
    /// How many records fall on `today`.
    pub today_count: usize,
    /// The sum of today's amounts.
    #[serde(with = "crate::record::exact_decimal")]
    pub today_total: Decimal,
    /// `today_total` formatted as money.
    pub today_total_display: String,
    /// The month containing `today`.
    pub month: YearMonth,
    /// How many records fall in `month`.
    pub month_count: usize,
    /// The sum of the month's amounts.
    #[serde(with = "crate::record::exact_decimal")]
    pub month_total: Decimal,
    /// `month_total` formatted as money.
    pub month_total_display: String,
}

/// Summarise the records on `date` that pass `filter`.
pub fn daily_summary(
    records: &[Record],
    date: Date,
    filter: RecordFilter,
    currency: &CurrencyFormat,
) -> DailySummary {
    let selected = select_window(records, &Window::Day(date), &filter);
    let total = total(selected.iter().copied());

    DailySummary {
        date,
        category: filter.category,
        payment_method: filter.payment_method,
        count: selected.len(),
        records: selected.into_iter().cloned().collect(),
        total,
        total_display: currency.format(total),
    }
}

/// Summarise the records in `month` by category.
pub fn monthly_summary(
    records: &[Record],
    month: YearMonth,
    currency: &CurrencyFormat,
) -> MonthlySummary {
    let selected = select_window(records, &Window::Month(month), &RecordFilter::none());
    let total = total(selected.iter().copied());

    let categories = group_totals(selected.iter().copied(), category_key)
        .into_iter()
        .map(|group| CategorySummary {
            total_display: currency.format(group.total),
            category: group.key,
            count: group.count,
            total: group.total,
        })
        .collect();

    MonthlySummary {
        month,
        count: selected.len(),
        total,
        total_display: currency.format(total),
        categories,
    }
}

/// The totals for `today` and for the month containing it.
pub fn running_totals(records: &[Record], today: Date, currency: &CurrencyFormat) -> RunningTotals {
    let month = YearMonth::of(today);
    let today_records = select_window(records, &Window::Day(today), &RecordFilter::none());
    let month_records = select_window(records, &Window::Month(month), &RecordFilter::none());
    let today_total = total(today_records.iter().copied());
    let month_total = total(month_records.iter().copied());

    RunningTotals {
        today,
        today_count: today_records.len(),
        today_total,
        today_total_display: currency.format(today_total),
        month,
        month_count: month_records.len(),
        month_total,
        month_total_display: currency.format(month_total),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::{Month, macros::date};

    use crate::{
        aggregation::{CurrencyFormat, RecordFilter, YearMonth, test_utils::record},
        record::Record,
        summary::{CategorySummary, daily_summary, monthly_summary, running_totals},
    };

    fn records() -> Vec<Record> {
        let mut tea = record(5, "2024-03-20", "20", Some("Food"));
        tea.payment_method = Some("Cash".to_owned());
        let mut fuel = record(4, "2024-03-20T18:30:00.000Z", "1500.5", Some("Transport"));
        fuel.payment_method = Some("Card".to_owned());

        vec![
            tea,
            fuel,
            record(3, "2024-03-15", "50", Some("Food")),
            record(2, "2024-03-01", "100", None),
            record(1, "2024-02-29", "abc", Some("Food")),
            record(0, "someday", "999", Some("Food")),
        ]
    }

    #[test]
    fn daily_summary_counts_and_totals_the_day() {
        let summary = daily_summary(
            &records(),
            date!(2024 - 03 - 20),
            RecordFilter::none(),
            &CurrencyFormat::default(),
        );

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, dec!(1520.5));
        assert_eq!(summary.total_display, "₹1,520.50");
        let ids: Vec<_> = summary.records.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[test]
    fn daily_summary_applies_payment_filter() {
        let summary = daily_summary(
            &records(),
            date!(2024 - 03 - 20),
            RecordFilter::none().payment_method("Cash"),
            &CurrencyFormat::default(),
        );

        assert_eq!(summary.count, 1);
        assert_eq!(summary.total, dec!(20));
        assert_eq!(summary.payment_method.as_deref(), Some("Cash"));
    }

    #[test]
    fn empty_day_totals_zero() {
        let summary = daily_summary(
            &records(),
            date!(2024 - 01 - 01),
            RecordFilter::none(),
            &CurrencyFormat::default(),
        );

        assert_eq!(summary.count, 0);
        assert!(summary.records.is_empty());
        assert_eq!(summary.total_display, "₹0.00");
    }

    #[test]
    fn monthly_summary_breaks_down_by_category() {
        let summary = monthly_summary(
            &records(),
            YearMonth::new(2024, Month::March),
            &CurrencyFormat::default(),
        );

        assert_eq!(summary.count, 4);
        assert_eq!(summary.total, dec!(1670.5));
        assert_eq!(
            summary.categories,
            vec![
                CategorySummary {
                    category: "Transport".to_owned(),
                    count: 1,
                    total: dec!(1500.5),
                    total_display: "₹1,500.50".to_owned(),
                },
                CategorySummary {
                    category: "Uncategorized".to_owned(),
                    count: 1,
                    total: dec!(100),
                    total_display: "₹100.00".to_owned(),
                },
                CategorySummary {
                    category: "Food".to_owned(),
                    count: 2,
                    total: dec!(70),
                    total_display: "₹70.00".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn running_totals_cover_today_and_this_month() {
        let totals = running_totals(&records(), date!(2024 - 03 - 15), &CurrencyFormat::default());

        assert_eq!(totals.today_count, 1);
        assert_eq!(totals.today_total, dec!(50));
        assert_eq!(totals.month, YearMonth::new(2024, Month::March));
        assert_eq!(totals.month_count, 4);
        assert_eq!(totals.month_total, dec!(1670.5));
        assert_eq!(totals.month_total_display, "₹1,670.50");
    }
}
