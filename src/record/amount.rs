//! Monetary amounts that tolerate dirty input.
//!
//! Records read from caches or older stores may carry amounts that are not
//! numbers at all. Rather than rejecting such records, [Amount] keeps the raw
//! text around so it can be shown and written back unchanged, and aggregation
//! treats it as zero.

use std::{fmt, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
};

/// The amount of money spent in a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Amount {
    /// A well-formed decimal amount.
    Value(Decimal),
    /// Text that could not be read as a number, kept as written.
    Malformed(String),
    /// No amount was given.
    #[default]
    Missing,
}

impl Amount {
    /// Read an amount from text.
    ///
    /// Surrounding whitespace is ignored, blank text is [Amount::Missing] and
    /// both plain (`12.50`) and scientific (`1.25e1`) notation are accepted.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if text.is_empty() {
            return Amount::Missing;
        }

        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Amount::Value)
            .unwrap_or_else(|_| Amount::Malformed(text.to_owned()))
    }

    /// The amount to use in arithmetic: the decimal value, or zero if the
    /// amount is malformed or missing.
    pub fn value(&self) -> Decimal {
        match self {
            Amount::Value(value) => *value,
            Amount::Malformed(_) | Amount::Missing => Decimal::ZERO,
        }
    }

    /// Whether the amount holds a real number.
    pub fn is_value(&self) -> bool {
        matches!(self, Amount::Value(_))
    }

    fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Amount::Malformed(value.to_string());
        }

        Amount::parse(&value.to_string())
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Value(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Value(value) => write!(f, "{value}"),
            Amount::Malformed(text) => write!(f, "{text}"),
            Amount::Missing => Ok(()),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Amount::Value(value) => exact_decimal::serialize(value, serializer),
            Amount::Malformed(text) => serializer.serialize_str(text),
            Amount::Missing => serializer.serialize_none(),
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an amount of money")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Amount, E> {
        Ok(Amount::Malformed(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
        Ok(Amount::Value(Decimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
        Ok(Amount::Value(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Amount, E> {
        Ok(Amount::from_f64(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
        Ok(Amount::parse(value))
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::Missing)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::Missing)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        Amount::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Amount, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}

        Ok(Amount::Malformed("[array]".to_owned()))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Amount, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}

        Ok(Amount::Malformed("[object]".to_owned()))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Serde helpers for decimals that are written as JSON numbers when a double
/// holds them exactly, and as text otherwise so no digits are lost.
///
/// Use with `#[serde(with = "crate::record::exact_decimal")]`.
pub(crate) mod exact_decimal {
    use std::str::FromStr;

    use rust_decimal::{Decimal, prelude::ToPrimitive};
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::Amount;

    pub(crate) fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match as_exact_f64(*value) {
            Some(number) => serializer.serialize_f64(number),
            None => serializer.serialize_str(&value.to_string()),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Amount::deserialize(deserializer)? {
            Amount::Value(value) => Ok(value),
            Amount::Malformed(text) => Err(de::Error::custom(format!(
                "\"{text}\" is not a decimal number"
            ))),
            Amount::Missing => Err(de::Error::custom("missing decimal number")),
        }
    }

    /// `value` as a double, if the double reads back as the same decimal.
    fn as_exact_f64(value: Decimal) -> Option<f64> {
        let number = value.to_f64()?;
        let read_back = Decimal::from_str(&number.to_string()).ok()?;

        (read_back == value).then_some(number)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Amount::Value(value) => Value::Text(value.to_string()),
            Amount::Malformed(text) => Value::Text(text.clone()),
            Amount::Missing => Value::Null,
        };

        Ok(ToSqlOutput::Owned(value))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Amount::Missing),
            ValueRef::Integer(integer) => Ok(Amount::Value(Decimal::from(integer))),
            ValueRef::Real(real) => Ok(Amount::from_f64(real)),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(Amount::parse)
                .map_err(|error| FromSqlError::Other(Box::new(error))),
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}
