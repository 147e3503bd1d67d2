use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The date an expense happened, kept exactly as it was written.
///
/// Some clients send a bare date (`2024-03-01`) and others a full timestamp
/// (`2024-03-01T18:30:00.000Z`). Only the calendar date as written matters
/// when matching against a window, no timezone conversion is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurredOn(String);

impl OccurredOn {
    /// Wrap the raw date text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The raw text of the date.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The calendar date, or `None` if the text does not start with a
    /// `YYYY-MM-DD` date optionally followed by a time introduced by `T` or a space.
    pub fn calendar_date(&self) -> Option<Date> {
        let text = self.0.trim();
        let (date_part, rest) = text.split_at_checked(10)?;

        if !(rest.is_empty() || rest.starts_with(['T', 't', ' '])) {
            return None;
        }

        Date::parse(date_part, DATE_FORMAT).ok()
    }
}

impl From<Date> for OccurredOn {
    fn from(date: Date) -> Self {
        // Only fails for years outside 0-9999.
        let text = date
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| date.to_string());

        Self(text)
    }
}

impl From<&str> for OccurredOn {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for OccurredOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for OccurredOn {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for OccurredOn {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}
