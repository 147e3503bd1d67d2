//! Selecting the records that fall inside a day or a month.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month};

use crate::{Error, record::Record};

/// The kinds of window records can be selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// A single calendar date.
    Day,
    /// A calendar month.
    Month,
}

impl FromStr for WindowKind {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "day" => Ok(WindowKind::Day),
            "month" => Ok(WindowKind::Month),
            _ => Err(Error::UnknownWindowKind(text.to_owned())),
        }
    }
}

/// A year and month, written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    /// Create a year and month.
    pub const fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that `date` falls in.
    pub fn of(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the year.
    pub fn month(&self) -> Month {
        self.month
    }

    /// Whether `date` falls in this month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;

        let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !is_digits(year) || !is_digits(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self::new(year, month))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A day or month to select records by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Records that happened on this date.
    Day(Date),
    /// Records that happened in this month.
    Month(YearMonth),
}

impl Window {
    /// The window of `kind` that contains `reference`.
    pub fn new(kind: WindowKind, reference: Date) -> Self {
        match kind {
            WindowKind::Day => Window::Day(reference),
            WindowKind::Month => Window::Month(YearMonth::of(reference)),
        }
    }

    /// Which kind of window this is.
    pub fn kind(&self) -> WindowKind {
        match self {
            Window::Day(_) => WindowKind::Day,
            Window::Month(_) => WindowKind::Month,
        }
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: Date) -> bool {
        match self {
            Window::Day(day) => *day == date,
            Window::Month(month) => month.contains(date),
        }
    }

    /// Whether `record` happened inside the window.
    ///
    /// Records whose date cannot be read never match.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .occurred_on
            .calendar_date()
            .is_some_and(|date| self.contains(date))
    }
}

/// Exact match constraints on a record's labels.
///
/// `None` means no constraint. Comparison is case sensitive and a record
/// without the label never satisfies a constraint on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Only records with exactly this category.
    pub category: Option<String>,
    /// Only records with exactly this payment method.
    pub payment_method: Option<String>,
}

impl RecordFilter {
    /// A filter that lets every record through.
    pub fn none() -> Self {
        Self::default()
    }

    /// Require the category to be exactly `category`.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    /// Require the payment method to be exactly `payment_method`.
    pub fn payment_method(mut self, payment_method: &str) -> Self {
        self.payment_method = Some(payment_method.to_owned());
        self
    }

    /// Whether `record` satisfies every constraint.
    pub fn matches(&self, record: &Record) -> bool {
        label_matches(self.category.as_deref(), record.category.as_deref())
            && label_matches(
                self.payment_method.as_deref(),
                record.payment_method.as_deref(),
            )
    }
}

fn label_matches(wanted: Option<&str>, label: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => label == Some(wanted),
    }
}

/// The records that fall inside `window` and pass `filter`, in input order.
///
/// Records with an unreadable date are never selected. This never fails,
/// no matches gives an empty list.
pub fn select_window<'a>(
    records: &'a [Record],
    window: &Window,
    filter: &RecordFilter,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| window.matches(record) && filter.matches(record))
        .collect()
}
