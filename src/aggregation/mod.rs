//! Pure functions for summarising records.
//!
//! Everything here works on a slice of records that has already been loaded,
//! never does I/O and never reads the clock: callers pass the reference date
//! in. Dirty data degrades instead of failing. Unreadable dates never match
//! a window, malformed amounts count as zero and records without a category
//! are grouped under [UNCATEGORIZED_LABEL].

mod currency;
mod totals;
mod window;

pub use currency::{CurrencyFormat, DigitGrouping};
pub use totals::{GroupTotal, UNCATEGORIZED_LABEL, category_key, group_totals, total};
pub use window::{RecordFilter, Window, WindowKind, YearMonth, select_window};
