//! Locale independent formatting of money amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// How the digits before the decimal point are split up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DigitGrouping {
    /// Groups of three: `1,234,567`.
    Thousands,
    /// The last three digits, then groups of two: `12,34,567`.
    #[default]
    Indian,
}

/// Formats amounts as money, e.g. `₹1,23,456.70`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    /// The currency symbol placed before the digits.
    pub symbol: String,
    /// How to group the integer digits.
    pub grouping: DigitGrouping,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "₹".to_owned(),
            grouping: DigitGrouping::Indian,
        }
    }
}

impl CurrencyFormat {
    /// Create a currency format.
    pub fn new(symbol: &str, grouping: DigitGrouping) -> Self {
        Self {
            symbol: symbol.to_owned(),
            grouping,
        }
    }

    /// Format `amount` rounded half away from zero to two decimal places.
    ///
    /// Negative amounts get a leading `-` before the symbol. The decimal
    /// point is always `.` regardless of the system locale.
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        let mut magnitude = rounded.abs();
        magnitude.rescale(2);
        let digits = magnitude.to_string();
        let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        format!(
            "{sign}{}{}.{fraction}",
            self.symbol,
            group_digits(integer, self.grouping)
        )
    }
}

fn group_digits(integer: &str, grouping: DigitGrouping) -> String {
    if integer.len() <= 3 {
        return integer.to_owned();
    }

    let group_size = match grouping {
        DigitGrouping::Thousands => 3,
        DigitGrouping::Indian => 2,
    };

    let (mut rest, last_three) = integer.split_at(integer.len() - 3);
    let mut groups = vec![last_three];

    while rest.len() > group_size {
        let (head, group) = rest.split_at(rest.len() - group_size);
        groups.push(group);
        rest = head;
    }

    groups.push(rest);
    groups.reverse();
    groups.join(",")
}
