//! Integer money amounts and display formatting.
//!
//! All amounts are whole kopeks (minor currency units). Percent arithmetic goes
//! through [`rust_decimal::Decimal`], which is exact for these magnitudes, and is
//! rounded back to kopeks with [`RoundingStrategy::MidpointAwayFromZero`].
//!
//! Locale details (currency symbol, separators) are never read from global state:
//! a [`CurrencyFormat`] is injected into every [`MoneyFormatter`].
//!
//! # Examples
//!
//! ```
//! use cabinet_pricing::money::{CurrencyFormat, Kopeks, MoneyFormatter};
//!
//! let formatter = MoneyFormatter::new(CurrencyFormat::default());
//! assert_eq!(formatter.format(Kopeks::new(123_456)), "1 234,56 ₽");
//! assert_eq!(formatter.format(Kopeks::new(10_000)), "100 ₽");
//! ```

use std::{fmt, iter::Sum};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

/// Number of kopeks in one major currency unit.
const KOPEKS_PER_UNIT: u64 = 100;

/// A non-negative amount of money in kopeks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Kopeks(u64);

impl Kopeks {
    /// Zero kopeks.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw kopek amount.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Converts whole major units (rubles) to kopeks, saturating on overflow.
    #[must_use]
    pub const fn from_major(units: u64) -> Self {
        Self(units.saturating_mul(KOPEKS_PER_UNIT))
    }

    /// Returns the raw kopek amount.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` for a zero amount.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Adds two amounts, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiplies by a unit count, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_mul(self, count: u64) -> Self {
        Self(self.0.saturating_mul(count))
    }

    pub(crate) fn to_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Rounds a decimal amount to whole kopeks, half away from zero.
    ///
    /// Negative values clamp to zero and values beyond `u64::MAX` saturate.
    pub(crate) fn from_decimal_rounded(value: Decimal) -> Self {
        Self(round_half_away(value))
    }
}

impl From<u64> for Kopeks {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl Sum for Kopeks {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Kopeks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rounds to an integer, half away from zero; negatives clamp to zero.
pub(crate) fn round_half_away(value: Decimal) -> u64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() {
        return 0;
    }
    rounded.to_u64().unwrap_or(u64::MAX)
}

/// Where the currency symbol is placed relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// `$12.50`
    Prefix,
    /// `12,50 ₽`
    #[default]
    Suffix,
}

/// Display conventions for a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    /// Currency symbol (e.g. `₽`, `$`).
    pub symbol: String,
    /// Symbol placement.
    pub symbol_position: SymbolPosition,
    /// Separator between groups of three major-unit digits.
    pub thousands_separator: String,
    /// Separator between major and minor units.
    pub decimal_separator: String,
    /// Omit the minor part when it is zero (`100 ₽` instead of `100,00 ₽`).
    pub hide_zero_minor: bool,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "₽".to_owned(),
            symbol_position: SymbolPosition::Suffix,
            thousands_separator: " ".to_owned(),
            decimal_separator: ",".to_owned(),
            hide_zero_minor: true,
        }
    }
}

impl CurrencyFormat {
    /// US-dollar style formatting (`$1,234.56`).
    #[must_use]
    pub fn usd() -> Self {
        Self {
            symbol: "$".to_owned(),
            symbol_position: SymbolPosition::Prefix,
            thousands_separator: ",".to_owned(),
            decimal_separator: ".".to_owned(),
            hide_zero_minor: false,
        }
    }
}

/// Converts kopek amounts to display strings.
#[derive(Debug, Clone, Default)]
pub struct MoneyFormatter {
    format: CurrencyFormat,
}

impl MoneyFormatter {
    /// Creates a formatter for the given currency conventions.
    #[must_use]
    pub const fn new(format: CurrencyFormat) -> Self {
        Self { format }
    }

    /// Returns the currency conventions in use.
    #[must_use]
    pub const fn currency(&self) -> &CurrencyFormat {
        &self.format
    }

    /// Formats an amount.
    #[must_use]
    pub fn format(&self, amount: Kopeks) -> String {
        self.with_symbol(&self.amount_digits(amount.get()))
    }

    /// Formats a signed difference, e.g. `+150 ₽` or `-20,50 ₽`.
    ///
    /// Zero is rendered without a sign.
    #[must_use]
    pub fn format_delta(&self, delta: i64) -> String {
        let digits = self.amount_digits(delta.unsigned_abs());
        let sign = match delta.signum() {
            1 => "+",
            -1 => "-",
            _ => "",
        };
        format!("{sign}{}", self.with_symbol(&digits))
    }

    fn with_symbol(&self, digits: &str) -> String {
        match self.format.symbol_position {
            SymbolPosition::Prefix => format!("{}{digits}", self.format.symbol),
            SymbolPosition::Suffix => format!("{digits} {}", self.format.symbol),
        }
    }

    fn amount_digits(&self, kopeks: u64) -> String {
        let major = group_thousands(kopeks / KOPEKS_PER_UNIT, &self.format.thousands_separator);
        let minor = kopeks % KOPEKS_PER_UNIT;

        if minor == 0 && self.format.hide_zero_minor {
            major
        } else {
            format!("{major}{}{minor:02}", self.format.decimal_separator)
        }
    }
}

fn group_thousands(value: u64, separator: &str) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());

    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(ch);
    }

    grouped
}
