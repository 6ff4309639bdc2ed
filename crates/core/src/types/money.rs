//! Money types: decimal amounts as entered, integer cents as stored.
//!
//! Amounts arrive from forms in whole currency units ("42.50") and are
//! persisted as an integer count of cents (4250) so no floating-point
//! rounding ever reaches the database.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when coercing a raw amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a number.
    #[error("expected a number, received {0:?}")]
    NotANumber(String),
    /// The amount cannot be represented as a 64-bit count of cents.
    #[error("amount is too large")]
    OutOfRange,
}

/// A validated amount in whole currency units (e.g. dollars).
///
/// Construction guarantees the value converts to [`Cents`] without overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Coerce a raw form value into an amount.
    ///
    /// Accepts plain decimals (`"42.50"`, `"-3"`) and scientific
    /// notation (`"1e3"`). Surrounding whitespace is ignored. Digit
    /// separators (`"1_000"`) are not numbers.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotANumber`] if the input is not numeric and
    /// [`AmountError::OutOfRange`] if the cents value would overflow `i64`.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        let trimmed = s.trim();
        if trimmed.contains('_') {
            return Err(AmountError::NotANumber(s.to_owned()));
        }
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| AmountError::NotANumber(s.to_owned()))?;
        Self::from_decimal(value)
    }

    /// Wrap a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::OutOfRange`] if the cents value would overflow `i64`.
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        to_cents(value).ok_or(AmountError::OutOfRange)?;
        Ok(Self(value))
    }

    /// The amount in whole units.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Convert to integer cents: `round(value * 100)`, half away from zero.
    #[must_use]
    pub fn to_cents(self) -> Cents {
        // Range was checked at construction.
        Cents(to_cents(self.0).unwrap_or_default())
    }
}

fn to_cents(value: Decimal) -> Option<i64> {
    value
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An integer number of cents, the persisted form of every amount.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct Cents(i64);

impl Cents {
    /// Create a cents value.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Get the raw number of cents.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Convert back to whole units (`4250` → `42.50`).
    #[must_use]
    pub fn to_units(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Format as US dollars with thousands separators, e.g. `$1,234.56`.
    #[must_use]
    pub fn format_usd(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = (abs / 100).to_string();
        let fraction = abs % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{sign}${grouped}.{fraction:02}")
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_usd())
    }
}

impl From<i64> for Cents {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl From<Cents> for i64 {
    fn from(cents: Cents) -> Self {
        cents.0
    }
}
