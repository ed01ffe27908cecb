//! Exact money amounts.
//!
//! Amounts are stored in SQLite as TEXT so that sums and ratios never pick up
//! floating point error.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Row, types::Type};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The largest expense or cap that can be entered.
pub const MAX_AMOUNT: Decimal = dec!(1_000_000_000);

/// Amounts are whole cents.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// A positive amount of money in whole cents, e.g. an expense or a limit's cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NonPositiveAmount] if `value` is zero or negative,
    /// an [Error::AmountTooLarge] if it is over [MAX_AMOUNT] and an
    /// [Error::TooManyDecimalPlaces] if it has fractions of a cent.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value <= Decimal::ZERO {
            Err(Error::NonPositiveAmount(value))
        } else if value > MAX_AMOUNT {
            Err(Error::AmountTooLarge(value))
        } else if value.normalize().scale() > MAX_DECIMAL_PLACES {
            Err(Error::TooManyDecimalPlaces(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `value` is greater than zero.
    pub fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value =
            Decimal::from_str(trimmed).map_err(|_| Error::InvalidAmount(trimmed.to_owned()))?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Read a decimal that was stored as TEXT from column `index` of `row`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Round `value` to whole cents, with halves rounded away from zero.
pub fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MAX_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Add up `amounts`.
///
/// # Errors
///
/// Returns an [Error::SpendOverflow] if the total does not fit in a [Decimal].
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, Error> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(Error::SpendOverflow)
}

/// Add up `amounts`, stopping at [Decimal::MAX] for display purposes.
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |total, amount| total.saturating_add(amount))
}

/// `spent` divided by `cap`, or [Decimal::MAX] if the quotient does not fit.
///
/// A zero cap gives zero.
pub fn usage_ratio(spent: Decimal, cap: Decimal) -> Decimal {
    if cap.is_zero() {
        return Decimal::ZERO;
    }

    spent.checked_div(cap).unwrap_or(Decimal::MAX)
}

/// How much of `cap` has been used by `spent`, as a percentage.
pub fn usage_percentage(spent: Decimal, cap: Decimal) -> Decimal {
    usage_ratio(spent, cap).saturating_mul(Decimal::ONE_HUNDRED)
}
