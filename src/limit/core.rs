//! Core spending limit types.

use std::fmt::Display;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::DatabaseId,
    money::{self, Amount},
};

/// Database identifier for a spending limit.
pub type LimitId = DatabaseId;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    start: Date,
    end: Date,
}

impl Period {
    /// Create a period from `start` to `end`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidPeriod] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidPeriod { start, end });
        }

        Ok(Self { start, end })
    }

    /// Create a period without checking that `start` is on or before `end`.
    pub fn new_unchecked(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Whether `date` falls inside the period, counting both ends.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A cap on how much a user plans to spend over a period.
///
/// `accumulated_spend` caches the sum of the owner's expenses dated inside
/// the period. It is rewritten from scratch whenever an expense in the
/// period is added or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub id: LimitId,
    pub owner: UserID,
    pub cap: Amount,
    pub period: Period,
    pub accumulated_spend: Decimal,
}

impl BudgetLimit {
    /// The fraction of the cap that has been spent, e.g. 0.8 for 80%.
    ///
    /// Saturates at [Decimal::MAX] rather than overflowing.
    pub fn usage_ratio(&self) -> Decimal {
        money::usage_ratio(self.accumulated_spend, self.cap.as_decimal())
    }

    /// Whether `date` is inside the limit's period.
    pub fn is_active_on(&self, date: Date) -> bool {
        self.period.contains(date)
    }

    /// Whether more than the cap has been spent.
    pub fn is_exceeded(&self) -> bool {
        self.accumulated_spend > self.cap.as_decimal()
    }

    /// Whether the period finished before `today`.
    pub fn has_concluded(&self, today: Date) -> bool {
        self.period.end() < today
    }

    /// How much can still be spent before going over the cap, never below zero.
    pub fn remaining(&self) -> Decimal {
        self.cap
            .as_decimal()
            .saturating_sub(self.accumulated_spend)
            .max(Decimal::ZERO)
    }

    /// How close the spend is to the cap.
    pub fn status(&self) -> LimitStatus {
        let usage_ratio = self.usage_ratio();

        if usage_ratio > Decimal::ONE {
            LimitStatus::Over
        } else if usage_ratio > CAREFUL_USAGE_RATIO {
            LimitStatus::Careful
        } else {
            LimitStatus::Good
        }
    }
}

const CAREFUL_USAGE_RATIO: Decimal = dec!(0.80);

/// A coarse reading of a limit's usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStatus {
    /// At most 80% of the cap has been spent.
    Good,
    /// More than 80% but no more than the cap has been spent.
    Careful,
    /// More than the cap has been spent.
    Over,
}

impl Display for LimitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LimitStatus::Good => "Good",
            LimitStatus::Careful => "Careful",
            LimitStatus::Over => "Over",
        };

        write!(f, "{label}")
    }
}

/// A spending limit that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLimit {
    pub owner: UserID,
    pub cap: Amount,
    pub period: Period,
}

impl NewLimit {
    /// Attach the ID the store assigned and the spend computed at creation.
    pub fn into_limit(self, id: LimitId, accumulated_spend: Decimal) -> BudgetLimit {
        BudgetLimit {
            id,
            owner: self.owner,
            cap: self.cap,
            period: self.period,
            accumulated_spend,
        }
    }
}
