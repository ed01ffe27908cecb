//! The record store that the ledger, reward evaluator and assistant read and write through.
//!
//! Core operations take a `&impl RecordStore` so that tests can swap the SQLite
//! backed [SqliteStore] for the in-memory [MemoryStore].

use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryName},
    expense::{Expense, ExpenseId, NewExpense},
    limit::{BudgetLimit, LimitId, NewLimit},
    reward::{NewReward, Reward, RewardSource},
};

#[cfg(test)]
mod memory;
mod sqlite;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Filtered reads, inserts, updates and deletes over expenses, limits, rewards and categories.
///
/// Each call stands alone. No transaction spans multiple calls.
pub trait RecordStore {
    /// Create a new expense in the store.
    fn insert_expense(&self, expense: NewExpense) -> Result<Expense, Error>;

    /// Retrieve one of `owner`'s expenses.
    ///
    /// Returns [Error::NotFound] if the expense does not exist or belongs to someone else.
    fn get_expense(&self, id: ExpenseId, owner: UserID) -> Result<Expense, Error>;

    /// Delete one of `owner`'s expenses.
    ///
    /// Returns [Error::DeleteMissingExpense] if there was nothing to delete.
    fn delete_expense(&self, id: ExpenseId, owner: UserID) -> Result<(), Error>;

    /// Retrieve expenses in the way defined by `query`.
    fn query_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, Error>;

    /// Create a new limit with its cached spend already computed.
    fn insert_limit(
        &self,
        limit: NewLimit,
        accumulated_spend: Decimal,
    ) -> Result<BudgetLimit, Error>;

    /// Retrieve one of `owner`'s limits.
    fn get_limit(&self, id: LimitId, owner: UserID) -> Result<BudgetLimit, Error>;

    /// Overwrite the cached spend of a limit.
    ///
    /// Returns [Error::UpdateMissingLimit] if the limit does not exist.
    fn update_accumulated_spend(
        &self,
        id: LimitId,
        accumulated_spend: Decimal,
    ) -> Result<(), Error>;

    /// Retrieve limits in the way defined by `query`, newest period first.
    fn query_limits(&self, query: &LimitQuery) -> Result<Vec<BudgetLimit>, Error>;

    /// Record a reward or a redemption.
    ///
    /// Returns [Error::DuplicateRewardSource] if `owner` already has a reward
    /// from the same source.
    fn insert_reward(&self, reward: NewReward) -> Result<Reward, Error>;

    /// Retrieve rewards in the way defined by `query`, most recent first.
    fn query_rewards(&self, query: &RewardQuery) -> Result<Vec<Reward>, Error>;

    /// Create a category.
    fn insert_category(&self, name: CategoryName, description: &str) -> Result<Category, Error>;

    /// Retrieve all categories ordered by name.
    fn get_categories(&self) -> Result<Vec<Category>, Error>;
}

/// Defines how expenses should be fetched from [RecordStore::query_expenses].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    /// Only expenses owned by this user are returned.
    pub owner: UserID,
    /// Include expenses within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Orders expenses by date, newest first, breaking ties by newest
    /// insertion. Otherwise expenses come back in the order they were stored.
    pub newest_first: bool,
    /// Selects up to the first N (`limit`) expenses.
    pub limit: Option<u64>,
}

impl ExpenseQuery {
    /// A query for all of `owner`'s expenses in storage order.
    pub fn for_owner(owner: UserID) -> Self {
        Self {
            owner,
            date_range: None,
            newest_first: false,
            limit: None,
        }
    }
}

/// Defines how limits should be fetched from [RecordStore::query_limits].
#[derive(Debug, Clone, PartialEq)]
pub struct LimitQuery {
    /// Only limits owned by this user are returned.
    pub owner: UserID,
    /// Only include limits whose period contains this date.
    pub containing_date: Option<Date>,
    /// Only include limits whose period ended strictly before this date.
    pub ended_before: Option<Date>,
}

impl LimitQuery {
    /// A query for all of `owner`'s limits.
    pub fn for_owner(owner: UserID) -> Self {
        Self {
            owner,
            containing_date: None,
            ended_before: None,
        }
    }
}

/// Defines how rewards should be fetched from [RecordStore::query_rewards].
#[derive(Debug, Clone, PartialEq)]
pub struct RewardQuery {
    /// Only rewards owned by this user are returned.
    pub owner: UserID,
    /// Only include the reward produced by this source.
    pub source: Option<RewardSource>,
}

impl RewardQuery {
    /// A query for all of `owner`'s rewards.
    pub fn for_owner(owner: UserID) -> Self {
        Self {
            owner,
            source: None,
        }
    }
}
