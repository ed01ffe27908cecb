//! A [RecordStore] backed by the application's SQLite connection.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    category::{self, Category, CategoryName},
    expense::{self, Expense, ExpenseId, NewExpense},
    limit::{self, BudgetLimit, LimitId, NewLimit},
    reward::{self, NewReward, Reward},
    store::{ExpenseQuery, LimitQuery, RecordStore, RewardQuery},
};

/// Shares the server's database connection.
///
/// The lock is held for a single call only.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl RecordStore for SqliteStore {
    fn insert_expense(&self, expense: NewExpense) -> Result<Expense, Error> {
        let connection = self.lock()?;
        expense::insert_expense(expense, &connection)
    }

    fn get_expense(&self, id: ExpenseId, owner: UserID) -> Result<Expense, Error> {
        let connection = self.lock()?;
        expense::get_expense(id, owner, &connection)
    }

    fn delete_expense(&self, id: ExpenseId, owner: UserID) -> Result<(), Error> {
        let connection = self.lock()?;
        expense::delete_expense(id, owner, &connection)
    }

    fn query_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, Error> {
        let connection = self.lock()?;
        expense::query_expenses(query, &connection)
    }

    fn insert_limit(
        &self,
        limit: NewLimit,
        accumulated_spend: Decimal,
    ) -> Result<BudgetLimit, Error> {
        let connection = self.lock()?;
        limit::insert_limit(limit, accumulated_spend, &connection)
    }

    fn get_limit(&self, id: LimitId, owner: UserID) -> Result<BudgetLimit, Error> {
        let connection = self.lock()?;
        limit::get_limit(id, owner, &connection)
    }

    fn update_accumulated_spend(
        &self,
        id: LimitId,
        accumulated_spend: Decimal,
    ) -> Result<(), Error> {
        let connection = self.lock()?;
        limit::update_accumulated_spend(id, accumulated_spend, &connection)
    }

    fn query_limits(&self, query: &LimitQuery) -> Result<Vec<BudgetLimit>, Error> {
        let connection = self.lock()?;
        limit::query_limits(query, &connection)
    }

    fn insert_reward(&self, reward: NewReward) -> Result<Reward, Error> {
        let connection = self.lock()?;
        reward::insert_reward(reward, &connection)
    }

    fn query_rewards(&self, query: &RewardQuery) -> Result<Vec<Reward>, Error> {
        let connection = self.lock()?;
        reward::query_rewards(query, &connection)
    }

    fn insert_category(&self, name: CategoryName, description: &str) -> Result<Category, Error> {
        let connection = self.lock()?;
        category::insert_category(name, description, &connection)
    }

    fn get_categories(&self) -> Result<Vec<Category>, Error> {
        let connection = self.lock()?;
        category::get_all_categories(&connection)
    }
}
