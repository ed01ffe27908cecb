//! An in-memory [RecordStore] for tests.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryName, DEFAULT_CATEGORIES},
    expense::{Expense, ExpenseId, NewExpense},
    limit::{BudgetLimit, LimitId, NewLimit},
    reward::{NewReward, Reward},
    store::{ExpenseQuery, LimitQuery, RecordStore, RewardQuery},
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    expenses: Vec<Expense>,
    limits: Vec<BudgetLimit>,
    rewards: Vec<Reward>,
    categories: Vec<Category>,
    failing_limits: HashSet<LimitId>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Keeps every table in a vector behind a mutex.
///
/// Mirrors the constraints of the SQLite schema that the core operations
/// rely on: owner scoping, one reward per source and unique category names.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create a store holding only the default categories.
    pub fn new() -> Self {
        let mut tables = Tables::default();

        for (name, description) in DEFAULT_CATEGORIES {
            let id = tables.next_id();
            tables.categories.push(Category {
                id,
                name: CategoryName::new_unchecked(name),
                description: description.to_owned(),
            });
        }

        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Make every later [RecordStore::update_accumulated_spend] for `limit_id` fail.
    pub fn fail_updates_for(&self, limit_id: LimitId) {
        self.lock().failing_limits.insert(limit_id);
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store lock poisoned")
    }
}

impl RecordStore for MemoryStore {
    fn insert_expense(&self, expense: NewExpense) -> Result<Expense, Error> {
        let mut tables = self.lock();

        if let Some(category_id) = expense.category_id {
            if !tables.categories.iter().any(|category| category.id == category_id) {
                return Err(Error::InvalidCategory);
            }
        }

        let id = tables.next_id();
        let expense = expense.into_expense(id);
        tables.expenses.push(expense.clone());

        Ok(expense)
    }

    fn get_expense(&self, id: ExpenseId, owner: UserID) -> Result<Expense, Error> {
        self.lock()
            .expenses
            .iter()
            .find(|expense| expense.id == id && expense.owner == owner)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn delete_expense(&self, id: ExpenseId, owner: UserID) -> Result<(), Error> {
        let mut tables = self.lock();
        let count_before = tables.expenses.len();
        tables
            .expenses
            .retain(|expense| !(expense.id == id && expense.owner == owner));

        if tables.expenses.len() == count_before {
            return Err(Error::DeleteMissingExpense);
        }

        Ok(())
    }

    fn query_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, Error> {
        let mut expenses = self
            .lock()
            .expenses
            .iter()
            .filter(|expense| expense.owner == query.owner)
            .filter(|expense| {
                query
                    .date_range
                    .as_ref()
                    .is_none_or(|range| range.contains(&expense.date))
            })
            .cloned()
            .collect::<Vec<_>>();

        if query.newest_first {
            expenses.sort_by_key(|expense| std::cmp::Reverse((expense.date, expense.id)));
        }

        if let Some(limit) = query.limit {
            expenses.truncate(limit as usize);
        }

        Ok(expenses)
    }

    fn insert_limit(
        &self,
        limit: NewLimit,
        accumulated_spend: Decimal,
    ) -> Result<BudgetLimit, Error> {
        let mut tables = self.lock();
        let id = tables.next_id();
        let limit = limit.into_limit(id, accumulated_spend);
        tables.limits.push(limit.clone());

        Ok(limit)
    }

    fn get_limit(&self, id: LimitId, owner: UserID) -> Result<BudgetLimit, Error> {
        self.lock()
            .limits
            .iter()
            .find(|limit| limit.id == id && limit.owner == owner)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn update_accumulated_spend(
        &self,
        id: LimitId,
        accumulated_spend: Decimal,
    ) -> Result<(), Error> {
        let mut tables = self.lock();

        if tables.failing_limits.contains(&id) {
            return Err(Error::SqlError(rusqlite::Error::ExecuteReturnedResults));
        }

        let limit = tables
            .limits
            .iter_mut()
            .find(|limit| limit.id == id)
            .ok_or(Error::UpdateMissingLimit)?;
        limit.accumulated_spend = accumulated_spend;

        Ok(())
    }

    fn query_limits(&self, query: &LimitQuery) -> Result<Vec<BudgetLimit>, Error> {
        let mut limits = self
            .lock()
            .limits
            .iter()
            .filter(|limit| limit.owner == query.owner)
            .filter(|limit| {
                query
                    .containing_date
                    .is_none_or(|date| limit.period.contains(date))
            })
            .filter(|limit| {
                query
                    .ended_before
                    .is_none_or(|date| limit.period.end() < date)
            })
            .cloned()
            .collect::<Vec<_>>();

        limits.sort_by_key(|limit| std::cmp::Reverse((limit.period.start(), limit.id)));

        Ok(limits)
    }

    fn insert_reward(&self, reward: NewReward) -> Result<Reward, Error> {
        let mut tables = self.lock();

        if reward.source.is_some()
            && tables
                .rewards
                .iter()
                .any(|existing| existing.owner == reward.owner && existing.source == reward.source)
        {
            return Err(Error::DuplicateRewardSource);
        }

        let id = tables.next_id();
        let reward = reward.into_reward(id);
        tables.rewards.push(reward.clone());

        Ok(reward)
    }

    fn query_rewards(&self, query: &RewardQuery) -> Result<Vec<Reward>, Error> {
        let mut rewards = self
            .lock()
            .rewards
            .iter()
            .filter(|reward| reward.owner == query.owner)
            .filter(|reward| query.source.is_none() || reward.source == query.source)
            .cloned()
            .collect::<Vec<_>>();

        rewards.sort_by_key(|reward| std::cmp::Reverse((reward.granted_date, reward.id)));

        Ok(rewards)
    }

    fn insert_category(&self, name: CategoryName, description: &str) -> Result<Category, Error> {
        let mut tables = self.lock();

        if tables
            .categories
            .iter()
            .any(|category| category.name.as_ref().eq_ignore_ascii_case(name.as_ref()))
        {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }

        let id = tables.next_id();
        let category = Category {
            id,
            name,
            description: description.trim().to_owned(),
        };
        tables.categories.push(category.clone());

        Ok(category)
    }

    fn get_categories(&self) -> Result<Vec<Category>, Error> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by_key(|category| category.name.as_ref().to_lowercase());

        Ok(categories)
    }
}
