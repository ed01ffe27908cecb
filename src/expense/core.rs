//! Core expense domain types.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{auth::UserID, category::CategoryId, database_id::DatabaseId, money::Amount};

/// Database identifier for an expense.
pub type ExpenseId = DatabaseId;

/// Money a user spent on a given day.
///
/// Expenses are never edited. To correct one, delete it and record it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner: UserID,
    pub category_id: Option<CategoryId>,
    pub amount: Amount,
    pub description: String,
    pub date: Date,
}

/// An expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub owner: UserID,
    pub category_id: Option<CategoryId>,
    pub amount: Amount,
    pub description: String,
    pub date: Date,
}

impl NewExpense {
    /// Attach the ID the store assigned.
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            owner: self.owner,
            category_id: self.category_id,
            amount: self.amount,
            description: self.description,
            date: self.date,
        }
    }
}
