//! Recording, listing and deleting expenses.

mod core;
mod create;
mod db;
mod delete;
mod list;
mod summary;

pub use core::{Expense, ExpenseId, NewExpense};
pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{create_expense_table, delete_expense, get_expense, insert_expense, query_expenses};
pub use delete::delete_expense_endpoint;
pub use list::get_expenses_page;
pub use summary::{category_label, spend_by_category, total_spend};
