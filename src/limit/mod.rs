//! Spending limits and the ledger that keeps their spend up to date.

mod core;
mod create;
mod db;
mod ledger;
mod list;

pub use core::{BudgetLimit, LimitId, LimitStatus, NewLimit, Period};
pub use create::{create_limit_endpoint, get_new_limit_page};
pub use db::{create_limit_table, get_limit, insert_limit, query_limits, update_accumulated_spend};
pub use ledger::{
    create_limit, default_limit_period, month_containing, record_expense,
    remove_expense, suggest_cap_from_previous_month,
};
pub use list::get_limits_page;
