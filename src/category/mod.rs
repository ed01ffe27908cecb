//! Expense categories.

mod create;
mod db;
mod domain;
mod list;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    DEFAULT_CATEGORIES, create_category_table, get_all_categories, insert_category,
    seed_default_categories,
};
pub use domain::{Category, CategoryId, CategoryName};
pub use list::get_categories_page;
