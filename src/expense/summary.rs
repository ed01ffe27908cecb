//! Aggregates over a list of expenses shared by the dashboard and the assistant.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{category::CategoryId, expense::Expense, money::saturating_sum};

/// The label for expenses without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The sum of the amounts of `expenses`.
///
/// Stops at [Decimal::MAX] instead of overflowing.
pub fn total_spend<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Decimal {
    saturating_sum(
        expenses
            .into_iter()
            .map(|expense| expense.amount.as_decimal()),
    )
}

/// The name for `category_id`, falling back to [UNCATEGORIZED_LABEL] for
/// missing or unknown categories.
pub fn category_label(
    category_id: Option<CategoryId>,
    category_names: &HashMap<CategoryId, String>,
) -> &str {
    category_id
        .and_then(|id| category_names.get(&id))
        .map(String::as_str)
        .unwrap_or(UNCATEGORIZED_LABEL)
}

/// Spend per category, largest first. Ties are ordered by name.
pub fn spend_by_category<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
    category_names: &'a HashMap<CategoryId, String>,
) -> Vec<(&'a str, Decimal)> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();

    for expense in expenses {
        let total = totals
            .entry(category_label(expense.category_id, category_names))
            .or_default();
        *total = total.saturating_add(expense.amount.as_decimal());
    }

    let mut totals: Vec<_> = totals.into_iter().collect();
    totals.sort_by(|(name_a, total_a), (name_b, total_b)| {
        total_b.cmp(total_a).then_with(|| name_a.cmp(name_b))
    });

    totals
}
