//! The expense history page.

use std::collections::HashMap;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    auth::UserID,
    category::CategoryName,
    endpoints::{self, format_endpoint},
    expense::{Expense, total_spend},
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    store::{ExpenseQuery, RecordStore, SqliteStore},
};

/// The state needed for the expense history page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub store: SqliteStore,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
        }
    }
}

/// Render the user's expenses, newest first.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let expenses = state
        .store
        .query_expenses(&ExpenseQuery {
            newest_first: true,
            ..ExpenseQuery::for_owner(user_id)
        })
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;

    let category_names = state
        .store
        .get_categories()
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect::<HashMap<_, _>>();

    Ok(expenses_view(&expenses, &category_names).into_response())
}

fn expenses_view(expenses: &[Expense], category_names: &HashMap<i64, CategoryName>) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let total = total_spend(expenses);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Expenses" }
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (expenses.len()) " expenses totalling " (format_currency(total))
                        }
                    }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                    {
                        "Add Expense"
                    }
                }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class="px-6 py-4 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                        }
                    }

                    tbody
                    {
                        @for expense in expenses {
                            (expense_row_view(expense, category_names))
                        }

                        @if expenses.is_empty() {
                            tr
                            {
                                td colspan="5" class="px-6 py-4 text-center"
                                {
                                    "No expenses yet. "
                                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                                    {
                                        "Add one"
                                    }
                                    "."
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Expenses", &[], &content)
}

fn expense_row_view(expense: &Expense, category_names: &HashMap<i64, CategoryName>) -> Markup {
    let category_name = expense
        .category_id
        .and_then(|category_id| category_names.get(&category_id));

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (expense.date) }
            td class=(TABLE_CELL_STYLE) { (expense.description) }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(name) = category_name {
                    span class=(CATEGORY_BADGE_STYLE) { (name) }
                } @else {
                    "-"
                }
            }
            td class="px-6 py-4 text-right" { (format_currency(expense.amount.as_decimal())) }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(format_endpoint(endpoints::DELETE_EXPENSE, expense.id))
                    hx-confirm="Are you sure you want to delete this expense?"
                    hx-target="closest tr"
                    hx-target-error="#alert-container"
                    hx-swap="delete"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}
