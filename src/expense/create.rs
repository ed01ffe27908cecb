//! The page and endpoint for recording an expense.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    category::{Category, CategoryId},
    endpoints,
    expense::NewExpense,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner, money_input,
    },
    limit::record_expense,
    money::Amount,
    navigation::NavBar,
    store::{RecordStore, SqliteStore},
    timezone::local_today,
};

/// The state needed to show the expense form and record expenses.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub store: SqliteStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// The amount as typed, validated by [Amount].
    pub amount: String,
    pub date: Date,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// Renders the page for recording an expense.
pub async fn get_new_expense_page(
    State(state): State<CreateExpenseState>,
) -> Result<Response, Error> {
    let categories = state
        .store
        .get_categories()
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let today = local_today(&state.local_timezone)?;

    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = expense_form_view(today, &categories, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("New Expense", &[], &content).into_response())
}

/// A route handler for recording an expense.
///
/// Redirects to the expense history, unless the expense took a limit that is
/// active today over its cap. In that case a fresh form is returned together
/// with a warning.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let categories = match state.store.get_categories() {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Failed to retrieve categories: {error}");
            return error.into_alert_response();
        }
    };

    let amount = match form.amount.parse::<Amount>() {
        Ok(amount) => amount,
        Err(error) => {
            return expense_form_view(today, &categories, &format!("Error: {error}"))
                .into_response();
        }
    };

    let new_expense = NewExpense {
        owner: user_id,
        category_id: form.category_id,
        amount,
        description: form.description.trim().to_owned(),
        date: form.date,
    };

    let recorded = match record_expense(&state.store, new_expense, today) {
        Ok(recorded) => recorded,
        Err(error) => {
            tracing::error!("could not record expense: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!(
        "Recorded expense {} of {} on {}",
        recorded.expense.id,
        recorded.expense.amount,
        recorded.expense.date
    );

    if recorded.limit_exceeded {
        let alert = Alert::Warning {
            message: "Limit exceeded".to_owned(),
            details: "This expense puts you over one of your current spending limits. \
                Check the limits page to see where you stand."
                .to_owned(),
        };

        return Html(
            html! {
                (expense_form_view(today, &categories, ""))
                (alert.into_html())
            }
            .into_string(),
        )
        .into_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn expense_form_view(max_date: Date, categories: &[Category], error_message: &str) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::EXPENSES_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Expense" }

            div
            {
                label
                    for="amount"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount"
                }

                (money_input("amount", ""))
            }

            div
            {
                label
                    for="date"
                    class=(FORM_LABEL_STYLE)
                {
                    "Date"
                }

                input
                    name="date"
                    id="date"
                    type="date"
                    max=(max_date)
                    required
                    value=(max_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="description"
                    class=(FORM_LABEL_STYLE)
                {
                    "Description"
                }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="category_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category"
                }

                select
                    name="category_id"
                    id="category_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "No category" }

                    @for category in categories {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span
                    id="indicator"
                    class="inline htmx-indicator"
                {
                    (spinner)
                }
                " Add Expense"
            }
        }
    }
}


#[cfg(test)]
mod create_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        auth::UserID,
        db::initialize,
        endpoints,
        expense::{
            create::{CreateExpenseState, ExpenseForm},
            create_expense_endpoint,
        },
        limit::{NewLimit, create_limit, month_containing},
        money::Amount,
        store::{ExpenseQuery, RecordStore, SqliteStore},
        test_utils::{
            assert_form_error_message, assert_hx_redirect, must_get_form, parse_html_fragment,
        },
    };

    fn get_state() -> CreateExpenseState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute(
                "INSERT INTO user (id, name, email, password) VALUES (1, 'Ana', 'ana@example.com', 'x')",
                [],
            )
            .unwrap();

        CreateExpenseState {
            store: SqliteStore::new(Arc::new(Mutex::new(connection))),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn form(amount: &str) -> ExpenseForm {
        ExpenseForm {
            amount: amount.to_owned(),
            date: OffsetDateTime::now_utc().date(),
            description: "Lunch".to_owned(),
            category_id: None,
        }
    }

    #[tokio::test]
    async fn records_expense_and_redirects() {
        let state = get_state();

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Form(form("12.30")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        let expenses = state
            .store
            .query_expenses(&ExpenseQuery::for_owner(UserID::new(1)))
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount.as_decimal(), dec!(12.30));
        assert_eq!(expenses[0].description, "Lunch");
    }

    #[tokio::test]
    async fn rejects_non_positive_amount_without_storing() {
        let state = get_state();

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Form(form("0")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: amount must be greater than zero, got 0");
        assert!(
            state
                .store
                .query_expenses(&ExpenseQuery::for_owner(UserID::new(1)))
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn rejects_oversized_and_fractional_cent_amounts_without_storing() {
        let state = get_state();

        for (amount, want_error) in [
            (
                "79228162514264337593543950335",
                "Error: amount must be at most 1000000000, got 79228162514264337593543950335",
            ),
            (
                "0.001",
                "Error: amount must have at most two decimal places, got 0.001",
            ),
        ] {
            let response = create_expense_endpoint(
                State(state.clone()),
                Extension(UserID::new(1)),
                Form(form(amount)),
            )
            .await;

            assert_eq!(response.status(), StatusCode::OK);
            let html = parse_html_fragment(response).await;
            let form = must_get_form(&html);
            assert_form_error_message(&form, want_error);
        }

        assert!(
            state
                .store
                .query_expenses(&ExpenseQuery::for_owner(UserID::new(1)))
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let state = get_state();
        let mut form = form("5");
        form.category_id = Some(999);

        let response =
            create_expense_endpoint(State(state), Extension(UserID::new(1)), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn warns_when_active_limit_is_exceeded() {
        let state = get_state();
        let today = OffsetDateTime::now_utc().date();
        let limit = create_limit(
            &state.store,
            NewLimit {
                owner: UserID::new(1),
                cap: Amount::new_unchecked(dec!(10.00)),
                period: month_containing(today),
            },
        )
        .unwrap();

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Form(form("10.01")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let alert_title = html
            .select(&Selector::parse("[role=alert] p").unwrap())
            .next()
            .expect("warning alert missing")
            .text()
            .collect::<String>();
        assert_eq!(alert_title, "Limit exceeded");
        must_get_form(&html);

        let limit = state.store.get_limit(limit.id, UserID::new(1)).unwrap();
        assert_eq!(limit.accumulated_spend, dec!(10.01));
    }
}
