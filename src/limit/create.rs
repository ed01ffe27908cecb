//! The page and endpoint for creating a spending limit.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_currency, loading_spinner, money_input,
    },
    limit::{
        NewLimit, Period, create_limit, default_limit_period, suggest_cap_from_previous_month,
    },
    money::{Amount, round_to_cents},
    navigation::NavBar,
    store::SqliteStore,
    timezone::local_today,
};

/// The state needed to show the limit form and create limits.
#[derive(Debug, Clone)]
pub struct CreateLimitState {
    pub store: SqliteStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateLimitState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a limit.
#[derive(Debug, Deserialize)]
pub struct LimitForm {
    pub cap: String,
    pub period_start: Date,
    pub period_end: Date,
}

/// Renders the page for creating a limit.
///
/// The period defaults to the current month and the cap is pre-filled with
/// what was spent last month.
pub async fn get_new_limit_page(
    State(state): State<CreateLimitState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let suggested_cap = suggest_cap_from_previous_month(&state.store, user_id, today)
        .inspect_err(|error| tracing::error!("Could not suggest a limit cap: {error}"))?;

    let nav_bar = NavBar::new(endpoints::NEW_LIMIT_VIEW).into_html();
    let form = limit_form_view(
        &LimitFormValues {
            cap: suggested_cap.map(|cap| round_to_cents(cap).to_string()).unwrap_or_default(),
            period: default_limit_period(today),
        },
        suggested_cap,
        "",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("New Limit", &[], &content).into_response())
}

/// A route handler for creating a limit, redirects to the limits page on success.
pub async fn create_limit_endpoint(
    State(state): State<CreateLimitState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<LimitForm>,
) -> Response {
    let values = LimitFormValues {
        cap: form.cap.clone(),
        period: Period::new_unchecked(form.period_start, form.period_end),
    };

    let new_limit = form
        .cap
        .parse::<Amount>()
        .and_then(|cap| {
            Ok(NewLimit {
                owner: user_id,
                cap,
                period: Period::new(form.period_start, form.period_end)?,
            })
        });

    let new_limit = match new_limit {
        Ok(new_limit) => new_limit,
        Err(error) => {
            return limit_form_view(&values, None, &format!("Error: {error}")).into_response();
        }
    };

    match create_limit(&state.store, new_limit) {
        Ok(limit) => {
            tracing::info!(
                "Created limit {} of {} from {} to {}",
                limit.id,
                limit.cap,
                limit.period.start(),
                limit.period.end()
            );

            (
                HxRedirect(endpoints::LIMITS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create limit: {error}");

            error.into_alert_response()
        }
    }
}

struct LimitFormValues {
    cap: String,
    period: Period,
}

fn limit_form_view(
    values: &LimitFormValues,
    suggested_cap: Option<Decimal>,
    error_message: &str,
) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::LIMITS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Spending Limit" }

            div
            {
                label for="cap" class=(FORM_LABEL_STYLE) { "Limit" }

                (money_input("cap", &values.cap))

                @if let Some(suggested_cap) = suggested_cap {
                    p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                    {
                        "You spent " (format_currency(suggested_cap)) " last month."
                    }
                }
            }

            div
            {
                label for="period_start" class=(FORM_LABEL_STYLE) { "From" }

                input
                    name="period_start"
                    id="period_start"
                    type="date"
                    required
                    value=(values.period.start())
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="period_end" class=(FORM_LABEL_STYLE) { "To" }

                input
                    name="period_end"
                    id="period_end"
                    type="date"
                    required
                    value=(values.period.end())
                    class=(FORM_TEXT_INPUT_STYLE);
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
                " Create Limit"
            }
        }
    }
}


#[cfg(test)]
mod create_limit_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        auth::UserID,
        db::initialize,
        endpoints,
        limit::{
            create::{CreateLimitState, LimitForm},
            create_limit_endpoint,
        },
        store::{LimitQuery, RecordStore, SqliteStore},
        test_utils::{assert_form_error_message, assert_hx_redirect, must_get_form, parse_html_fragment},
    };

    fn get_state() -> CreateLimitState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute_batch(
                "INSERT INTO user (id, name, email, password) VALUES (1, 'Ana', 'ana@example.com', 'x');
                INSERT INTO expense (user_id, amount, description, date) VALUES (1, '300', '', '2024-01-05');
                INSERT INTO expense (user_id, amount, description, date) VALUES (1, '500', '', '2024-01-20');",
            )
            .unwrap();

        CreateLimitState {
            store: SqliteStore::new(Arc::new(Mutex::new(connection))),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn creates_limit_with_existing_spend() {
        let state = get_state();
        let form = LimitForm {
            cap: "1000".to_owned(),
            period_start: date!(2024 - 01 - 01),
            period_end: date!(2024 - 01 - 31),
        };

        let response =
            create_limit_endpoint(State(state.clone()), Extension(UserID::new(1)), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::LIMITS_VIEW);
        let limits = state
            .store
            .query_limits(&LimitQuery::for_owner(UserID::new(1)))
            .unwrap();
        assert_eq!(limits.len(), 1);
        assert_eq!(limits[0].accumulated_spend, dec!(800));
    }

    #[tokio::test]
    async fn rejects_reversed_period() {
        let state = get_state();
        let form = LimitForm {
            cap: "1000".to_owned(),
            period_start: date!(2024 - 02 - 01),
            period_end: date!(2024 - 01 - 01),
        };

        let response =
            create_limit_endpoint(State(state.clone()), Extension(UserID::new(1)), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: the period start 2024-02-01 is after the period end 2024-01-01",
        );
        assert!(
            state
                .store
                .query_limits(&LimitQuery::for_owner(UserID::new(1)))
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn rejects_negative_cap() {
        let state = get_state();
        let form = LimitForm {
            cap: "-5".to_owned(),
            period_start: date!(2024 - 01 - 01),
            period_end: date!(2024 - 01 - 31),
        };

        let response =
            create_limit_endpoint(State(state), Extension(UserID::new(1)), Form(form)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: amount must be greater than zero, got -5");
    }
}
