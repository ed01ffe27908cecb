//! The page listing a user's spending limits.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rust_decimal::prelude::ToPrimitive;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency, progress_bar},
    limit::{BudgetLimit, LimitStatus},
    money::usage_percentage,
    navigation::NavBar,
    reward::{Reward, evaluate_concluded_limits},
    store::{LimitQuery, RecordStore, SqliteStore},
    timezone::local_today,
};

/// The state needed for the limits page.
#[derive(Debug, Clone)]
pub struct LimitsPageState {
    pub store: SqliteStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for LimitsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the user's limits, newest first.
///
/// Limits that have finished are checked for rewards before rendering.
pub async fn get_limits_page(
    State(state): State<LimitsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let new_rewards = evaluate_concluded_limits(&state.store, user_id, today)
        .inspect_err(|error| tracing::error!("Could not evaluate concluded limits: {error}"))?;

    let limits = state
        .store
        .query_limits(&LimitQuery::for_owner(user_id))
        .inspect_err(|error| tracing::error!("Failed to retrieve limits: {error}"))?;

    Ok(limits_view(&limits, &new_rewards, today).into_response())
}

fn limits_view(limits: &[BudgetLimit], new_rewards: &[Reward], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::LIMITS_VIEW).into_html();
    let new_points = new_rewards
        .iter()
        .fold(0_i64, |total, reward| total.saturating_add(reward.points));

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Spending Limits" }

                    a href=(endpoints::NEW_LIMIT_VIEW) class=(LINK_STYLE)
                    {
                        "Create Limit"
                    }
                }

                @if !new_rewards.is_empty() {
                    div
                        role="status"
                        class="p-4 rounded-lg border border-green-300 bg-green-50 text-green-800
                            dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
                    {
                        p class="font-semibold" { "You earned " (new_points) " points!" }
                        p class="text-sm"
                        {
                            "Limits that have finished were checked and the rewards were added to your "
                            a href=(endpoints::REWARDS_VIEW) class=(LINK_STYLE) { "account" }
                            "."
                        }
                    }
                }

                @for limit in limits {
                    (limit_card_view(limit, today))
                }

                @if limits.is_empty() {
                    p class="text-center"
                    {
                        "You have not set any spending limits yet. "
                        a href=(endpoints::NEW_LIMIT_VIEW) class=(LINK_STYLE)
                        {
                            "Create one"
                        }
                        " to start earning rewards."
                    }
                }
            }
        }
    );

    base("Limits", &[], &content)
}

fn limit_card_view(limit: &BudgetLimit, today: Date) -> Markup {
    let percentage = usage_percentage(limit.accumulated_spend, limit.cap.as_decimal())
        .to_f64()
        .unwrap_or_default();
    let state_label = if limit.is_active_on(today) {
        "Active"
    } else if limit.has_concluded(today) {
        "Finished"
    } else {
        "Upcoming"
    };
    let status_style = match limit.status() {
        LimitStatus::Good => "text-green-600 dark:text-green-400",
        LimitStatus::Careful => "text-yellow-600 dark:text-yellow-300",
        LimitStatus::Over => "text-red-600 dark:text-red-400",
    };

    html! {
        div class=(CARD_STYLE) data-limit-id=(limit.id)
        {
            div class="flex justify-between items-baseline mb-2"
            {
                p class="font-semibold"
                {
                    (limit.period.start()) " to " (limit.period.end())
                }
                span class="text-xs uppercase text-gray-500 dark:text-gray-400" { (state_label) }
            }

            p class="mb-2"
            {
                span data-spent { (format_currency(limit.accumulated_spend)) }
                " of "
                (format_currency(limit.cap.as_decimal()))
                " (" (format!("{percentage:.1}")) "%)"
            }

            (progress_bar(percentage))

            div class="flex justify-between mt-2 text-sm"
            {
                span { (format_currency(limit.remaining())) " remaining" }
                span class=(status_style) data-status { (limit.status()) }
            }
        }
    }
}
