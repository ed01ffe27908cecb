//! The rewards page: points balance, the shop and reward history.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint_with},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    reward::{
        PointsSummary, Reward, RewardSource, SHOP_ITEMS, ShopItem, evaluate_concluded_limits,
        is_unlocked, redeem,
    },
    store::{RecordStore, RewardQuery, SqliteStore},
    timezone::local_today,
};

/// The state needed for the rewards page and for redeeming points.
#[derive(Debug, Clone)]
pub struct RewardsState {
    pub store: SqliteStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for RewardsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the rewards page.
///
/// Limits that have finished since the last visit are evaluated first, so
/// newly earned rewards show up straight away.
pub async fn get_rewards_page(
    State(state): State<RewardsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    evaluate_concluded_limits(&state.store, user_id, today)
        .inspect_err(|error| tracing::error!("Could not evaluate concluded limits: {error}"))?;

    let rewards = state
        .store
        .query_rewards(&RewardQuery::for_owner(user_id))
        .inspect_err(|error| tracing::error!("Failed to retrieve rewards: {error}"))?;

    Ok(rewards_view(&rewards).into_response())
}

/// A route handler for spending points on a shop item.
///
/// Reloads the rewards page on success and shows an alert otherwise.
pub async fn redeem_item_endpoint(
    State(state): State<RewardsState>,
    Extension(user_id): Extension<UserID>,
    Path(item_id): Path<String>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    match redeem(&state.store, user_id, &item_id, today) {
        Ok(_) => (
            HxRedirect(endpoints::REWARDS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::debug!("Could not redeem {item_id} for user {user_id}: {error}");

            error.into_alert_response()
        }
    }
}

fn rewards_view(rewards: &[Reward]) -> Markup {
    let nav_bar = NavBar::new(endpoints::REWARDS_VIEW).into_html();
    let summary = PointsSummary::from_rewards(rewards);
    let earned_rewards = rewards
        .iter()
        .filter(|reward| !matches!(reward.source, Some(RewardSource::Unlock(_))))
        .collect::<Vec<_>>();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Rewards" }

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (points_card("Available", summary.available(), "points-available"))
                    (points_card("Earned", summary.earned, "points-earned"))
                    (points_card("Spent", summary.spent, "points-spent"))
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "Shop" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Stay within your spending limits to earn points, then spend them here."
                    }

                    div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                    {
                        @for item in &SHOP_ITEMS {
                            (shop_item_view(item, is_unlocked(rewards, item.id), summary.available()))
                        }
                    }
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "History" }

                    table id="reward-history" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Reward" }
                                th scope="col" class="px-6 py-4 text-right" { "Points" }
                            }
                        }

                        tbody
                        {
                            @for reward in &earned_rewards {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (reward.granted_date) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        p class="font-medium text-gray-900 dark:text-white" { (reward.title) }
                                        @if !reward.description.is_empty() {
                                            p class="text-xs" { (reward.description) }
                                        }
                                    }
                                    td class="px-6 py-4 text-right" { (reward.points) " pts" }
                                }
                            }

                            @if earned_rewards.is_empty() {
                                tr
                                {
                                    td colspan="3" class="px-6 py-4 text-center"
                                    {
                                        "No rewards yet. Finish a limit under budget to earn your first points."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Rewards", &[], &content)
}

fn points_card(label: &str, points: i64, id: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p id=(id) class="text-2xl font-bold" { (points) }
        }
    }
}

fn shop_item_view(item: &ShopItem, unlocked: bool, available: i64) -> Markup {
    let affordable = available >= item.cost;

    html! {
        div class=(CARD_STYLE) data-item=(item.id)
        {
            p class="font-semibold" { (item.name) }
            p class="text-sm text-gray-500 dark:text-gray-400 mb-4" { (item.description) }

            @if unlocked {
                p class="text-green-600 dark:text-green-400 font-semibold" { "Unlocked" }
            } @else {
                button
                    type="button"
                    hx-post=(format_endpoint_with(endpoints::REDEEM_ITEM, item.id))
                    hx-confirm=(format!("Unlock {} for {} points?", item.name, item.cost))
                    hx-target-error="#alert-container"
                    disabled[!affordable]
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Unlock for " (item.cost) " pts"
                }
            }
        }
    }
}

#[cfg(test)]
mod rewards_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::UserID,
        db::initialize,
        endpoints,
        limit::{NewLimit, Period},
        money::Amount,
        reward::{get_rewards_page, page::RewardsState, redeem_item_endpoint},
        store::{RecordStore, RewardQuery, SqliteStore},
        test_utils::{assert_hx_redirect, assert_status_ok, assert_valid_html, must_get_text, parse_html_document},
    };

    fn get_state() -> RewardsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute(
                "INSERT INTO user (id, name, email, password) VALUES (1, 'Ana', 'ana@example.com', 'x')",
                [],
            )
            .unwrap();

        RewardsState {
            store: SqliteStore::new(Arc::new(Mutex::new(connection))),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn add_concluded_limit(state: &RewardsState) {
        let yesterday = OffsetDateTime::now_utc().date() - Duration::days(1);
        state
            .store
            .insert_limit(
                NewLimit {
                    owner: UserID::new(1),
                    cap: Amount::new_unchecked(dec!(500)),
                    period: Period::new_unchecked(yesterday - Duration::days(6), yesterday),
                },
                dec!(100),
            )
            .unwrap();
    }


    #[tokio::test]
    async fn visiting_the_page_grants_rewards_for_concluded_limits() {
        let state = get_state();
        add_concluded_limit(&state);

        let response = get_rewards_page(State(state.clone()), Extension(UserID::new(1)))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(must_get_text(&html, "#points-available"), "100");
        assert_eq!(must_get_text(&html, "#points-earned"), "100");
        assert_eq!(must_get_text(&html, "#reward-history tbody tr td:nth-child(3)"), "100 pts");

        // A second visit must not grant the reward again.
        get_rewards_page(State(state.clone()), Extension(UserID::new(1)))
            .await
            .unwrap();
        let rewards = state
            .store
            .query_rewards(&RewardQuery::for_owner(UserID::new(1)))
            .unwrap();
        assert_eq!(rewards.len(), 1);
    }

    #[tokio::test]
    async fn unaffordable_items_are_disabled() {
        let state = get_state();

        let response = get_rewards_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let disabled_buttons = html
            .select(&Selector::parse("button[hx-post][disabled]").unwrap())
            .count();
        assert_eq!(disabled_buttons, 3);
    }

    #[tokio::test]
    async fn redeeming_redirects_and_marks_item_unlocked() {
        let state = get_state();
        add_concluded_limit(&state);
        get_rewards_page(State(state.clone()), Extension(UserID::new(1)))
            .await
            .unwrap();

        let response = redeem_item_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Path("avatar_night_owl".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::REWARDS_VIEW);

        let response = get_rewards_page(State(state), Extension(UserID::new(1)))
            .await
            .unwrap();
        let html = parse_html_document(response).await;
        assert_eq!(must_get_text(&html, "#points-available"), "0");
        assert_eq!(must_get_text(&html, "#points-spent"), "100");
        assert_eq!(must_get_text(&html, "[data-item=avatar_night_owl] p.text-green-600"), "Unlocked");
    }

    #[tokio::test]
    async fn redeeming_without_points_shows_alert() {
        let state = get_state();

        let response = redeem_item_endpoint(
            State(state),
            Extension(UserID::new(1)),
            Path("avatar_night_owl".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
