//! The profile page showing who is logged in and their points.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{User, UserID, get_user_by_id},
    endpoints,
    html::{BUTTON_DELETE_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    reward::{PointsSummary, query_rewards},
    store::RewardQuery,
};

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for reading the user and their rewards.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the logged in user's name, email and points.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?;
    let rewards = query_rewards(&RewardQuery::for_owner(user_id), &connection)
        .inspect_err(|error| tracing::error!("Could not get rewards for user {user_id}: {error}"))?;

    Ok(profile_view(&user, PointsSummary::from_rewards(&rewards)).into_response())
}

fn profile_view(user: &User, points: PointsSummary) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class={ (CARD_STYLE) " w-full max-w-md space-y-4" }
            {
                h1 class="text-xl font-bold" { "Profile" }

                dl class="space-y-2"
                {
                    div
                    {
                        dt class="text-sm text-gray-500 dark:text-gray-400" { "Name" }
                        dd id="profile-name" class="font-semibold" { (user.name) }
                    }
                    div
                    {
                        dt class="text-sm text-gray-500 dark:text-gray-400" { "Email" }
                        dd id="profile-email" class="font-semibold" { (user.email) }
                    }
                    div
                    {
                        dt class="text-sm text-gray-500 dark:text-gray-400" { "Points available" }
                        dd id="profile-points" class="font-semibold" { (points.available()) }
                    }
                    div
                    {
                        dt class="text-sm text-gray-500 dark:text-gray-400" { "Points earned" }
                        dd class="font-semibold" { (points.earned) }
                    }
                }

                a href=(endpoints::LOG_OUT) class=(BUTTON_DELETE_STYLE) { "Log out" }
            }
        }
    );

    base("Profile", &[], &content)
}
