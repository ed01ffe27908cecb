//! What the log-in and registration endpoints share: their state and the
//! step that starts a session once a user is known.

use std::sync::{Arc, Mutex};

use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::{Duration, UtcOffset};

use crate::{
    AppState, Error,
    auth::{UserID, set_auth_cookie},
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

/// The parts of [AppState] needed to look up or create a user and log them in.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub cookie_key: Key,
    /// How long a session lasts unless the user asks to be remembered.
    pub cookie_duration: Duration,
    /// Canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AccountState {
    /// The current UTC offset of the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimezoneError] if the timezone is unknown.
    pub fn local_offset(&self) -> Result<UtcOffset, Error> {
        get_local_offset(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(self.local_timezone.clone()))
    }
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AccountState> for Key {
    fn from_ref(state: &AccountState) -> Self {
        state.cookie_key.clone()
    }
}

/// Log `user_id` in for `session_length` and send the browser to `destination`.
pub(super) fn start_session(
    jar: PrivateCookieJar,
    user_id: UserID,
    session_length: Duration,
    local_offset: UtcOffset,
    destination: &str,
) -> Response {
    match set_auth_cookie(jar, user_id, session_length, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(destination.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set the auth cookie for user {user_id}: {error}");
            get_internal_server_error_redirect()
        }
    }
}
