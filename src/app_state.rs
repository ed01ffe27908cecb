//! The state shared by every route handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, store::SqliteStore};

/// Handlers take the narrower states built from this one with [FromRef].
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts and signs the auth cookie.
    pub cookie_key: Key,
    /// How long a session lasts unless the user asks to be remembered.
    pub cookie_duration: Duration,
    /// Canonical timezone name used to decide what "today" is, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Set up the database schema on `db_connection` and wrap it for sharing between requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables or default categories cannot be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for SqliteStore {
    fn from_ref(state: &AppState) -> Self {
        SqliteStore::new(state.db_connection.clone())
    }
}

/// Derive the 64 byte cookie key from a secret of any length.
fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
