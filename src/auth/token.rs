//! The session token kept in the private auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::auth::UserID;

/// Who is logged in and until when.
///
/// The expiry is stored as a Unix timestamp, so it only has whole second precision.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
pub struct Token {
    pub user_id: UserID,
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A session for `user_id` that lasts for `lifetime` after `now`.
    pub fn new(user_id: UserID, lifetime: Duration, now: OffsetDateTime) -> Self {
        let expires_at = now + lifetime;
        let expires_at = expires_at - Duration::nanoseconds(i64::from(expires_at.nanosecond()));

        Self {
            user_id,
            expires_at,
        }
    }

    /// Whether the session is over at `now`.
    pub fn has_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// The same session, lasting until at least `lifetime` after `now`.
    ///
    /// Returns `None` if the session already lasts that long.
    pub fn extended(self, lifetime: Duration, now: OffsetDateTime) -> Option<Self> {
        let extended = Self::new(self.user_id, lifetime, now);

        (extended.expires_at > self.expires_at).then_some(extended)
    }
}
