//! Reading and writing the private cookie that holds the session [Token].

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::{Token, UserID},
};

pub(crate) const COOKIE_TOKEN: &str = "token";
/// How long a session lasts after logging in without "remember me".
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// The auth cookie with the attributes every version of it shares.
fn auth_cookie(value: String, expires_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .expires(expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

fn now_in(local_offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset)
}

fn store_token(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(auth_cookie(value, token.expires_at)))
}

/// Start a session for `user_id` that lasts for `duration`.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token cannot be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    store_token(jar, Token::new(user_id, duration, now_in(local_offset)))
}

/// Overwrite the auth cookie with one the browser deletes straight away.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = auth_cookie("deleted".to_owned(), OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

/// The session token in `jar`, if it is present and has not expired.
///
/// # Errors
///
/// Returns an [Error::CookieMissing] if there is no auth cookie and an
/// [Error::InvalidToken] if it cannot be decoded or has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::InvalidToken)?;

    if token.has_expired_at(OffsetDateTime::now_utc()) {
        return Err(Error::InvalidToken);
    }

    Ok(token)
}

/// Keep the session in `jar` alive for at least another `duration`.
///
/// Sessions that already last longer, e.g. after "remember me", are left alone.
///
/// # Errors
///
/// The jar is unchanged if the session is missing, invalid or cannot be re-encoded.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    match token.extended(duration, now_in(local_offset)) {
        Some(extended) => store_token(jar, extended),
        None => Ok(jar),
    }
}
