//! Route layers that only let requests with a live session through.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        UserID,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::log_in_url_for,
    },
    timezone::get_local_offset,
};

/// What the session layers need from the app state.
#[derive(Clone)]
pub struct SessionState {
    /// Decrypts the private auth cookie.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<SessionState> for Key {
    fn from_ref(state: &SessionState) -> Self {
        state.cookie_key.clone()
    }
}

/// Every authenticated request keeps the session alive for at least this long.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// How a request without a session is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum Rejection {
    /// Full page loads follow a 303 redirect.
    Page,
    /// htmx swaps responses in place, so it needs an `HX-Redirect` header instead.
    Htmx,
}

impl Rejection {
    fn redirect_to(self, log_in_url: &str) -> Response {
        match self {
            Rejection::Page => Redirect::to(log_in_url).into_response(),
            Rejection::Htmx => (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response(),
        }
    }
}

/// The logged in user and their cookie jar, if the request has a live session.
async fn authenticate(
    state: &SessionState,
    parts: &mut Parts,
) -> Result<(UserID, PrivateCookieJar), Error> {
    let jar = PrivateCookieJar::from_request_parts(parts, state)
        .await
        .map_err(|_| Error::CookieMissing)?;
    let token = get_token_from_cookies(&jar)?;

    Ok((token.user_id, jar))
}

/// Push the session expiry back and copy the refreshed cookie onto `response`.
///
/// The old cookie is kept if the session cannot be extended.
fn refresh_session(response: Response, jar: PrivateCookieJar, local_timezone: &str) -> Response {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {local_timezone:?}. The session was not extended.");
        return response;
    };

    let jar = match extend_auth_cookie_duration_if_needed(jar, SESSION_EXTENSION, local_offset) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not extend session: {error}");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();
    for cookie in jar.into_response().headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.to_owned());
    }

    Response::from_parts(parts, body)
}

async fn guard(state: SessionState, request: Request, next: Next, rejection: Rejection) -> Response {
    let (mut parts, body) = request.into_parts();

    let (user_id, jar) = match authenticate(&state, &mut parts).await {
        Ok(session) => session,
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri.path());
            let log_in_url = log_in_url_for(&Request::from_parts(parts, body));
            return rejection.redirect_to(&log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    refresh_session(response, jar, &state.local_timezone)
}

/// Only let page requests with a live session through, redirecting the rest to the log-in page.
///
/// Handlers behind this layer can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(
    State(state): State<SessionState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, Rejection::Page).await
}

/// [auth_guard] for htmx API routes.
pub async fn auth_guard_hx(
    State(state): State<SessionState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, Rejection::Htmx).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router, middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::{TestResponse, TestServer};
    use sha2::Digest;
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, set_auth_cookie},
        endpoints,
    };

    use super::{SessionState, auth_guard, auth_guard_hx};

    const LOG_IN_ROUTE: &str = "/test_log_in";
    const PAGE_ROUTE: &str = "/protected";
    const API_ROUTE: &str = "/api/protected";

    async fn echo_user_id(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    fn session_state(local_timezone: &str) -> SessionState {
        SessionState {
            cookie_key: Key::from(&sha2::Sha512::digest("nafstenoas")),
            local_timezone: local_timezone.to_owned(),
        }
    }

    /// A server with [PAGE_ROUTE] behind [auth_guard], [API_ROUTE] behind
    /// [auth_guard_hx] and [LOG_IN_ROUTE], which logs in user 1 for `session_length`.
    fn test_server(state: SessionState, session_length: Duration) -> TestServer {
        let log_in = move |jar: PrivateCookieJar| async move {
            set_auth_cookie(jar, UserID::new(1), session_length, UtcOffset::UTC)
        };

        let pages = Router::new()
            .route(PAGE_ROUTE, get(echo_user_id))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));
        let api = Router::new()
            .route(API_ROUTE, get(echo_user_id))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

        let app = pages
            .merge(api)
            .route(LOG_IN_ROUTE, post(log_in))
            .with_state(state);

        TestServer::new(app)
    }

    async fn log_in(server: &TestServer) -> Cookie<'static> {
        let response = server.post(LOG_IN_ROUTE).await;
        response.assert_status_ok();

        response.cookie(COOKIE_TOKEN)
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(2),
            "got date time {left:?}, want {right:?}"
        );
    }

    fn log_in_url_returning_to(target: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", target)]).unwrap();

        format!("{}?{query}", endpoints::LOG_IN_VIEW)
    }

    #[track_caller]
    fn assert_redirected_to_log_in(response: &TestResponse, target: &str) {
        response.assert_status_see_other();
        assert_eq!(response.header("location"), log_in_url_returning_to(target));
    }

    #[tokio::test]
    async fn passes_user_id_to_handler() {
        let server = test_server(session_state("Etc/UTC"), DEFAULT_COOKIE_DURATION);
        let cookie = log_in(&server).await;

        let page = server.get(PAGE_ROUTE).add_cookie(cookie.clone()).await;
        let api = server.get(API_ROUTE).add_cookie(cookie).await;

        page.assert_status_ok();
        page.assert_text("1");
        api.assert_status_ok();
        api.assert_text("1");
    }

    #[tokio::test]
    async fn extends_short_session() {
        let server = test_server(session_state("Etc/UTC"), Duration::seconds(5));
        let cookie = log_in(&server).await;
        let logged_in_at = OffsetDateTime::now_utc();
        assert_date_time_close(
            cookie.expires_datetime().unwrap(),
            logged_in_at + Duration::seconds(5),
        );

        let response = server.get(PAGE_ROUTE).add_cookie(cookie).await;

        let cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            cookie.expires_datetime().unwrap(),
            logged_in_at + Duration::minutes(5),
        );
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn leaves_long_session_alone() {
        let server = test_server(session_state("Etc/UTC"), Duration::days(7));
        let cookie = log_in(&server).await;

        let response = server.get(PAGE_ROUTE).add_cookie(cookie).await;

        response.assert_status_ok();
        assert!(
            response.maybe_cookie(COOKIE_TOKEN).is_none(),
            "a session lasting longer than the extension should not be rewritten"
        );
    }

    #[tokio::test]
    async fn redirects_requests_without_a_live_session() {
        let server = test_server(session_state("Etc/UTC"), Duration::seconds(-1));
        let expired = log_in(&server).await;

        let missing = server.get(PAGE_ROUTE).await;
        let garbage = server
            .get(PAGE_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;
        let expired = server.get(PAGE_ROUTE).add_cookie(expired).await;

        assert_redirected_to_log_in(&missing, PAGE_ROUTE);
        assert_redirected_to_log_in(&garbage, PAGE_ROUTE);
        assert_redirected_to_log_in(&expired, PAGE_ROUTE);
    }

    #[tokio::test]
    async fn htmx_rejection_returns_to_current_page() {
        let server = test_server(session_state("Etc/UTC"), DEFAULT_COOKIE_DURATION);
        let current_url = "/expenses?category=3";

        let response = server
            .get(API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            log_in_url_returning_to(current_url)
        );
    }

    #[tokio::test]
    async fn invalid_timezone_still_serves_logged_in_user() {
        let server = test_server(session_state("Not/AZone"), Duration::seconds(5));
        let cookie = log_in(&server).await;

        let response = server.get(PAGE_ROUTE).add_cookie(cookie).await;

        response.assert_status_ok();
        response.assert_text("1");
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
    }
}
