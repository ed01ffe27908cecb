//! The log-in page and the endpoint that checks credentials and starts a session.

use std::sync::Mutex;

use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    Error,
    auth::{
        Email, User, get_user_by_email,
        account::{AccountState, start_session},
        normalize_redirect_url,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, LINK_STYLE, base, email_input, loading_spinner,
        log_in_register, password_input,
    },
};

/// How long a session lasts when "remember me" is ticked.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The log-in form, optionally refilled after a failed attempt.
#[derive(Default)]
struct LogInForm<'a> {
    email: &'a str,
    error_message: Option<&'a str>,
    redirect_url: Option<&'a str>,
}

impl LogInForm<'_> {
    fn into_html(self) -> Markup {
        html! {
            form
                hx-post=(endpoints::LOG_IN_API)
                hx-indicator="#indicator"
                hx-disabled-elt="#email, #password, #remember_me, #submit-button"
                class="space-y-4 md:space-y-6"
            {
                @if let Some(redirect_url) = self.redirect_url {
                    input type="hidden" name="redirect_url" value=(redirect_url);
                }

                (email_input(self.email, None))
                (password_input("", 0, self.error_message))

                div class="flex items-center gap-x-3" {
                    input type="checkbox" id="remember_me" name="remember_me" class="rounded-xs";
                    label for="remember_me" class=(FORM_LABEL_STYLE) {
                        "Keep me logged in for one week"
                    }
                }

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE) {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    "Log in"
                }

                p class="text-sm text-gray-500 dark:text-gray-400" {
                    "Don't have an account? "
                    a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Register here" }
                }
            }
        }
    }
}

/// The page to return to after logging in, if `raw_url` is a page on this site.
fn accepted_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Ignoring redirect URL {raw_url:?}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = accepted_redirect_url(query.redirect_url.as_deref());
    let form = LogInForm {
        redirect_url: redirect_url.as_deref(),
        ..Default::default()
    };

    base(
        "Log In",
        &[],
        &log_in_register("Log in to your account", &form.into_html()),
    )
    .into_response()
}

/// A submitted log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub email: String,
    pub password: String,
    /// Present, with any value, when the checkbox is ticked.
    pub remember_me: Option<String>,
    pub redirect_url: Option<String>,
}

/// Why a log-in attempt was turned away.
#[derive(Debug, PartialEq)]
enum LogInFailure {
    /// Unknown email or wrong password. Both read the same so the form does
    /// not reveal which emails are registered.
    InvalidCredentials,
    /// Already logged.
    Internal,
}

impl LogInFailure {
    fn internal(context: &str, error: impl std::fmt::Display) -> Self {
        tracing::error!("{context}: {error}");
        Self::Internal
    }

    fn message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => INVALID_CREDENTIALS_ERROR_MSG,
            Self::Internal => INTERNAL_ERROR_MSG,
        }
    }
}

/// The user with `email`, if `password` is theirs.
fn check_credentials(
    db_connection: &Mutex<Connection>,
    email: &str,
    password: &str,
) -> Result<User, LogInFailure> {
    let lookup = db_connection
        .lock()
        .map_err(|error| LogInFailure::internal("Could not lock the database", error))
        .map(|connection| get_user_by_email(&Email::new_unchecked(email), &connection))?;

    let user = match lookup {
        Err(Error::NotFound) => return Err(LogInFailure::InvalidCredentials),
        lookup => lookup.map_err(|error| LogInFailure::internal("Could not look up user", error))?,
    };

    let password_matches = user
        .password_hash
        .verify(password)
        .map_err(|error| LogInFailure::internal("Could not verify password", error))?;

    if password_matches {
        Ok(user)
    } else {
        Err(LogInFailure::InvalidCredentials)
    }
}

/// Log a user in and send them to the page they asked for, or the dashboard.
///
/// A failed attempt gets the form back with an error message.
pub async fn post_log_in(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Form(log_in): Form<LogInData>,
) -> Response {
    let redirect_url = accepted_redirect_url(log_in.redirect_url.as_deref());

    let user = match check_credentials(&state.db_connection, &log_in.email, &log_in.password) {
        Ok(user) => user,
        Err(failure) => {
            let form = LogInForm {
                email: &log_in.email,
                error_message: Some(failure.message()),
                redirect_url: redirect_url.as_deref(),
            };

            return form.into_html().into_response();
        }
    };

    let local_offset = match state.local_offset() {
        Ok(offset) => offset,
        Err(error) => return error.into_response(),
    };

    let session_length = match log_in.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    tracing::info!("User {} logged in", user.id);

    start_session(
        jar,
        user.id,
        session_length,
        local_offset,
        redirect_url.as_deref().unwrap_or(endpoints::DASHBOARD_VIEW),
    )
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::Mutex;

    use axum::{Router, extract::FromRef, http::StatusCode, routing::post};
    use axum_htmx::HX_REDIRECT;
    use axum_test::{TestResponse, TestServer};
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState, PasswordHash, ValidatedPassword,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Email, UserName, account::AccountState,
            create_user, post_log_in,
        },
        endpoints,
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInFailure, REMEMBER_ME_COOKIE_DURATION,
        check_credentials,
    };

    const EMAIL: &str = "ana@example.com";
    const PASSWORD: &str = "okonomiyaki";

    fn account_state() -> AccountState {
        let app_state =
            AppState::new(Connection::open_in_memory().unwrap(), "foobar", "Etc/UTC").unwrap();
        let password_hash =
            PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4).unwrap();

        create_user(
            UserName::new_unchecked("Ana"),
            Email::new_unchecked(EMAIL),
            password_hash,
            &app_state.db_connection.lock().unwrap(),
        )
        .unwrap();

        AccountState::from_ref(&app_state)
    }

    async fn submit(form: &[(&str, &str)]) -> TestResponse {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(account_state());

        TestServer::new(app).post(endpoints::LOG_IN_API).form(&form).await
    }

    #[track_caller]
    fn assert_session_lasts(response: &TestResponse, want: Duration) {
        let expires = response.cookie(COOKIE_TOKEN).expires_datetime().unwrap();
        let difference = expires - (OffsetDateTime::now_utc() + want);

        assert!(
            difference.abs() < Duration::seconds(2),
            "session ends at {expires}, want about {want} from now"
        );
    }

    #[test]
    fn credentials_are_checked_case_insensitively_by_email_only() {
        let state = account_state();
        let cases = [
            (EMAIL, PASSWORD, Ok(())),
            ("ANA@Example.com", PASSWORD, Ok(())),
            (EMAIL, "Okonomiyaki", Err(LogInFailure::InvalidCredentials)),
            ("bo@example.com", PASSWORD, Err(LogInFailure::InvalidCredentials)),
        ];

        for (email, password, want) in cases {
            let got = check_credentials(&state.db_connection, email, password).map(|_| ());

            assert_eq!(got, want, "logging in as {email:?} with {password:?}");
        }
    }

    #[test]
    fn poisoned_lock_is_an_internal_failure() {
        let db_connection = Mutex::new(Connection::open_in_memory().unwrap());
        let _ = std::panic::catch_unwind(|| {
            let _guard = db_connection.lock().unwrap();
            panic!("poison the lock");
        });

        let got = check_credentials(&db_connection, EMAIL, PASSWORD).map(|_| ());

        assert_eq!(got, Err(LogInFailure::Internal));
    }

    #[tokio::test]
    async fn successful_log_in_starts_default_session() {
        let response = submit(&[("email", EMAIL), ("password", PASSWORD)]).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(HX_REDIRECT), endpoints::DASHBOARD_VIEW);
        assert_session_lasts(&response, DEFAULT_COOKIE_DURATION);
    }

    #[tokio::test]
    async fn remember_me_starts_week_long_session() {
        let response = submit(&[
            ("email", EMAIL),
            ("password", PASSWORD),
            ("remember_me", "on"),
        ])
        .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_session_lasts(&response, REMEMBER_ME_COOKIE_DURATION);
    }

    #[tokio::test]
    async fn redirects_only_to_local_pages() {
        let cases = [
            ("/limits", endpoints::LIMITS_VIEW),
            ("https://example.com", endpoints::DASHBOARD_VIEW),
        ];

        for (redirect_url, want) in cases {
            let response = submit(&[
                ("email", EMAIL),
                ("password", PASSWORD),
                ("redirect_url", redirect_url),
            ])
            .await;

            assert_eq!(response.header(HX_REDIRECT), want, "redirect URL {redirect_url:?}");
        }
    }

    #[tokio::test]
    async fn failed_log_in_returns_form_with_error() {
        let response = submit(&[("email", EMAIL), ("password", "wrong")]).await;

        response.assert_status_ok();
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
        response.assert_text_contains(INVALID_CREDENTIALS_ERROR_MSG);
        response.assert_text_contains(EMAIL);
    }

    #[tokio::test]
    async fn missing_credentials_are_rejected() {
        submit(&[])
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
