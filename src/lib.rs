//! Pennywise is a web app for tracking personal spending.
//!
//! Users record expenses, set spending limits over a period of days, earn
//! points for staying under those limits, and ask a small assistant questions
//! about their own data.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod assistant;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod html;
mod internal_server_error;
mod limit;
mod logging;
mod money;
mod navigation;
mod not_found;
mod profile;
mod reward;
mod routing;
mod store;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFound};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email and password combination that does not
    /// match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token could not be decoded or has expired.
    #[error("the auth token is invalid or has expired")]
    InvalidToken,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used as a user's display name.
    #[error("Name cannot be empty")]
    EmptyUserName,

    /// The string is not a usable email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// Another user has already registered with this email address.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A category with the same name (ignoring case) already exists.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID used to create an expense did not match a valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// A money amount could not be parsed from text.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// Expense amounts and limit caps must be greater than zero.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// Expense amounts and limit caps are capped at [money::MAX_AMOUNT].
    #[error("amount must be at most {max}, got {0}", max = money::MAX_AMOUNT)]
    AmountTooLarge(Decimal),

    /// Amounts are whole cents.
    #[error("amount must have at most two decimal places, got {0}")]
    TooManyDecimalPlaces(Decimal),

    /// A total spend was too large to represent.
    #[error("the total spend is too large to calculate")]
    SpendOverflow,

    /// A limit period where the start date comes after the end date.
    #[error("the period start {start} is after the period end {end}")]
    InvalidPeriod {
        /// The first day of the period.
        start: Date,
        /// The last day of the period.
        end: Date,
    },

    /// A reward has already been recorded for this source.
    ///
    /// The store enforces at most one reward per user and source key. The
    /// reward evaluator treats this error as "already granted".
    #[error("a reward from this source has already been recorded")]
    DuplicateRewardSource,

    /// The shop item ID does not match any item in the shop.
    #[error("there is no shop item \"{0}\"")]
    UnknownShopItem(String),

    /// The user tried to unlock an item they already own.
    #[error("\"{0}\" has already been unlocked")]
    AlreadyUnlocked(String),

    /// The user does not have enough points to unlock an item.
    #[error("{needed} points are needed but only {available} are available")]
    InsufficientPoints {
        /// The cost of the item.
        needed: i64,
        /// The user's current points balance.
        available: i64,
    },

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to update a limit that does not exist
    #[error("tried to update a limit that is not in the database")]
    UpdateMissingLimit,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("reward.source_key") =>
            {
                Error::DuplicateRewardSource
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFound.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Error::InvalidCategory => Alert::Error {
                message: "Invalid category".to_owned(),
                details: "The selected category could not be found. \
                    Try refreshing the page and choosing the category again."
                    .to_owned(),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::DeleteMissingExpense => Alert::Error {
                message: "Could not delete expense".to_owned(),
                details: "The expense could not be found. \
                    Try refreshing the page to see if the expense has already been deleted."
                    .to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::UpdateMissingLimit => Alert::Error {
                message: "Could not update limit".to_owned(),
                details: "The limit could not be found.".to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::NotFound => Alert::Error {
                message: "Not found".to_owned(),
                details: "The requested item could not be found. Try refreshing the page."
                    .to_owned(),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DuplicateCategoryName(name) => Alert::Error {
                message: "Duplicate Category Name".to_owned(),
                details: format!(
                    "The category {name} already exists. Choose a different category name."
                ),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::UnknownShopItem(item_id) => Alert::Error {
                message: "Unknown item".to_owned(),
                details: format!("There is no item \"{item_id}\" in the shop."),
            }
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::AlreadyUnlocked(name) => Alert::Error {
                message: "Already unlocked".to_owned(),
                details: format!("You have already unlocked {name}."),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InsufficientPoints { needed, available } => Alert::Error {
                message: "Not enough points".to_owned(),
                details: format!(
                    "You need {needed} points but only have {available}. \
                    Stay under your spending limits to earn more."
                ),
            }
            .into_response_with_status(StatusCode::BAD_REQUEST),
            _ => Alert::Error {
                message: "Something went wrong".to_owned(),
                details: "An unexpected error occurred, check the server logs for more details."
                    .to_owned(),
            }
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
