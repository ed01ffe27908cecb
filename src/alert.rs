//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as an out-of-band swap of the page's alert container,
//! so any htmx response can carry one regardless of its target.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A dismissable message shown in the alert container at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    Success { message: String },
    /// A warning that does not indicate a failed request.
    Warning { message: String, details: String },
    /// An error message with a title and details.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, title_style, message, details) = match self {
            Alert::Success { message } => {
                (SUCCESS_STYLE, SUCCESS_TITLE_STYLE, message, String::new())
            }
            Alert::Warning { message, details } => {
                (WARNING_STYLE, WARNING_TITLE_STYLE, message, details)
            }
            Alert::Error { message, details } => {
                (ERROR_STYLE, ERROR_TITLE_STYLE, message, details)
            }
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div role="alert" class=(container_style)
                {
                    div class="flex items-start justify-between gap-4"
                    {
                        div
                        {
                            p class=(title_style) { (message) }

                            @if !details.is_empty() {
                                p class="text-sm" { (details) }
                            }
                        }

                        button
                            type="button"
                            aria-label="Dismiss"
                            class="text-lg leading-none"
                            onclick="this.closest('[role=alert]').remove()"
                        {
                            "×"
                        }
                    }
                }
            }
        }
    }

    /// Render the alert with a status code other than 200 OK.
    pub fn into_response_with_status(self, status_code: StatusCode) -> Response {
        (status_code, Html(self.into_html().into_string())).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_response_with_status(StatusCode::OK)
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 rounded-lg border border-green-300 bg-green-50 \
    text-green-800 dark:bg-gray-800 dark:text-green-400 dark:border-green-800";
const SUCCESS_TITLE_STYLE: &str = "font-semibold";
const WARNING_STYLE: &str = "p-4 mb-4 rounded-lg border border-yellow-300 bg-yellow-50 \
    text-yellow-800 dark:bg-gray-800 dark:text-yellow-300 dark:border-yellow-800";
const WARNING_TITLE_STYLE: &str = "font-semibold";
const ERROR_STYLE: &str = "p-4 mb-4 rounded-lg border border-red-300 bg-red-50 \
    text-red-800 dark:bg-gray-800 dark:text-red-400 dark:border-red-800";
const ERROR_TITLE_STYLE: &str = "font-semibold";
