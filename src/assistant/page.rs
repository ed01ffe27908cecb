//! The chat page and the endpoint that answers messages.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    assistant::{responses::GREETING_TEXT, respond},
    auth::UserID,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    store::SqliteStore,
    timezone::local_today,
};

/// Canned questions shown as buttons under the chat.
const QUICK_QUESTIONS: [(&str, &str); 5] = [
    ("Expenses", "Show my expenses"),
    ("Limit", "How is my limit going?"),
    ("Points", "How many points do I have?"),
    ("Analysis", "Give me an analysis of this month"),
    ("Advice", "Any advice for saving?"),
];

/// The state needed to answer assistant messages.
#[derive(Debug, Clone)]
pub struct AssistantState {
    pub store: SqliteStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AssistantState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A message typed into the chat.
#[derive(Debug, Deserialize)]
pub struct AssistantForm {
    #[serde(default)]
    pub message: String,
}

/// Render the chat page with the assistant's greeting.
pub async fn get_assistant_page() -> Response {
    let nav_bar = NavBar::new(endpoints::ASSISTANT_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                h1 class="text-xl font-bold" { "Assistant" }

                div
                    id="messages"
                    class={ (CARD_STYLE) " flex flex-col gap-3 min-h-64 max-h-[60vh] overflow-y-auto" }
                {
                    (assistant_message(GREETING_TEXT))
                }

                div class="flex flex-wrap gap-2"
                {
                    @for (label, question) in QUICK_QUESTIONS {
                        button
                            type="button"
                            hx-post=(endpoints::ASSISTANT_API)
                            hx-vals=(format!(r#"{{"message": "{question}"}}"#))
                            hx-target="#messages"
                            hx-swap="beforeend scroll:bottom"
                            hx-target-error="#alert-container"
                            class="px-3 py-1 text-sm rounded-full border border-blue-500
                                text-blue-600 hover:bg-blue-50 dark:text-blue-400
                                dark:hover:bg-gray-700"
                        {
                            (label)
                        }
                    }
                }

                form
                    hx-post=(endpoints::ASSISTANT_API)
                    hx-target="#messages"
                    hx-swap="beforeend scroll:bottom"
                    hx-target-error="#alert-container"
                    class="flex gap-2"
                {
                    (message_input())

                    button type="submit" class={ (BUTTON_PRIMARY_STYLE) " w-auto" } { "Send" }
                }
            }
        }
    );

    base("Assistant", &[], &content).into_response()
}

/// A route handler that answers a chat message.
///
/// Responds with the user's message and the reply to append to the chat,
/// plus a fresh, empty input box. Blank messages get no content.
pub async fn assistant_message_endpoint(
    State(state): State<AssistantState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AssistantForm>,
) -> Response {
    let message = form.message.trim();

    if message.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let reply = local_today(&state.local_timezone)
        .and_then(|today| respond(&state.store, user_id, message, today));

    match reply {
        Ok(reply) => Html(
            html!(
                (user_message(message))
                (assistant_message(&reply))
                (message_input_oob())
            )
            .into_string(),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("Could not answer message for user {user_id}: {error}");

            error.into_alert_response()
        }
    }
}

fn user_message(text: &str) -> Markup {
    html!(
        div class="self-end max-w-[80%] px-4 py-2 rounded-lg bg-blue-600 text-white"
            data-sender="user"
        {
            p class="whitespace-pre-line" { (text) }
        }
    )
}

fn assistant_message(text: &str) -> Markup {
    html!(
        div class="self-start max-w-[80%] px-4 py-2 rounded-lg bg-gray-100
            text-gray-900 dark:bg-gray-700 dark:text-white"
            data-sender="assistant"
        {
            p class="whitespace-pre-line" { (text) }
        }
    )
}

fn message_input() -> Markup {
    html!(
        input
            id="message"
            name="message"
            type="text"
            placeholder="Ask about your expenses, limits or points"
            autocomplete="off"
            required
            class=(FORM_TEXT_INPUT_STYLE);
    )
}

/// Replaces the input box so the sent message is cleared.
fn message_input_oob() -> Markup {
    html!(
        input
            id="message"
            name="message"
            type="text"
            placeholder="Ask about your expenses, limits or points"
            autocomplete="off"
            required
            hx-swap-oob="true"
            class=(FORM_TEXT_INPUT_STYLE);
    )
}
