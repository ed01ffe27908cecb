//! Shared page layout, style constants and small view helpers.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::money::round_to_cents;

/// Blue underlined text for inline links.
pub const LINK_STYLE: &str = "underline text-blue-600 dark:text-blue-500 \
    hover:text-blue-500 dark:hover:text-blue-400";

/// Full width submit button.
pub const BUTTON_PRIMARY_STYLE: &str = "w-full rounded px-4 py-2 text-white \
    bg-blue-500 dark:bg-blue-600 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 disabled:bg-blue-700";

/// A button that looks like a red link.
pub const BUTTON_DELETE_STYLE: &str = "underline cursor-pointer border-none \
    bg-transparent text-red-600 dark:text-red-500 hover:text-red-500 \
    dark:hover:text-red-400";

pub const FORM_CONTAINER_STYLE: &str = "mx-auto flex max-w-md flex-col \
    items-center px-6 py-8 lg:py-0 text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "mb-2 block text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full rounded p-2.5 text-sm \
    border border-gray-300 dark:border-gray-600 bg-gray-50 dark:bg-gray-700 \
    text-gray-900 dark:text-white disabled:text-gray-500 dark:placeholder-gray-400 \
    focus:border-blue-600 focus:ring-blue-600 focus:dark:border-blue-500 \
    focus:dark:ring-blue-500";

pub const TABLE_HEADER_STYLE: &str = "bg-gray-50 dark:bg-gray-700 text-xs \
    uppercase text-gray-700 dark:text-gray-400";
pub const TABLE_ROW_STYLE: &str = "border-b bg-white dark:border-gray-700 dark:bg-gray-800";
pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

pub const CATEGORY_BADGE_STYLE: &str = "inline-flex items-center rounded-full \
    px-2.5 py-0.5 text-xs font-semibold bg-blue-100 text-blue-800 \
    dark:bg-blue-900 dark:text-blue-300";

pub const CARD_STYLE: &str = "rounded-lg border border-gray-200 \
    dark:border-gray-700 bg-white dark:bg-gray-800 p-4 shadow-md";

pub const PAGE_CONTAINER_STYLE: &str =
    "mx-auto flex flex-col items-center px-6 py-8 lg:py-5 text-gray-900 dark:text-white";

const HEADING_STYLE: &str = "text-xl md:text-2xl font-bold tracking-tight text-gray-900 dark:text-white";

const FIELD_ERROR_STYLE: &str = "text-base text-red-500";

/// Page specific additions to the document head.
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
}

const SCRIPTS: [&str; 3] = [
    "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4",
    "https://cdn.jsdelivr.net/npm/htmx.org@2.0.8/dist/htmx.min.js",
    "https://cdn.jsdelivr.net/npm/htmx-ext-response-targets@2.0.4",
];

/// Only show a request's spinner while that request is in flight.
const BASE_CSS: &str = "
#indicator.htmx-indicator { display: none; }
#indicator.htmx-request .htmx-indicator,
#indicator.htmx-request.htmx-indicator { display: inline; }
.echarts-tooltip { z-index: 30 !important; }
";

/// The full HTML document around `content`.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Pennywise" }

                @for src in SCRIPTS {
                    script src=(src) {}
                }

                style { (PreEscaped(BASE_CSS)) }

                @for element in head_elements {
                    @match element {
                        HeadElement::ScriptLink(src) => script src=(src) {}
                        HeadElement::ScriptSource(source) => script { (source) }
                    }
                }
            }

            body
                hx-ext="response-targets"
                class="container min-h-screen max-w-full bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Target for out-of-band alert swaps.
                div
                    id="alert-container"
                    class="fixed bottom-4 left-1/2 z-[9999] w-full max-w-md -translate-x-1/2 px-4"
                {}
            }
        }
    }
}

/// A full page explaining that something went wrong, with `status` in large print.
pub fn error_view(title: &str, status: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        main class="flex min-h-screen items-center justify-center bg-white dark:bg-gray-900 px-4"
        {
            div class="max-w-screen-sm space-y-4 text-center text-gray-900 dark:text-white"
            {
                p class="text-7xl lg:text-9xl font-extrabold tracking-tight text-blue-600 dark:text-blue-500"
                {
                    (status)
                }

                h1 class="text-3xl md:text-4xl font-bold tracking-tight" { (description) }

                p class="text-xl md:text-2xl" { (fix) }

                a href="/" class=(BUTTON_PRIMARY_STYLE) { "Back to Homepage" }
            }
        }
    };

    base(title, &[], &content)
}

/// The card that holds the log-in and registration forms.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="mx-auto flex flex-col items-center justify-center gap-6 px-6 py-8"
        {
            span class="text-2xl font-semibold text-gray-900 dark:text-white" { "Pennywise" }

            div class={ "w-full sm:max-w-md space-y-4 md:space-y-6 sm:p-8 " (CARD_STYLE) }
            {
                h1 class=(HEADING_STYLE) { (form_title) }

                (form)
            }
        }
    }
}

/// `input` under a label pointing at `id`, with `error_message` underneath if there is one.
pub fn form_field(id: &str, label: &str, input: Markup, error_message: Option<&str>) -> Markup {
    html! {
        div {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            (input)

            @if let Some(message) = error_message {
                p class=(FIELD_ERROR_STYLE) { (message) }
            }
        }
    }
}

/// A labelled email field.
pub fn email_input(email: &str, error_message: Option<&str>) -> Markup {
    let input = html! {
        input
            id="email"
            name="email"
            type="email"
            placeholder="you@example.com"
            value=(email)
            class=(FORM_TEXT_INPUT_STYLE)
            required;
    };

    form_field("email", "Email", input, error_message)
}

/// A labelled password field.
pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    let input = html! {
        input
            id="password"
            name="password"
            type="password"
            placeholder="••••••••"
            value=(password)
            minlength=(min_length)
            class=(FORM_TEXT_INPUT_STYLE)
            required
            autofocus;
    };

    form_field("password", "Password", input, error_message)
}

/// A small spinning ring to show inside a button while its request is pending.
pub fn loading_spinner() -> Markup {
    html! {
        span
            role="status"
            aria-label="Loading"
            class="me-2 mb-1 inline-block h-4 w-4 animate-spin rounded-full border-2 border-gray-200 border-t-white align-middle"
        {}
    }
}

/// A required number input for a dollar amount, with a "$" drawn inside the left edge.
pub fn money_input(name: &str, value: &str) -> Markup {
    html! {
        div class="relative w-full"
        {
            span
                class="pointer-events-none absolute inset-y-0 left-0 flex items-center pl-3 text-gray-500 dark:text-gray-400"
            {
                "$"
            }

            input
                name=(name)
                id=(name)
                type="number"
                step="0.01"
                min="0.01"
                placeholder="0.00"
                required
                autofocus
                value=(value)
                class={ (FORM_TEXT_INPUT_STYLE) " pl-7" };
        }
    }
}

/// Format a money amount with a dollar sign, thousands separators and two decimal places.
///
/// Half cents round away from zero and negative amounts are written as "-$1.00".
pub fn format_currency(amount: Decimal) -> String {
    static FORMATTER: OnceLock<Option<Formatter>> = OnceLock::new();

    let cents = round_to_cents(amount);
    let magnitude = cents.abs().to_f64().unwrap_or_default();
    let sign = if cents.is_sign_negative() && !cents.is_zero() { "-" } else { "" };

    // numfmt writes zero as "0" and drops trailing zeros, so only use it for
    // the whole dollars and append the cents ourselves.
    let dollars = magnitude.trunc();
    let whole = match FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(0)))
    }) {
        Some(formatter) if dollars >= 1000.0 => {
            let grouped = formatter.fmt_string(dollars);
            grouped.split('.').next().unwrap_or_default().to_owned()
        }
        _ => format!("{dollars:.0}"),
    };
    let fraction = (cents.abs().fract() * Decimal::ONE_HUNDRED).to_u8().unwrap_or_default();

    format!("{sign}${whole}.{fraction:02}")
}

/// A horizontal bar showing how much of a limit has been used.
///
/// `percentage` may exceed 100, in which case the bar is full and coloured red.
pub fn progress_bar(percentage: f64) -> Markup {
    let width = percentage.clamp(0.0, 100.0);
    let colour = if percentage > 100.0 {
        "bg-red-600"
    } else if percentage > 80.0 {
        "bg-yellow-400"
    } else {
        "bg-green-600"
    };

    html!(
        div
            class="w-full h-2.5 bg-gray-200 rounded-full dark:bg-gray-700"
            role="progressbar"
            aria-valuenow=(format!("{percentage:.1}"))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            div
                class=(format!("{colour} h-2.5 rounded-full"))
                style=(format!("width: {width:.1}%"))
            {}
        }
    )
}

/// An inline link for use in running text.
pub fn link(url: &str, text: &str) -> Markup {
    html! {
        a href=(url) class=(LINK_STYLE) { (text) }
    }
}

#[cfg(test)]
mod format_currency_tests {
    use rust_decimal_macros::dec;

    use crate::html::format_currency;

    #[test]
    fn formats_whole_amounts_with_two_decimal_places() {
        assert_eq!(format_currency(dec!(25)), "$25.00");
    }

    #[test]
    fn pads_single_decimal_place() {
        assert_eq!(format_currency(dec!(12.3)), "$12.30");
    }

    #[test]
    fn rounds_half_cents_up() {
        assert_eq!(format_currency(dec!(12.345)), "$12.35");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(dec!(0.00)), "$0.00");
    }

    #[test]
    fn separates_thousands() {
        assert_eq!(format_currency(dec!(1234567.8)), "$1,234,567.80");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_currency(dec!(-50.25)), "-$50.25");
    }
}
