//! Sending users back to the page they were on once they have logged in.

use axum::{extract::Request, http::Uri};
use axum_htmx::{HX_CURRENT_URL, HX_REQUEST};

use crate::endpoints;

/// The path and query of `raw_url` if it points at a page on this site other
/// than the log-in page.
///
/// Absolute URLs are only accepted with `allow_absolute`, since browsers send
/// `HX-Current-URL` with the scheme and host.
fn local_page(raw_url: &str, allow_absolute: bool) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if !allow_absolute && (uri.scheme().is_some() || uri.authority().is_some()) {
        return None;
    }

    let target = uri.path_and_query()?.as_str();
    let is_local = target.starts_with('/') && !target.starts_with("//");

    (is_local && uri.path() != endpoints::LOG_IN_VIEW).then(|| target.to_owned())
}

/// Accept `raw_url` as a place to go after logging in only if it is a relative URL on this site.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    local_page(raw_url, false)
}

/// The page the user was looking at when they made `request`.
///
/// htmx API calls are made from a page, so the page comes from `HX-Current-URL`.
fn requested_page(request: &Request) -> Option<String> {
    if !request.uri().path().starts_with("/api") {
        return local_page(request.uri().path_and_query()?.as_str(), false);
    }

    let headers = request.headers();
    let is_htmx = headers
        .get(HX_REQUEST)
        .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"true"));

    if !is_htmx {
        tracing::warn!("API request to {} is missing the HX-Request header.", request.uri());
        return None;
    }

    let current_url = headers.get(HX_CURRENT_URL)?.to_str().ok()?;
    let page = local_page(current_url, true);
    if page.is_none() {
        tracing::warn!("Ignoring HX-Current-URL {current_url:?}.");
    }

    page
}

/// The log-in page URL with `target` as the page to return to.
fn log_in_url_with_target(target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => format!("{}?{query}", endpoints::LOG_IN_VIEW),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// The log-in page URL that brings the user back to the page behind
/// `request`, or to the dashboard if that page cannot be worked out.
pub fn log_in_url_for(request: &Request) -> String {
    let target = requested_page(request).unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    log_in_url_with_target(&target)
}
