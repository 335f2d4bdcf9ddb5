//! Liveness and subscription pages

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Html,
    routing::get,
    Router,
};

use crate::routes::calendar::CALENDAR_PATH;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/subscribe", get(subscribe))
}

/// GET / - Plain liveness check
async fn liveness() -> &'static str {
    "calendar feed is running\n"
}

/// GET /subscribe - Links for calendar apps
async fn subscribe(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let base = match state.public_url() {
        Some(url) => url.to_string(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("localhost");
            format!("https://{host}")
        }
    };

    let https_url = format!("{base}{CALENDAR_PATH}");
    let webcal_url = webcal_variant(&https_url);
    Html(render_subscribe_page(&https_url, &webcal_url))
}

fn webcal_variant(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    format!("webcal://{rest}")
}

fn render_subscribe_page(https_url: &str, webcal_url: &str) -> String {
    let https_url = escape_html(https_url);
    let webcal_url = escape_html(webcal_url);
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head><meta charset=\"utf-8\"><title>Subscribe to calendar</title></head>\n\
<body>\n\
<h1>Subscribe to calendar</h1>\n\
<p>Add this address to your calendar app:</p>\n\
<p><a href=\"{webcal_url}\">{webcal_url}</a></p>\n\
<p>Or use the plain HTTPS address:</p>\n\
<p><a href=\"{https_url}\">{https_url}</a></p>\n\
</body>\n\
</html>\n"
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
