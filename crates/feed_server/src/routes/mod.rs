pub mod calendar;
pub mod pages;
pub mod status;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use feed_logging::feed_error;
use thiserror::Error;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(calendar::router())
        .merge(pages::router())
        .merge(status::router())
}

/// Per-request failure. Never affects the refresh side.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("no calendar has been published yet")]
    NotFound,
    #[error("cannot read calendar: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        match self {
            ServeError::NotFound => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            ServeError::Io(ref err) => {
                feed_error!("Serving calendar failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to read calendar".to_string(),
                )
                    .into_response()
            }
        }
    }
}
