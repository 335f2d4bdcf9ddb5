//! The published feed.

use std::io;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::routes::ServeError;
use crate::state::AppState;

pub const CALENDAR_PATH: &str = "/calendar.ics";

pub fn router() -> Router<AppState> {
    Router::new().route(CALENDAR_PATH, get(serve_calendar))
}

/// GET /calendar.ics - Stream the latest published artifact
///
/// The file handle is opened once per request, so a publish that lands while
/// the body streams does not change what this client receives.
async fn serve_calendar(State(state): State<AppState>) -> Result<Response, ServeError> {
    let file = match File::open(state.store().path()).await {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(ServeError::NotFound),
        Err(err) => return Err(err.into()),
    };
    // Opening a directory succeeds on unix; reading it would fail mid-body.
    if !file.metadata().await?.is_file() {
        return Err(io::Error::other("artifact path is not a regular file").into());
    }

    let body = Body::from_stream(ReaderStream::new(file));
    let headers = [
        (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
        (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
        (header::CONTENT_DISPOSITION, "inline; filename=\"calendar.ics\""),
    ];
    Ok((headers, body).into_response())
}
