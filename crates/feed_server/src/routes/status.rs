//! Refresh status as JSON

use axum::{extract::State, routing::get, Json, Router};
use feed_engine::{RefreshFailure, RefreshOutcome};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(status))
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub refreshing: bool,
    pub artifact_present: bool,
    pub last_success: Option<SuccessInfo>,
    pub last_failure: Option<FailureInfo>,
}

#[derive(Serialize)]
pub struct SuccessInfo {
    pub published_at: String,
    pub bytes: u64,
    pub digest: String,
    pub encoding: String,
    pub entries_in: usize,
    pub entries_kept: usize,
    pub corrupt_entries: usize,
    pub excluded: Vec<ExcludedInfo>,
}

#[derive(Serialize)]
pub struct ExcludedInfo {
    pub title: Option<String>,
    pub phrase: String,
}

#[derive(Serialize)]
pub struct FailureInfo {
    pub failed_at: String,
    pub message: String,
}

impl From<RefreshOutcome> for SuccessInfo {
    fn from(outcome: RefreshOutcome) -> Self {
        Self {
            published_at: outcome.published_at,
            bytes: outcome.bytes_written,
            digest: outcome.digest,
            encoding: outcome.encoding_label,
            entries_in: outcome.report.entries_in,
            entries_kept: outcome.report.entries_kept,
            corrupt_entries: outcome.report.corrupt_entries,
            excluded: outcome
                .report
                .excluded
                .into_iter()
                .map(|entry| ExcludedInfo {
                    title: entry.title,
                    phrase: entry.phrase,
                })
                .collect(),
        }
    }
}

impl From<RefreshFailure> for FailureInfo {
    fn from(failure: RefreshFailure) -> Self {
        Self {
            failed_at: failure.failed_at,
            message: failure.message,
        }
    }
}

/// GET /status - Last refresh results
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.refresher().status();
    Json(StatusResponse {
        refreshing: state.refresher().is_refreshing(),
        artifact_present: state.store().exists(),
        last_success: snapshot.last_success.map(SuccessInfo::from),
        last_failure: snapshot.last_failure.map(FailureInfo::from),
    })
}
