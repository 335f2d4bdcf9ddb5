use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use feed_core::{normalize_and_filter, FilterReport, FilterRule};
use feed_logging::{feed_debug, feed_error, feed_info, feed_warn};

use crate::decode::decode_feed;
use crate::digest::short_digest;
use crate::fetch::Fetcher;
use crate::persist::ArtifactStore;
use crate::{RefreshError, RefreshFailure, RefreshOutcome, RefreshStatus};

/// Owns everything a refresh cycle touches: upstream, rules and the artifact.
///
/// At most one cycle runs at a time. A call made while another cycle is in
/// flight returns [`RefreshError::InProgress`] instead of waiting.
pub struct FeedRefresher {
    upstream_url: String,
    rules: FilterRule,
    fetcher: Arc<dyn Fetcher>,
    store: ArtifactStore,
    in_progress: AtomicBool,
    status: Mutex<RefreshStatus>,
}

/// Clears the in-progress flag when the cycle ends, however it ends.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FeedRefresher {
    pub fn new(
        upstream_url: impl Into<String>,
        rules: FilterRule,
        fetcher: Arc<dyn Fetcher>,
        store: ArtifactStore,
    ) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            rules,
            fetcher,
            store,
            in_progress: AtomicBool::new(false),
            status: Mutex::new(RefreshStatus::default()),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn rules(&self) -> &FilterRule {
        &self.rules
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn status(&self) -> RefreshStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch, clean and publish once. On any error the published artifact is
    /// left untouched.
    pub async fn refresh_once(&self) -> Result<RefreshOutcome, RefreshError> {
        let Some(_guard) = CycleGuard::acquire(&self.in_progress) else {
            feed_debug!("Refresh skipped: previous cycle still running");
            return Err(RefreshError::InProgress);
        };

        let result = self.run_cycle().await;
        self.record(&result);
        result
    }

    async fn run_cycle(&self) -> Result<RefreshOutcome, RefreshError> {
        feed_info!("Refreshing feed from {}", self.upstream_url);
        let fetched = self.fetcher.fetch(&self.upstream_url).await?;
        feed_debug!(
            "Fetched {} bytes from {} (redirects={}, content_type={:?})",
            fetched.metadata.byte_len,
            fetched.metadata.final_url,
            fetched.metadata.redirect_count,
            fetched.metadata.content_type
        );

        let decoded = decode_feed(&fetched.bytes, fetched.metadata.content_type.as_deref())?;
        let cleaned = normalize_and_filter(&decoded.text, &self.rules)?;
        log_report(&cleaned.report);

        let rendered = cleaned.render();
        let digest = short_digest(rendered.as_bytes());
        let bytes_written = rendered.len() as u64;

        let store = self.store.clone();
        let artifact_path = tokio::task::spawn_blocking(move || store.publish(&rendered))
            .await
            .map_err(|err| RefreshError::Task(err.to_string()))??;

        feed_info!(
            "Published {} entries ({} excluded) to {:?}, {} bytes, sha256={}",
            cleaned.report.entries_kept,
            cleaned.report.excluded.len(),
            artifact_path,
            bytes_written,
            digest
        );

        Ok(RefreshOutcome {
            published_at: now_rfc3339(),
            artifact_path,
            bytes_written,
            digest,
            encoding_label: decoded.encoding_label,
            report: cleaned.report,
        })
    }

    fn record(&self, result: &Result<RefreshOutcome, RefreshError>) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(outcome) => status.last_success = Some(outcome.clone()),
            Err(err) => {
                feed_error!("Refresh failed, keeping previous artifact: {}", err);
                status.last_failure = Some(RefreshFailure {
                    failed_at: now_rfc3339(),
                    message: err.to_string(),
                });
            }
        }
    }
}

fn log_report(report: &FilterReport) {
    for excluded in &report.excluded {
        feed_info!(
            "Excluded entry {:?} (matched {:?})",
            excluded.title.as_deref().unwrap_or("<untitled>"),
            excluded.phrase
        );
    }
    if report.corrupt_entries > 0 {
        feed_warn!(
            "Dropped {} corrupt entries without END:VEVENT",
            report.corrupt_entries
        );
    }
    if report.stray_lines > 0 || report.collapsed_markers > 0 {
        feed_warn!(
            "Dropped {} stray lines and {} duplicate calendar markers",
            report.stray_lines,
            report.collapsed_markers
        );
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
