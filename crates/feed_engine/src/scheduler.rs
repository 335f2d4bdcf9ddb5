use std::sync::Arc;
use std::time::Duration;

use feed_logging::{feed_debug, feed_info, feed_warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::refresh::FeedRefresher;
use crate::RefreshError;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Drives [`FeedRefresher::refresh_once`] on a fixed cadence.
///
/// The first cycle runs immediately. Cycles run inline in the timer loop, so a
/// slow cycle delays the next tick instead of overlapping it; ticks missed
/// meanwhile are skipped, not queued.
pub struct RefreshScheduler {
    refresher: Arc<FeedRefresher>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(refresher: Arc<FeedRefresher>, interval: Duration) -> Self {
        Self {
            refresher,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run on the current tokio runtime until `shutdown` is cancelled.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    async fn run(self, shutdown: CancellationToken) {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        feed_info!("Refresh scheduler started, interval {:?}", self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            match self.refresher.refresh_once().await {
                Ok(outcome) => feed_debug!("Scheduled refresh published {}", outcome.digest),
                Err(RefreshError::InProgress) => {
                    feed_warn!("Scheduled refresh skipped: another cycle is running")
                }
                // Already logged by the refresher; the next tick is the retry.
                Err(_) => {}
            }
        }

        feed_info!("Refresh scheduler stopped");
    }
}
