use std::sync::Arc;

use feed_engine::{ArtifactStore, FeedRefresher};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    refresher: Arc<FeedRefresher>,
    public_url: Option<String>,
}

impl AppState {
    pub fn new(refresher: Arc<FeedRefresher>, public_url: Option<String>) -> Self {
        Self {
            refresher,
            public_url,
        }
    }

    pub fn refresher(&self) -> &FeedRefresher {
        &self.refresher
    }

    pub fn store(&self) -> &ArtifactStore {
        self.refresher.store()
    }

    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }
}
