//! Feed engine: fetch, clean and publish pipeline around `feed_core`.
mod decode;
mod digest;
mod fetch;
mod persist;
mod refresh;
mod scheduler;
mod types;

pub use decode::{decode_feed, DecodeError, DecodedFeed};
pub use digest::short_digest;
pub use fetch::{resolve_feed_url, FetchSettings, Fetcher, ReqwestFetcher};
pub use persist::{ensure_output_dir, ArtifactStore, PersistError};
pub use refresh::FeedRefresher;
pub use scheduler::RefreshScheduler;
pub use types::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, RefreshError, RefreshFailure,
    RefreshOutcome, RefreshStatus,
};
