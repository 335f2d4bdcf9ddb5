use std::sync::Arc;

use anyhow::{Context, Result};
use feed_engine::{
    ensure_output_dir, ArtifactStore, FeedRefresher, FetchSettings, RefreshScheduler,
    ReqwestFetcher,
};
use feed_logging::{feed_info, feed_warn};
use feed_server::{build_router, AppState, Config};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the process environment still applies.
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env().context("invalid configuration")?;
    feed_logging::initialize(&config.log);
    if let Err(err) = dotenv {
        if !err.not_found() {
            feed_warn!("Ignoring unreadable .env file: {}", err);
        }
    }

    let rules = config.filter_rule();
    feed_info!(
        "Feed {} with {} blocked phrases, refresh every {}s",
        config.upstream_url,
        rules.phrases().len(),
        config.refresh_interval.as_secs()
    );

    let fetcher = ReqwestFetcher::new(FetchSettings {
        request_timeout: config.fetch_timeout,
        ..FetchSettings::default()
    });
    let store = ArtifactStore::new(config.artifact_path.clone());
    ensure_output_dir(store.dir())
        .with_context(|| format!("artifact directory {:?} is not usable", store.dir()))?;
    let refresher = Arc::new(FeedRefresher::new(
        config.upstream_url.clone(),
        rules,
        Arc::new(fetcher),
        store,
    ));

    let shutdown = CancellationToken::new();
    let scheduler = RefreshScheduler::new(refresher.clone(), config.refresh_interval);
    let scheduler_handle = scheduler.spawn(shutdown.clone());

    let state = AppState::new(refresher, config.public_url.clone());
    let app = build_router(state, config.cors_enabled);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    feed_info!("Serving calendar on http://{}", config.bind_addr);

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                feed_info!("Shutdown requested");
            }
            signal_token.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(err) = scheduler_handle.await {
        feed_warn!("Refresh scheduler ended abnormally: {}", err);
    }
    Ok(())
}
