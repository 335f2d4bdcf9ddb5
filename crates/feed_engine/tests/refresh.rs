use std::sync::{Arc, Once};
use std::time::Duration;

use feed_core::FilterRule;
use feed_engine::{
    ArtifactStore, FailureKind, FeedRefresher, FetchSettings, RefreshError, ReqwestFetcher,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feed_logging::initialize_for_tests);
}

const UPSTREAM: &str = "BEGIN:VCALENDAR\n\
VERSION:2.0\n\
PRODID:-//Uni//Plan//DE\n\
BEGIN:VEVENT\n\
UID:1\n\
SUMMARY:Analysis I\n\
END:VEVENT\n\
BEGIN:VEVENT\n\
UID:2\n\
SUMMARY:Hochschul\n\
\x20sport Fußball\n\
END:VEVENT\n\
BEGIN:VEVENT\n\
UID:3\n\
SUMMARY:Lineare Algebra\n\
END:VEVENT\n\
END:VCALENDAR\n";

const CLEANED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Uni//Plan//DE\r\n\
BEGIN:VEVENT\r\n\
UID:1\r\n\
SUMMARY:Analysis I\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:3\r\n\
SUMMARY:Lineare Algebra\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

async fn mount_feed(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/calendar"))
        .mount(server)
        .await;
}

fn refresher(url: String, store: ArtifactStore) -> FeedRefresher {
    FeedRefresher::new(
        url,
        FilterRule::new(["hochschulsport"]),
        Arc::new(ReqwestFetcher::new(FetchSettings::default())),
        store,
    )
}

#[tokio::test]
async fn refresh_publishes_cleaned_feed() {
    init_logging();
    let server = MockServer::start().await;
    mount_feed(&server, "/plan.ics", UPSTREAM).await;
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().join("calendar.ics"));
    let refresher = refresher(format!("{}/plan.ics", server.uri()), store.clone());

    let outcome = refresher.refresh_once().await.unwrap();

    assert_eq!(store.read().unwrap().as_deref(), Some(CLEANED));
    assert_eq!(outcome.bytes_written, CLEANED.len() as u64);
    assert_eq!(outcome.report.entries_in, 3);
    assert_eq!(outcome.report.entries_kept, 2);
    assert_eq!(
        outcome.report.excluded[0].title.as_deref(),
        Some("Hochschulsport Fußball")
    );
    assert_eq!(outcome.digest, feed_engine::short_digest(CLEANED.as_bytes()));

    let status = refresher.status();
    assert_eq!(status.last_success, Some(outcome));
    assert!(status.last_failure.is_none());
    assert!(!refresher.is_refreshing());
}

#[tokio::test]
async fn structural_error_keeps_previous_artifact() {
    init_logging();
    let server = MockServer::start().await;
    mount_feed(&server, "/good.ics", UPSTREAM).await;
    mount_feed(&server, "/truncated.ics", "BEGIN:VCALENDAR\nBEGIN:VEVENT\nUID:1\n").await;
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().join("calendar.ics"));

    refresher(format!("{}/good.ics", server.uri()), store.clone())
        .refresh_once()
        .await
        .unwrap();

    let broken = refresher(format!("{}/truncated.ics", server.uri()), store.clone());
    let err = broken.refresh_once().await.unwrap_err();

    assert!(matches!(err, RefreshError::Structural(_)), "got {err:?}");
    assert_eq!(store.read().unwrap().as_deref(), Some(CLEANED));
    let status = broken.status();
    assert!(status.last_success.is_none());
    assert!(status.last_failure.unwrap().message.contains("END:VCALENDAR"));
}

#[tokio::test]
async fn structural_error_without_previous_artifact_writes_nothing() {
    init_logging();
    let server = MockServer::start().await;
    mount_feed(&server, "/plan.ics", "VERSION:2.0\n").await;
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().join("calendar.ics"));

    let err = refresher(format!("{}/plan.ics", server.uri()), store.clone())
        .refresh_once()
        .await
        .unwrap_err();

    assert!(matches!(err, RefreshError::Structural(_)));
    assert!(!store.exists());
}

#[tokio::test]
async fn upstream_failure_keeps_previous_artifact() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plan.ics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().join("calendar.ics"));
    store.publish(CLEANED).unwrap();

    let err = refresher(format!("{}/plan.ics", server.uri()), store.clone())
        .refresh_once()
        .await
        .unwrap_err();

    match err {
        RefreshError::Fetch(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(503)),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(store.read().unwrap().as_deref(), Some(CLEANED));
}

#[tokio::test]
async fn overlapping_refresh_is_rejected() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plan.ics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_raw(UPSTREAM, "text/calendar"),
        )
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().join("calendar.ics"));
    let refresher = refresher(format!("{}/plan.ics", server.uri()), store.clone());

    let (first, second) = tokio::join!(refresher.refresh_once(), refresher.refresh_once());

    assert!(first.is_ok());
    assert!(matches!(second, Err(RefreshError::InProgress)));
    assert_eq!(store.read().unwrap().as_deref(), Some(CLEANED));

    // The flag is released once the cycle ends.
    assert!(refresher.refresh_once().await.is_ok());
}
