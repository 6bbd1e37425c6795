mod common;

use std::sync::Arc;
use std::time::Duration;

use common::TestSink;
use pretty_assertions::assert_eq;
use scout_engine::{Backend, ClientSettings, EngineEvent, LogFeed, ReqwestBackend};
use tokio::runtime::Handle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> Arc<dyn Backend> {
    Arc::new(
        ReqwestBackend::new(ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        })
        .expect("client"),
    )
}

#[tokio::test]
async fn feed_delivers_lines_skips_heartbeats_and_reports_close() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: 10:00:01 - INFO - Starting scrape\n\ndata: \n\ndata: 10:00:02 - INFO - Found 3 businesses\n\n",
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let mut feed = LogFeed::new();
    let handle = Handle::current();
    // The first attachment is replaced before it ever connects.
    feed.attach(&handle, backend(&server), Arc::new(sink.clone()), 6);
    feed.attach(&handle, backend(&server), Arc::new(sink.clone()), 7);

    let events = sink
        .wait_until(Duration::from_secs(2), |events| {
            events.iter().any(|e| matches!(e, EngineEvent::LogClosed { .. }))
        })
        .await;
    assert_eq!(
        events,
        vec![
            EngineEvent::LogLine {
                run: 7,
                line: "10:00:01 - INFO - Starting scrape".to_string(),
            },
            EngineEvent::LogLine {
                run: 7,
                line: "10:00:02 - INFO - Found 3 businesses".to_string(),
            },
            EngineEvent::LogClosed { run: 7 },
        ]
    );
    assert!(!feed.is_attached());
}

#[tokio::test]
async fn failed_connection_is_reported_as_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let mut feed = LogFeed::new();
    feed.attach(&Handle::current(), backend(&server), Arc::new(sink.clone()), 2);

    let events = sink
        .wait_until(Duration::from_secs(2), |events| !events.is_empty())
        .await;
    assert_eq!(events, vec![EngineEvent::LogClosed { run: 2 }]);
}

#[tokio::test]
async fn detach_is_idempotent_and_silences_the_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_raw("data: late\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let mut feed = LogFeed::new();
    feed.detach();
    feed.attach(&Handle::current(), backend(&server), Arc::new(sink.clone()), 1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    feed.detach();
    feed.detach();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(sink.snapshot().is_empty());
    assert!(!feed.is_attached());
}
