mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::TestSink;
use futures_util::stream::{self, StreamExt};
use pretty_assertions::assert_eq;
use scout_engine::{
    Backend, EngineEvent, EngineHandle, LogStream, StartReply, StartRequest, StatsReport,
    TransportError,
};

/// Backend that accepts everything, reports a live job and keeps its log
/// stream open after two lines.
#[derive(Default)]
struct LiveBackend {
    stats_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Backend for LiveBackend {
    async fn start(&self, _request: &StartRequest) -> Result<StartReply, TransportError> {
        Ok(StartReply::Accepted)
    }

    async fn stop(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn stats(&self) -> Result<StatsReport, TransportError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        Ok(StatsReport {
            total: 3,
            progress: 20,
            status: "Searching...".to_string(),
            ..StatsReport::default()
        })
    }

    async fn open_logs(&self) -> Result<LogStream, TransportError> {
        let lines = vec![
            Ok("10:00:01 - INFO - Starting scrape".to_string()),
            Ok("10:00:02 - INFO - Scrolling".to_string()),
        ];
        Ok(stream::iter(lines).chain(stream::pending()).boxed())
    }
}

fn request() -> StartRequest {
    StartRequest {
        keyword: "bakery".to_string(),
        location: "Austin".to_string(),
        max_results: 20,
        headless: true,
        no_website: false,
    }
}

fn count<F>(events: &[EngineEvent], matches: F) -> usize
where
    F: Fn(&EngineEvent) -> bool,
{
    events.iter().filter(|event| matches(event)).count()
}

#[test]
fn start_and_stop_post_their_replies() {
    let sink = TestSink::new();
    let engine = EngineHandle::new(Arc::new(LiveBackend::default()), Arc::new(sink.clone()))
        .expect("engine");

    engine.start_job(4, request());
    engine.stop_job(4);
    let events = sink.wait_blocking(Duration::from_secs(2), |events| events.len() >= 2);

    assert!(events.contains(&EngineEvent::StartReplied {
        run: 4,
        result: Ok(StartReply::Accepted),
    }));
    assert!(events.contains(&EngineEvent::StopReplied {
        run: 4,
        result: Ok(()),
    }));
    assert_eq!(events.len(), 2);
}

#[test]
fn detached_feed_and_stopped_poller_fall_silent() {
    let sink = TestSink::new();
    let engine = EngineHandle::new(Arc::new(LiveBackend::default()), Arc::new(sink.clone()))
        .expect("engine");

    engine.attach_log_feed(5);
    engine.start_polling(5, Duration::from_millis(100));
    let events = sink.wait_blocking(Duration::from_secs(2), |events| {
        count(events, |e| matches!(e, EngineEvent::LogLine { .. })) == 2
            && count(events, |e| matches!(e, EngineEvent::Stats { .. })) >= 2
    });
    assert_eq!(
        count(&events, |e| matches!(e, EngineEvent::LogLine { run: 5, .. })),
        2
    );

    engine.detach_log_feed();
    engine.stop_polling();
    thread::sleep(Duration::from_millis(150));
    let settled = sink.snapshot().len();
    thread::sleep(Duration::from_millis(400));

    let events = sink.snapshot();
    assert_eq!(events.len(), settled);
    assert_eq!(count(&events, |e| matches!(e, EngineEvent::LogClosed { .. })), 0);
}

#[test]
fn dropping_the_handle_releases_every_task() {
    let backend = Arc::new(LiveBackend::default());
    let sink = TestSink::new();
    let engine = EngineHandle::new(backend.clone(), Arc::new(sink.clone())).expect("engine");

    engine.attach_log_feed(1);
    engine.start_polling(1, Duration::from_millis(100));
    sink.wait_blocking(Duration::from_secs(2), |events| {
        count(events, |e| matches!(e, EngineEvent::Stats { .. })) >= 1
    });

    drop(engine);
    assert_eq!(Arc::strong_count(&backend), 1);

    let calls = backend.stats_calls.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(300));
    assert_eq!(backend.stats_calls.load(Ordering::SeqCst), calls);
}
