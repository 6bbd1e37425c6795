mod common;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::TestSink;
use scout_engine::{
    Backend, EngineEvent, LogStream, StartReply, StartRequest, StatsPoller, StatsReport,
    TransportError,
};
use tokio::runtime::Handle;

/// Backend that replays scripted stats; the last report repeats forever.
struct ScriptedStats {
    script: Mutex<VecDeque<Result<StatsReport, TransportError>>>,
    calls: AtomicUsize,
}

impl ScriptedStats {
    fn new(script: Vec<Result<StatsReport, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedStats {
    async fn start(&self, _request: &StartRequest) -> Result<StartReply, TransportError> {
        Ok(StartReply::Accepted)
    }

    async fn stop(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn stats(&self) -> Result<StatsReport, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }

    async fn open_logs(&self) -> Result<LogStream, TransportError> {
        Err(TransportError::Network("no logs".to_string()))
    }
}

fn report(status: &str, progress: u8) -> StatsReport {
    StatsReport {
        progress,
        status: status.to_string(),
        ..StatsReport::default()
    }
}

fn stats_events(events: &[EngineEvent]) -> Vec<(u64, StatsReport)> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Stats { run, report } => Some((*run, report.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn poller_ends_after_terminal_status() {
    let backend = ScriptedStats::new(vec![
        Ok(report("Running", 40)),
        Ok(report("Completed", 100)),
        Ok(report("Running", 10)),
    ]);
    let sink = TestSink::new();
    let mut poller = StatsPoller::new();
    poller.start(
        &Handle::current(),
        backend.clone(),
        Arc::new(sink.clone()),
        1,
        Duration::from_millis(100),
    );

    let events = sink
        .wait_until(Duration::from_secs(2), |events| stats_events(events).len() >= 2)
        .await;
    tokio::time::sleep(Duration::from_millis(350)).await;

    assert_eq!(
        stats_events(&events),
        vec![(1, report("Running", 40)), (1, report("Completed", 100))]
    );
    assert_eq!(stats_events(&sink.snapshot()).len(), 2);
    assert_eq!(backend.calls(), 2);
    assert!(!poller.is_running());
}

#[tokio::test]
async fn first_fetch_happens_immediately() {
    let backend = ScriptedStats::new(vec![Ok(report("Running", 5))]);
    let sink = TestSink::new();
    let mut poller = StatsPoller::new();
    poller.start(
        &Handle::current(),
        backend.clone(),
        Arc::new(sink.clone()),
        3,
        Duration::from_secs(60),
    );

    let events = sink
        .wait_until(Duration::from_secs(1), |events| !events.is_empty())
        .await;
    assert_eq!(stats_events(&events), vec![(3, report("Running", 5))]);
    poller.stop();
}

#[tokio::test]
async fn restarting_replaces_the_previous_timer() {
    let backend = ScriptedStats::new(vec![Ok(report("Running", 5))]);
    let sink = TestSink::new();
    let mut poller = StatsPoller::new();
    let handle = Handle::current();
    poller.start(&handle, backend.clone(), Arc::new(sink.clone()), 1, Duration::from_millis(100));
    poller.start(&handle, backend.clone(), Arc::new(sink.clone()), 2, Duration::from_millis(100));

    tokio::time::sleep(Duration::from_millis(250)).await;
    poller.stop();
    poller.stop();

    let runs: Vec<u64> = stats_events(&sink.snapshot()).into_iter().map(|(run, _)| run).collect();
    assert!(!runs.is_empty());
    assert!(runs.iter().all(|run| *run == 2), "{runs:?}");
    assert!(!poller.is_running());
}

#[tokio::test]
async fn failed_polls_are_skipped_and_polling_continues() {
    let backend = ScriptedStats::new(vec![
        Err(TransportError::HttpStatus(502)),
        Ok(report("Error", 30)),
    ]);
    let sink = TestSink::new();
    let mut poller = StatsPoller::new();
    poller.start(
        &Handle::current(),
        backend.clone(),
        Arc::new(sink.clone()),
        4,
        Duration::from_millis(100),
    );

    let events = sink
        .wait_until(Duration::from_secs(2), |events| !events.is_empty())
        .await;
    assert_eq!(stats_events(&events), vec![(4, report("Error", 30))]);
    assert_eq!(backend.calls(), 2);
}
