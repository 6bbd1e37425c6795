#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use scout_engine::{EngineEvent, EventSink};

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Wait until `done` holds for the collected events or the timeout passes.
    pub async fn wait_until<F>(&self, timeout: Duration, done: F) -> Vec<EngineEvent>
    where
        F: Fn(&[EngineEvent]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let events = self.snapshot();
            if done(&events) || tokio::time::Instant::now() >= deadline {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Blocking variant of [`TestSink::wait_until`] for tests that own no runtime.
    pub fn wait_blocking<F>(&self, timeout: Duration, done: F) -> Vec<EngineEvent>
    where
        F: Fn(&[EngineEvent]) -> bool,
    {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let events = self.snapshot();
            if done(&events) || std::time::Instant::now() >= deadline {
                return events;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
