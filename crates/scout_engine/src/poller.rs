use std::sync::Arc;
use std::time::Duration;

use scout_logging::{scout_debug, scout_info, scout_warn};
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::task::TaskSlot;
use crate::{Backend, EngineEvent, EventSink, RunId};

/// Lower bound applied to the poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Periodic stats fetcher for the active run.
///
/// Fetches immediately, then once per interval. A terminal status is posted
/// and ends the loop in the same tick, so nothing is fetched for that run
/// afterwards.
#[derive(Debug, Default)]
pub struct StatsPoller {
    slot: TaskSlot,
}

impl StatsPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        runtime: &Handle,
        backend: Arc<dyn Backend>,
        sink: Arc<dyn EventSink>,
        run: RunId,
        interval: Duration,
    ) {
        let interval = interval.max(MIN_POLL_INTERVAL);
        self.slot.replace(runtime, move |cancel| {
            poll(backend, sink, run, interval, cancel)
        });
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        if self.slot.clear() {
            scout_debug!("Stats poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_live()
    }
}

async fn poll(
    backend: Arc<dyn Backend>,
    sink: Arc<dyn EventSink>,
    run: RunId,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    scout_info!(
        "Stats poller started for run {} interval_ms={}",
        run,
        interval.as_millis()
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        let fetched = tokio::select! {
            _ = cancel.cancelled() => return,
            fetched = backend.stats() => fetched,
        };
        match fetched {
            Ok(report) => {
                let terminal = report.is_terminal();
                if terminal {
                    scout_info!("Run {} reported terminal status {:?}", run, report.status);
                }
                sink.emit(EngineEvent::Stats { run, report });
                if terminal {
                    return;
                }
            }
            Err(err) => scout_warn!("Stats poll for run {} failed: {}", run, err),
        }
    }
}
