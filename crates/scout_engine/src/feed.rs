use std::sync::Arc;

use futures_util::StreamExt;
use scout_logging::{scout_debug, scout_info, scout_warn};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::task::TaskSlot;
use crate::{Backend, EngineEvent, EventSink, RunId};

/// Server-push log connection for the active run.
///
/// At most one connection is live: attaching closes the previous one first.
/// There is no reconnection; when the stream ends on its own the feed posts
/// [`EngineEvent::LogClosed`] once.
#[derive(Debug, Default)]
pub struct LogFeed {
    slot: TaskSlot,
}

impl LogFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(
        &mut self,
        runtime: &Handle,
        backend: Arc<dyn Backend>,
        sink: Arc<dyn EventSink>,
        run: RunId,
    ) {
        if self.slot.is_live() {
            scout_debug!("Closing previous log connection before attaching run {}", run);
        }
        self.slot
            .replace(runtime, move |cancel| follow(backend, sink, run, cancel));
    }

    /// Idempotent: closing an absent connection does nothing.
    pub fn detach(&mut self) {
        if self.slot.clear() {
            scout_debug!("Log connection closed");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.slot.is_live()
    }
}

async fn follow(
    backend: Arc<dyn Backend>,
    sink: Arc<dyn EventSink>,
    run: RunId,
    cancel: CancellationToken,
) {
    let opened = tokio::select! {
        _ = cancel.cancelled() => return,
        opened = backend.open_logs() => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(err) => {
            scout_warn!("Log stream for run {} could not be opened: {}", run, err);
            sink.emit(EngineEvent::LogClosed { run });
            return;
        }
    };
    scout_info!("Log stream attached for run {}", run);

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(line)) => {
                // Empty events are the backend's keep-alive heartbeats.
                if !line.is_empty() {
                    sink.emit(EngineEvent::LogLine { run, line });
                }
            }
            Some(Err(err)) => {
                scout_warn!("Log stream for run {} failed: {}", run, err);
                break;
            }
            None => break,
        }
    }
    sink.emit(EngineEvent::LogClosed { run });
}
