use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use scout_logging::{scout_debug, scout_warn};
use tokio::runtime::Runtime;

use crate::feed::LogFeed;
use crate::poller::StatsPoller;
use crate::{Backend, EngineEvent, RunId, StartRequest};

/// Receiver of everything the engine observes.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

enum EngineCommand {
    Start { run: RunId, request: StartRequest },
    Stop { run: RunId },
    AttachLogFeed { run: RunId },
    DetachLogFeed,
    StartPolling { run: RunId, interval: Duration },
    StopPolling,
    WatchInterrupts,
    Shutdown,
}

/// Handle to the engine thread, which owns the tokio runtime, the log feed
/// and the stats poller. Commands are applied in the order they are sent.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn Backend>, sink: Arc<dyn EventSink>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("scout-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("scout-engine-commands".to_string())
            .spawn(move || run_commands(runtime, backend, sink, cmd_rx))?;

        Ok(Self {
            cmd_tx,
            worker: Some(worker),
        })
    }

    pub fn start_job(&self, run: RunId, request: StartRequest) {
        self.send(EngineCommand::Start { run, request });
    }

    pub fn stop_job(&self, run: RunId) {
        self.send(EngineCommand::Stop { run });
    }

    pub fn attach_log_feed(&self, run: RunId) {
        self.send(EngineCommand::AttachLogFeed { run });
    }

    pub fn detach_log_feed(&self) {
        self.send(EngineCommand::DetachLogFeed);
    }

    pub fn start_polling(&self, run: RunId, interval: Duration) {
        self.send(EngineCommand::StartPolling { run, interval });
    }

    pub fn stop_polling(&self) {
        self.send(EngineCommand::StopPolling);
    }

    /// Post [`EngineEvent::Interrupted`] for every Ctrl-C from now on.
    pub fn watch_interrupts(&self) {
        self.send(EngineCommand::WatchInterrupts);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            scout_warn!("Engine thread is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_commands(
    runtime: Runtime,
    backend: Arc<dyn Backend>,
    sink: Arc<dyn EventSink>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
) {
    let mut feed = LogFeed::new();
    let mut poller = StatsPoller::new();

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Start { run, request } => {
                let backend = backend.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    let result = backend.start(&request).await;
                    sink.emit(EngineEvent::StartReplied { run, result });
                });
            }
            EngineCommand::Stop { run } => {
                let backend = backend.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    let result = backend.stop().await;
                    sink.emit(EngineEvent::StopReplied { run, result });
                });
            }
            EngineCommand::AttachLogFeed { run } => {
                feed.attach(runtime.handle(), backend.clone(), sink.clone(), run);
            }
            EngineCommand::DetachLogFeed => feed.detach(),
            EngineCommand::StartPolling { run, interval } => {
                poller.start(runtime.handle(), backend.clone(), sink.clone(), run, interval);
            }
            EngineCommand::StopPolling => poller.stop(),
            EngineCommand::WatchInterrupts => {
                let sink = sink.clone();
                runtime.spawn(watch_interrupts(sink));
            }
            EngineCommand::Shutdown => break,
        }
    }

    feed.detach();
    poller.stop();
    scout_debug!("Engine thread shutting down");
    runtime.shutdown_timeout(Duration::from_millis(500));
}

async fn watch_interrupts(sink: Arc<dyn EventSink>) {
    loop {
        if let Err(err) = tokio::signal::ctrl_c().await {
            scout_warn!("Ctrl-C handler unavailable: {}", err);
            return;
        }
        sink.emit(EngineEvent::Interrupted);
    }
}
