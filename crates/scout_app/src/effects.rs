use std::sync::mpsc;
use std::thread;

use scout_core::{Command, Effect, JobConfig, JobStatus, Msg, StatsSnapshot};
use scout_engine::{EngineEvent, EngineHandle, EventSink, StartReply, StartRequest, StatsReport};
use scout_logging::scout_debug;

/// Everything the console loop consumes, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Msg(Msg),
    Interrupted,
}

/// Posts engine events onto the console queue as messages.
pub struct InboxSink {
    tx: mpsc::Sender<Inbound>,
}

impl InboxSink {
    pub fn new(tx: mpsc::Sender<Inbound>) -> Self {
        Self { tx }
    }
}

impl EventSink for InboxSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(map_event(event));
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Inbound {
    let msg = match event {
        EngineEvent::StartReplied { run, result } => match result {
            Ok(StartReply::Accepted) => Msg::StartAccepted { run },
            Ok(StartReply::Rejected(reason)) => Msg::StartRejected { run, reason },
            Err(err) => Msg::TransportFailed {
                run,
                command: Command::Start,
                message: err.to_string(),
            },
        },
        EngineEvent::StopReplied { run, result } => match result {
            Ok(()) => Msg::StopSent { run },
            Err(err) => Msg::TransportFailed {
                run,
                command: Command::Stop,
                message: err.to_string(),
            },
        },
        EngineEvent::LogLine { run, line } => Msg::LogReceived { run, line },
        EngineEvent::LogClosed { run } => Msg::LogStreamClosed { run },
        EngineEvent::Stats { run, report } => Msg::StatsReceived {
            run,
            snapshot: snapshot_from(report),
        },
        EngineEvent::Interrupted => return Inbound::Interrupted,
    };
    Inbound::Msg(msg)
}

pub(crate) fn snapshot_from(report: StatsReport) -> StatsSnapshot {
    StatsSnapshot {
        total: report.total,
        with_website: report.with_website,
        with_phone: report.with_phone,
        with_social: report.with_social,
        with_pixels: report.with_pixels,
        with_email: report.with_email,
        progress_percent: report.progress.min(100),
        status: JobStatus::from_label(&report.status),
        status_label: report.status,
    }
}

fn start_request(config: &JobConfig) -> StartRequest {
    StartRequest {
        keyword: config.keyword.clone(),
        location: config.location.clone(),
        max_results: config.max_results,
        headless: config.headless,
        no_website: config.exclude_website,
    }
}

/// Executes core effects against the engine and local timers.
pub struct EffectRunner {
    engine: EngineHandle,
    tx: mpsc::Sender<Inbound>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, tx: mpsc::Sender<Inbound>) -> Self {
        Self { engine, tx }
    }

    pub fn watch_interrupts(&self) {
        self.engine.watch_interrupts();
    }

    pub fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            scout_debug!("Effect {:?}", effect);
            match effect {
                Effect::SendStart { run, config } => {
                    self.engine.start_job(run, start_request(&config));
                }
                Effect::SendStop { run } => self.engine.stop_job(run),
                Effect::AttachLogFeed { run } => self.engine.attach_log_feed(run),
                Effect::DetachLogFeed => self.engine.detach_log_feed(),
                Effect::StartPolling { run, interval } => {
                    self.engine.start_polling(run, interval);
                }
                Effect::StopPolling => self.engine.stop_polling(),
                Effect::ScheduleClampReset { notice, after } => {
                    let tx = self.tx.clone();
                    thread::spawn(move || {
                        thread::sleep(after);
                        let _ = tx.send(Inbound::Msg(Msg::ClampNoticeExpired { notice }));
                    });
                }
            }
        }
    }
}
