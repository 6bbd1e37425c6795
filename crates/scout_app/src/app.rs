use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::{mpsc, Arc};

use anyhow::Context;
use scout_core::{update, AppState, JobPhase, Msg, RawJobConfig, RunOutcome};
use scout_engine::{Backend, EngineHandle, ReqwestBackend};
use scout_logging::{scout_info, scout_warn};

use crate::config::AppConfig;
use crate::effects::{snapshot_from, EffectRunner, InboxSink, Inbound};
use crate::render::{format_stats, TerminalRenderer};

const EXIT_INVALID_INPUT: u8 = 2;
const EXIT_FAILED: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

/// Run one job to completion, printing its log and progress.
pub fn run_job(config: &AppConfig, raw: RawJobConfig) -> anyhow::Result<ExitCode> {
    let (tx, rx) = mpsc::channel::<Inbound>();

    let backend = ReqwestBackend::new(config.client_settings())
        .context("could not create backend client")?;
    scout_info!("Using backend {}", backend.base_url());
    let engine = EngineHandle::new(Arc::new(backend), Arc::new(InboxSink::new(tx.clone())))
        .context("could not start engine")?;
    let runner = EffectRunner::new(engine, tx);
    runner.watch_interrupts();

    let state = AppState::new().with_poll_interval(config.poll_interval());
    let mut console = Console::new(state, runner, TerminalRenderer::new(io::stdout()));

    console.dispatch(Msg::SessionLoaded(config.license.clone()))?;
    // The flag value goes through the same input path as a typed value.
    console.dispatch(Msg::MaxResultsEdited(raw.max_results))?;
    console.dispatch(Msg::StartClicked(raw))?;
    if console.state.phase() == JobPhase::Idle {
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    }

    let mut interrupts = 0;
    while console.state.phase() != JobPhase::Idle {
        let inbound = rx
            .recv()
            .context("console queue closed while a job was active")?;
        match inbound {
            Inbound::Msg(msg) => console.dispatch(msg)?,
            Inbound::Interrupted => {
                interrupts += 1;
                if interrupts > 1 {
                    scout_warn!("Second interrupt; leaving without waiting for the backend");
                    return Ok(ExitCode::from(EXIT_INTERRUPTED));
                }
                eprintln!("Stopping job; press Ctrl-C again to quit immediately.");
                console.dispatch(Msg::StopClicked)?;
            }
        }
    }

    Ok(ExitCode::from(exit_status(console.state.view().last_outcome)))
}

/// Ask the backend to abort whatever job it is running.
pub fn send_stop(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let backend = ReqwestBackend::new(config.client_settings())?;
    let runtime = one_shot_runtime()?;
    runtime
        .block_on(backend.stop())
        .with_context(|| format!("stop request to {} failed", backend.base_url()))?;
    println!("Abort signal sent.");
    Ok(ExitCode::SUCCESS)
}

/// Print a single stats snapshot.
pub fn show_stats(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let backend = ReqwestBackend::new(config.client_settings())?;
    let runtime = one_shot_runtime()?;
    let report = runtime
        .block_on(backend.stats())
        .with_context(|| format!("stats request to {} failed", backend.base_url()))?;
    println!("{}", format_stats(&snapshot_from(report)));
    Ok(ExitCode::SUCCESS)
}

fn one_shot_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("could not build async runtime")
}

fn exit_status(outcome: Option<RunOutcome>) -> u8 {
    match outcome {
        Some(RunOutcome::Completed | RunOutcome::Aborted) => 0,
        Some(RunOutcome::Failed | RunOutcome::Rejected | RunOutcome::TransportFailure) => {
            EXIT_FAILED
        }
        None => EXIT_INVALID_INPUT,
    }
}

/// Owns the state and feeds every message through `update`, then runs the
/// resulting effects and re-renders when something changed.
struct Console<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer<W>,
}

impl<W: Write> Console<W> {
    fn new(state: AppState, runner: EffectRunner, renderer: TerminalRenderer<W>) -> Self {
        Self {
            state,
            runner,
            renderer,
        }
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.renderer.render(&state.view())?;
        }
        self.state = state;
        self.runner.apply(effects);
        Ok(())
    }
}
