use scout_logging::{scout_debug, scout_info, scout_warn};

use crate::{
    validate, AppState, Effect, JobPhase, JobStatus, Msg, RunId, RunOutcome, Severity,
    StatsSnapshot,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every asynchronous message names the run it belongs to; messages for a run
/// that is no longer active are dropped, so a late response can never revive
/// a finished job.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionLoaded(policy) => {
            scout_info!(
                "Session loaded tier={} ceiling={:?}",
                policy.tier.as_str(),
                policy.ceiling
            );
            state.install_policy(policy);
            state.reset()
        }
        Msg::MaxResultsEdited(value) => state.set_draft_max_results(value).into_iter().collect(),
        Msg::StartClicked(raw) => {
            if state.phase() != JobPhase::Idle {
                scout_debug!("Start ignored while {:?}", state.phase());
                return (state, Vec::new());
            }
            let validated = match validate(&raw, state.policy()) {
                Ok(validated) => validated,
                Err(err) => {
                    state.log(Severity::Error, format!("Error: {err}"));
                    return (state, Vec::new());
                }
            };

            let config = validated.config;
            let run = state.begin_run(config.clone());
            state.log(Severity::System, "Initializing job parameters...");

            let mut effects = Vec::with_capacity(4);
            if validated.was_clamped {
                let notice = format!(
                    "Max results lowered to {} by the {} license",
                    config.max_results,
                    state.policy().tier.as_str()
                );
                state.log(Severity::Warning, notice);
                effects.push(state.raise_clamp_highlight());
            }
            scout_info!(
                "Run {} starting keyword={:?} location={:?} max_results={}",
                run,
                config.keyword,
                config.location,
                config.max_results
            );
            effects.push(Effect::AttachLogFeed { run });
            effects.push(Effect::SendStart { run, config });
            effects
        }
        Msg::StopClicked => match state.request_stop() {
            Some(run) => vec![Effect::SendStop { run }],
            None => Vec::new(),
        },
        Msg::StartAccepted { run } => {
            if !state.is_current(run) {
                return (state, Vec::new());
            }
            state.acknowledge_start().into_iter().collect()
        }
        Msg::StartRejected { run, reason } => {
            if !state.is_current(run) {
                return (state, Vec::new());
            }
            scout_warn!("Run {} rejected: {}", run, reason);
            state.log(Severity::Error, reason);
            state.finish_run(RunOutcome::Rejected)
        }
        Msg::StopSent { run } => {
            if state.is_current(run) {
                state.log(Severity::Warning, "Abort signal sent...");
            }
            Vec::new()
        }
        Msg::TransportFailed {
            run,
            command,
            message,
        } => {
            if !state.is_current(run) {
                return (state, Vec::new());
            }
            scout_warn!("Run {} {:?} request failed: {}", run, command, message);
            state.log(Severity::Error, format!("Connection error: {message}"));
            state.finish_run(RunOutcome::TransportFailure)
        }
        Msg::LogReceived { run, line } => {
            if state.is_current(run) && !line.trim().is_empty() {
                state.log(Severity::Info, line);
            }
            Vec::new()
        }
        Msg::LogStreamClosed { run } => {
            if state.is_current(run) {
                state.log(Severity::Warning, "Log stream disconnected");
            }
            Vec::new()
        }
        Msg::StatsReceived { run, snapshot } => {
            if !state.is_current(run) {
                scout_debug!("Dropping stats for inactive run {}", run);
                return (state, Vec::new());
            }
            apply_stats(&mut state, run, snapshot)
        }
        Msg::ClampNoticeExpired { notice } => {
            state.expire_clamp_highlight(notice);
            Vec::new()
        }
    };

    (state, effects)
}

fn apply_stats(state: &mut AppState, run: RunId, snapshot: StatsSnapshot) -> Vec<Effect> {
    let status = snapshot.status;
    state.replace_stats(snapshot);
    let outcome = match status {
        JobStatus::Completed => {
            state.log(Severity::Success, "Job finished. Data exported.");
            RunOutcome::Completed
        }
        JobStatus::Error => {
            state.log(Severity::Error, "Job ended with an error");
            RunOutcome::Failed
        }
        JobStatus::Aborted => {
            state.log(Severity::Warning, "Job aborted");
            RunOutcome::Aborted
        }
        JobStatus::Idle | JobStatus::Running => return Vec::new(),
    };
    scout_info!("Run {} ended: {:?}", run, outcome);
    state.finish_run(outcome)
}
