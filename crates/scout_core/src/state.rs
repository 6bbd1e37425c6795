use std::time::Duration;

use chrono::{Local, NaiveTime};

use crate::view_model::{AppViewModel, Indicator};
use crate::{
    Effect, InputAffordance, JobConfig, LicensePolicy, LogBook, LogEntry, RawJobConfig, Severity,
    StatsSnapshot, CLAMP_HIGHLIGHT,
};

pub type RunId = u64;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    /// Start command issued, not yet acknowledged.
    Starting,
    Running,
    /// Abort requested; waiting for the backend to report a terminal status.
    Stopping,
}

/// How the most recent run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
    Aborted,
    Rejected,
    TransportFailure,
}

/// Source of wall-clock time for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveTime),
}

impl Clock {
    pub fn now(&self) -> NaiveTime {
        match self {
            Clock::System => Local::now().time(),
            Clock::Fixed(time) => *time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    policy: LicensePolicy,
    affordance: InputAffordance,
    draft_max_results: u32,
    phase: JobPhase,
    active_run: Option<RunId>,
    last_run: RunId,
    start_acknowledged: bool,
    config: Option<JobConfig>,
    stats: StatsSnapshot,
    log: LogBook,
    clamp_highlight: bool,
    clamp_notice: u64,
    last_outcome: Option<RunOutcome>,
    poll_interval: Duration,
    clock: Clock,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let policy = LicensePolicy::default();
        let affordance = InputAffordance::for_policy(&policy);
        Self {
            policy,
            affordance,
            draft_max_results: RawJobConfig::default().max_results,
            phase: JobPhase::Idle,
            active_run: None,
            last_run: 0,
            start_acknowledged: false,
            config: None,
            stats: StatsSnapshot::default(),
            log: LogBook::new(),
            clamp_highlight: false,
            clamp_notice: 0,
            last_outcome: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            clock: Clock::System,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn view(&self) -> AppViewModel<'_> {
        let idle = self.phase == JobPhase::Idle;
        let (status_text, indicator) = match self.phase {
            JobPhase::Idle => ("SYSTEM READY", Indicator::Ready),
            JobPhase::Starting | JobPhase::Running => ("JOB ACTIVE", Indicator::Active),
            JobPhase::Stopping => ("STOPPING", Indicator::Active),
        };

        AppViewModel {
            phase: self.phase,
            status_text: status_text.to_string(),
            indicator,
            start_enabled: idle,
            stop_enabled: !idle,
            active_run: self.active_run,
            config: self.config.clone(),
            stats: self.stats.clone(),
            log: self.log.entries(),
            log_generation: self.log.generation(),
            affordance: self.affordance.clone(),
            draft_max_results: self.draft_max_results,
            clamp_highlight: self.clamp_highlight,
            last_outcome: self.last_outcome,
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn policy(&self) -> &LicensePolicy {
        &self.policy
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        self.log.entries()
    }

    /// Returns whether state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, run: RunId) -> bool {
        self.active_run == Some(run)
    }

    pub(crate) fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let now = self.clock.now();
        self.log.push(now, severity, message);
        self.mark_dirty();
    }

    pub(crate) fn install_policy(&mut self, policy: LicensePolicy) {
        self.affordance = InputAffordance::for_policy(&policy);
        self.policy = policy;
        let (draft, _) = self.affordance.clamp_draft(self.draft_max_results);
        self.draft_max_results = draft;
        self.mark_dirty();
    }

    pub(crate) fn set_draft_max_results(&mut self, value: u32) -> Option<Effect> {
        let (draft, clamped) = self.affordance.clamp_draft(value);
        self.draft_max_results = draft;
        self.mark_dirty();
        clamped.then(|| self.raise_clamp_highlight())
    }

    pub(crate) fn raise_clamp_highlight(&mut self) -> Effect {
        self.clamp_notice += 1;
        self.clamp_highlight = true;
        self.mark_dirty();
        Effect::ScheduleClampReset {
            notice: self.clamp_notice,
            after: CLAMP_HIGHLIGHT,
        }
    }

    pub(crate) fn expire_clamp_highlight(&mut self, notice: u64) {
        if notice == self.clamp_notice && self.clamp_highlight {
            self.clamp_highlight = false;
            self.mark_dirty();
        }
    }

    /// Open a new run and return its id. The log restarts for the run.
    pub(crate) fn begin_run(&mut self, config: JobConfig) -> RunId {
        self.last_run += 1;
        let run = self.last_run;
        self.active_run = Some(run);
        self.phase = JobPhase::Starting;
        self.start_acknowledged = false;
        self.draft_max_results = config.max_results;
        self.config = Some(config);
        self.stats = StatsSnapshot::default();
        self.last_outcome = None;
        self.log.restart();
        self.mark_dirty();
        run
    }

    /// Polling starts only once the backend has taken the start, so every
    /// status it fetches belongs to this run. A repeated acceptance is ignored.
    pub(crate) fn acknowledge_start(&mut self) -> Option<Effect> {
        let run = self.active_run?;
        if self.start_acknowledged {
            return None;
        }
        self.start_acknowledged = true;
        if self.phase == JobPhase::Starting {
            self.phase = JobPhase::Running;
        }
        self.mark_dirty();
        Some(Effect::StartPolling {
            run,
            interval: self.poll_interval,
        })
    }

    pub(crate) fn request_stop(&mut self) -> Option<RunId> {
        match (self.phase, self.active_run) {
            (JobPhase::Starting | JobPhase::Running, Some(run)) => {
                self.phase = JobPhase::Stopping;
                self.mark_dirty();
                Some(run)
            }
            _ => None,
        }
    }

    pub(crate) fn replace_stats(&mut self, snapshot: StatsSnapshot) {
        self.stats = snapshot;
        self.mark_dirty();
    }

    /// Tear down the active run: feeds detached, poller stopped, back to idle.
    pub(crate) fn finish_run(&mut self, outcome: RunOutcome) -> Vec<Effect> {
        self.last_outcome = Some(outcome);
        self.reset()
    }

    /// The only path back to idle.
    pub(crate) fn reset(&mut self) -> Vec<Effect> {
        self.phase = JobPhase::Idle;
        self.active_run = None;
        self.start_acknowledged = false;
        self.mark_dirty();
        vec![Effect::DetachLogFeed, Effect::StopPolling]
    }
}
