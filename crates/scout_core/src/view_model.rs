use crate::{
    InputAffordance, JobConfig, JobPhase, LogEntry, RunId, RunOutcome, StatsSnapshot,
};

/// Colour of the status dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indicator {
    #[default]
    Ready,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Borrowed projection of [`crate::AppState`] for one render.
pub struct AppViewModel<'a> {
    pub phase: JobPhase,
    pub status_text: String,
    pub indicator: Indicator,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub active_run: Option<RunId>,
    pub config: Option<JobConfig>,
    pub stats: StatsSnapshot,
    /// Borrowed so a render pass costs nothing per existing entry.
    pub log: &'a [LogEntry],
    /// Bumped each time the log restarts for a new run.
    pub log_generation: u64,
    pub affordance: InputAffordance,
    pub draft_max_results: u32,
    pub clamp_highlight: bool,
    pub last_outcome: Option<RunOutcome>,
    pub dirty: bool,
}
