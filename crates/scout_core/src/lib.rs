//! Scout core: pure job-lifecycle state machine and view-model helpers.
mod effect;
mod gate;
mod journal;
mod msg;
mod state;
mod stats;
mod update;
mod view_model;

pub use effect::{Command, Effect};
pub use gate::{
    validate, Field, InputAffordance, JobConfig, LicensePolicy, LicenseTier, RawJobConfig,
    ResultCeiling, Validated, ValidationError, CLAMP_HIGHLIGHT, UNLIMITED_DISPLAY_BOUND,
};
pub use journal::{LogBook, LogEntry, Severity};
pub use msg::Msg;
pub use state::{AppState, Clock, JobPhase, RunId, RunOutcome, DEFAULT_POLL_INTERVAL};
pub use stats::{JobStatus, StatsSnapshot};
pub use update::update;
pub use view_model::{AppViewModel, Indicator};
