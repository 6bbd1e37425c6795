use crate::{Command, LicensePolicy, RawJobConfig, RunId, StatsSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Host supplied the licence policy; also forces a clean reset.
    SessionLoaded(LicensePolicy),
    /// User edited the max results input before submitting.
    MaxResultsEdited(u32),
    /// User asked to start a job with the given parameters.
    StartClicked(RawJobConfig),
    /// User asked to abort the running job.
    StopClicked,
    /// Backend accepted the start command.
    StartAccepted { run: RunId },
    /// Backend declined the start command.
    StartRejected { run: RunId, reason: String },
    /// Stop command was delivered.
    StopSent { run: RunId },
    /// A start or stop request failed before reaching the backend.
    TransportFailed {
        run: RunId,
        command: Command,
        message: String,
    },
    /// One event from the log stream.
    LogReceived { run: RunId, line: String },
    /// The log stream ended without being detached.
    LogStreamClosed { run: RunId },
    /// One polled stats snapshot.
    StatsReceived { run: RunId, snapshot: StatsSnapshot },
    /// Clamp highlight timer elapsed.
    ClampNoticeExpired { notice: u64 },
}
