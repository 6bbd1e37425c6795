use std::time::Duration;

use crate::{JobConfig, RunId};

/// Side effects requested by [`crate::update`]; executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendStart { run: RunId, config: JobConfig },
    SendStop { run: RunId },
    AttachLogFeed { run: RunId },
    DetachLogFeed,
    StartPolling { run: RunId, interval: Duration },
    StopPolling,
    ScheduleClampReset { notice: u64, after: Duration },
}

/// Backend command a transport failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}
