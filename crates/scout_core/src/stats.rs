/// Job status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
    Aborted,
}

impl JobStatus {
    /// Map a backend status label. Unknown labels ("Searching...",
    /// "Exporting...") are progress stages of a live job.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "" | "Idle" => JobStatus::Idle,
            "Completed" => JobStatus::Completed,
            "Error" => JobStatus::Error,
            "Aborted" => JobStatus::Aborted,
            _ => JobStatus::Running,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Error | JobStatus::Aborted
        )
    }
}

/// Latest aggregate statistics; each snapshot replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub total: u64,
    pub with_website: u64,
    pub with_phone: u64,
    pub with_social: u64,
    pub with_pixels: u64,
    pub with_email: u64,
    pub progress_percent: u8,
    pub status: JobStatus,
    pub status_label: String,
}

impl StatsSnapshot {
    /// Snapshot with only status and progress set; handy for callers that
    /// build snapshots incrementally.
    pub fn with_status(label: &str, progress_percent: u8) -> Self {
        Self {
            progress_percent: progress_percent.min(100),
            status: JobStatus::from_label(label),
            status_label: label.to_string(),
            ..Self::default()
        }
    }
}
