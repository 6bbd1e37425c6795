use std::fmt;

use chrono::NaiveTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    System,
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveTime,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Operator-visible job log. Append-only within a run; restarted per run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogBook {
    entries: Vec<LogEntry>,
    generation: u64,
}

impl LogBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: NaiveTime, severity: Severity, message: impl Into<String>) {
        self.entries.push(LogEntry {
            timestamp,
            message: message.into(),
            severity,
        });
    }

    /// Drop all entries and bump the generation so renderers can tell a
    /// restarted log from a grown one.
    pub fn restart(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn entry_renders_with_24h_timestamp() {
        let entry = LogEntry {
            timestamp: at(14, 5, 9),
            message: "Found 12 businesses".to_string(),
            severity: Severity::Info,
        };
        assert_eq!(entry.to_string(), "[14:05:09] Found 12 businesses");
    }

    #[test]
    fn restart_clears_and_bumps_generation() {
        let mut book = LogBook::new();
        book.push(at(9, 0, 0), Severity::System, "one");
        book.push(at(9, 0, 1), Severity::Info, "two");
        assert_eq!(book.len(), 2);

        book.restart();
        assert!(book.is_empty());
        assert_eq!(book.generation(), 1);
    }
}
