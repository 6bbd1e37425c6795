use thiserror::Error;

use crate::wire::StatsReport;

pub type RunId = u64;

/// Events posted by the engine to its [`crate::EventSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StartReplied {
        run: RunId,
        result: Result<StartReply, TransportError>,
    },
    StopReplied {
        run: RunId,
        result: Result<(), TransportError>,
    },
    LogLine {
        run: RunId,
        line: String,
    },
    /// The log stream ended or could not be opened.
    LogClosed {
        run: RunId,
    },
    Stats {
        run: RunId,
        report: StatsReport,
    },
    /// The process received Ctrl-C.
    Interrupted,
}

/// Backend answer to a start command that reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartReply {
    Accepted,
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("{0}")]
    Network(String),
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(err.to_string());
        }
        if err.is_decode() {
            return TransportError::Decode(err.to_string());
        }
        TransportError::Network(err.to_string())
    }
}
