//! Scout engine: backend IO and effect execution.
mod client;
mod engine;
mod feed;
mod poller;
mod sse;
mod task;
mod types;
mod wire;

pub use client::{Backend, ClientSettings, LogStream, ReqwestBackend};
pub use engine::{EngineHandle, EventSink};
pub use feed::LogFeed;
pub use poller::{StatsPoller, MIN_POLL_INTERVAL};
pub use sse::SseDecoder;
pub use types::{EngineEvent, RunId, StartReply, TransportError};
pub use wire::{StartRequest, StatsReport};
