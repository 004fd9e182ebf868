//! Error types for algoviz-playback.

use thiserror::Error;

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when starting or configuring playback.
#[derive(Debug, Error)]
pub enum Error {
    /// The executor refused to start (missing endpoint).
    #[error("precondition failed: {0}")]
    Precondition(#[from] algoviz_trace::Error),

    /// The model rejected a command or parameter.
    #[error("precondition failed: {0}")]
    Model(#[from] algoviz_model::Error),

    /// A run is in progress; the request was not queued.
    #[error("a run is already active")]
    RunAlreadyActive,

    /// Speed must lie between `MIN_SPEED` and `MAX_SPEED` steps per second.
    #[error("invalid speed {0}: expected 0.01 to 1000 steps per second")]
    InvalidSpeed(f64),

    /// Configuration is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Playback was requested outside a Tokio runtime.
    #[error("no Tokio runtime available to drive playback")]
    NoRuntime,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The draining task panicked.
    #[error("playback task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Coarse classification for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Refused before any step was produced.
    PreconditionFailed,
    RunAlreadyActive,
    /// Environment or defect; not caused by the request itself.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Precondition(_)
            | Error::Model(_)
            | Error::InvalidSpeed(_)
            | Error::Config(_)
            | Error::Json(_) => ErrorKind::PreconditionFailed,
            Error::RunAlreadyActive => ErrorKind::RunAlreadyActive,
            Error::NoRuntime | Error::Io(_) | Error::Task(_) => ErrorKind::Internal,
        }
    }
}
