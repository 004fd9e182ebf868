//! Error types for algoviz-trace.

use thiserror::Error;

/// Result type for executor setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an executor refuses to start.
///
/// All of these are raised before the first step exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Grid search requested without a start point.
    #[error("start point is not set")]
    MissingStart,

    /// Grid search requested without an end point.
    #[error("end point is not set")]
    MissingEnd,

    /// The model rejected the input.
    #[error(transparent)]
    Model(#[from] algoviz_model::Error),
}
