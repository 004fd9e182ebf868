//! Error types for algoviz-model.

use thiserror::Error;

use crate::grid::Coord;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by structure models.
///
/// Every variant is a precondition failure: the operation was refused and
/// the model is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Coordinate lies outside the grid.
    #[error("coordinate {coord} is outside the {width}x{height} grid")]
    OutOfBounds {
        coord: Coord,
        width: usize,
        height: usize,
    },

    /// Requested grid dimensions are below the minimum side length.
    #[error("grid must be at least {min}x{min}, got {width}x{height}")]
    GridTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    /// A structural parameter is outside its domain.
    #[error("invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        expected: &'static str,
    },

    /// Text input did not parse as an integer key.
    #[error("invalid numeric input: {0:?}")]
    InvalidInput(String),

    /// Obstacle flags do not cover the grid exactly.
    #[error("expected {expected} obstacle flags, got {actual}")]
    ObstacleCount { expected: usize, actual: usize },

    /// Obstacles cannot be placed on the start or end cell.
    #[error("cell {0} is a search endpoint")]
    EndpointCell(Coord),
}

/// Parse user-entered text into a key.
///
/// Surrounding whitespace is ignored; anything else that is not an `i64`
/// is rejected.
pub fn parse_key(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| Error::InvalidInput(input.to_string()))
}
