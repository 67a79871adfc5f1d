//! Error types raised while building, loading or generating tasks.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by task construction, persistence and generation.
///
/// Infeasible tasks are not errors: a solver facing a budget that is too
/// tight returns a degenerate [`Solution`](crate::solution::Solution) instead.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Vehicle speed must be strictly positive and finite.
    #[error("speed must be a positive finite number, got {0}")]
    InvalidSpeed(f64),
    /// Flight-time budget must be strictly positive and finite.
    #[error("time budget must be a positive finite number, got {0}")]
    InvalidTimeBudget(f64),
    /// The declared object count disagrees with the object list.
    #[error("object count n = {declared} does not match {actual} object descriptors")]
    ObjectCountMismatch { declared: usize, actual: usize },
    /// A coordinate is negative, NaN or infinite.
    #[error("{what} has invalid coordinates ({x}, {y})")]
    InvalidCoordinate { what: String, x: f64, y: f64 },
    /// An inspection dwell time is negative, NaN or infinite.
    #[error("object {index} has invalid dwell time {dwell}")]
    InvalidDwell { index: usize, dwell: f64 },
    /// The generator field has fewer free cells than requested objects.
    #[error("a field of side {field} cannot hold {requested} distinct objects besides A and B")]
    FieldTooSmall { field: u32, requested: usize },
    /// Reading or writing a task file failed.
    #[error("cannot access task file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The task JSON could not be parsed or produced.
    #[error("malformed task JSON")]
    Json(#[from] serde_json::Error),
}
