use thiserror::Error;

use crate::sim::Position;

/// Reasons a simulation refuses to start. Always reported before the first
/// tick runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidStart {
    #[error("at least one ignition point is required")]
    NoIgnitionPoints,
    #[error("rows must be between 1 and {max}, got {rows}")]
    RowsOutOfRange { rows: usize, max: usize },
    #[error("cols must be between 1 and {max}, got {cols}")]
    ColsOutOfRange { cols: usize, max: usize },
    #[error("ignition point {position} lies outside the {rows}x{cols} grid")]
    PositionOutOfBounds {
        position: Position,
        rows: usize,
        cols: usize,
    },
    #[error("ignition probability must be in (0, 1], got {0}")]
    IgnitionProbabilityOutOfRange(f64),
    #[error("burn duration must be a positive number of seconds, got {0}")]
    BurnDurationOutOfRange(f64),
}

/// Failures observed when collecting the result of a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("the simulation engine thread panicked")]
    EnginePanicked,
}
