//! Error types shared by every tsgraph crate

use thiserror::Error;

/// Main error type for plotting operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    /// Dataset matrix does not agree with its axis arrays
    #[error(
        "Dimension mismatch: matrix is {rows}x{cols} but x has {x_len} and y has {y_len} values"
    )]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        x_len: usize,
        y_len: usize,
    },

    /// Element-wise operation on arrays of different length
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Operation needs more samples than were given
    #[error("At least {required} points are required, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    /// Requested behavior has no implementation (e.g. an indexed scale without a table)
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid margin: {0}")]
    InvalidMargin(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Drawing surface missing or rejected by the host
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
}

impl From<serde_json::Error> for PlotError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Result type alias for plotting operations
pub type Result<T> = std::result::Result<T, PlotError>;
