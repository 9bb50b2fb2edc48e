//! Error types for filterlab

use thiserror::Error;

/// Main error type for filterlab operations.
///
/// Cancellation is not represented here: a cancelled run is a normal
/// [`FilterOutcome::Cancelled`](crate::process::FilterOutcome::Cancelled).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Unsupported channel count: {0} (expected 3)")]
    ChannelCount(usize),

    #[error("Pixel buffer length mismatch: expected {expected}, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    #[error("Invalid kernel shape: {rows}x{cols} (dimensions must be odd and non-zero)")]
    InvalidKernel { rows: usize, cols: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid filter settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("A filter job is already running")]
    WorkerBusy,

    #[error("Filter worker panicked")]
    WorkerPanicked,
}

/// Result type alias for filterlab operations
pub type Result<T> = std::result::Result<T, Error>;
