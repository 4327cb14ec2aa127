//! Error types for sourcedeco

use thiserror::Error;

/// Result type alias for decoration operations
pub type Result<T> = std::result::Result<T, DecorationError>;

/// Decoration error types
#[derive(Error, Debug)]
pub enum DecorationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid range entry '{entry}': {reason}")]
    InvalidRange { entry: String, reason: String },

    #[error("Range end {end} must be greater than start {start}")]
    InvertedRange { start: usize, end: usize },

    #[error("Range {inner:?} crosses enclosing range {outer:?}")]
    CrossingRanges {
        outer: (usize, usize),
        inner: (usize, usize),
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),
}

impl DecorationError {
    pub(crate) fn invalid_range(entry: &str, reason: impl Into<String>) -> Self {
        DecorationError::InvalidRange {
            entry: entry.to_string(),
            reason: reason.into(),
        }
    }
}
