//! Error types for logbook-jsonl operations.

use std::io;
use thiserror::Error;

/// The error type for logbook-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line could not be parsed as a JSON record.
    #[error("Invalid JSON on line {line_number}: {source}")]
    Parse {
        /// The 1-based line number of the offending line.
        line_number: usize,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid JSONL format.
    #[error("Invalid JSONL format: {0}")]
    InvalidFormat(String),
}

impl Error {
    /// Returns the 1-based line number for parse errors.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Parse { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}

/// A specialized Result type for logbook-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
