//! Error types for logbook operations.

use crate::domain::{IssueId, SessionId};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`Error`], used by the CLI for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// An ID named by the caller does not exist.
    Reference,

    /// The operation is not allowed in the entity's current state.
    InvalidState,

    /// A log line could not be decoded.
    MalformedLog,

    /// Filesystem failure.
    Io,

    /// Configuration could not be resolved.
    Config,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The namespace prefix failed validation.
    #[error("Invalid prefix '{prefix}': {reason}")]
    InvalidPrefix {
        /// The rejected value, as given
        prefix: String,
        /// What rule it broke
        reason: &'static str,
    },

    /// The config file is not valid YAML.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Path of the config file
        path: PathBuf,
        /// Underlying YAML error
        #[source]
        source: serde_yaml::Error,
    },
}

/// The error type for logbook operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A log line could not be decoded as a record.
    #[error("Malformed log {}: line {line}: {message}", path.display())]
    MalformedLog {
        /// Log file holding the bad line
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Decoder message
        message: String,
    },

    /// Storage layer rejected a record.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Issue not found.
    #[error("Issue not found: {0}")]
    IssueNotFound(IssueId),

    /// A dependency names an issue that does not exist.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(IssueId),

    /// Session not found.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The issue is already closed.
    #[error("Issue {0} is already closed")]
    AlreadyClosed(IssueId),

    /// The issue is closed and can no longer change.
    #[error("Cannot modify closed issue {0}")]
    IssueClosed(IssueId),

    /// Every requested dependency is already present.
    #[error("{id} already depends on {}", join(deps))]
    DependenciesAlreadyPresent {
        /// Issue being modified
        id: IssueId,
        /// Requested dependencies
        deps: Vec<IssueId>,
    },

    /// None of the dependencies to remove are present.
    #[error("{id} does not depend on {}", join(deps))]
    DependenciesNotPresent {
        /// Issue being modified
        id: IssueId,
        /// Requested dependencies
        deps: Vec<IssueId>,
    },

    /// Priority outside 0-4.
    #[error("Invalid priority {0}: must be between 0 and 4")]
    InvalidPriority(u8),

    /// Issue title is empty.
    #[error("Issue title cannot be empty")]
    EmptyTitle,

    /// A close was requested without a reason.
    #[error("Closing {0} requires a reason")]
    EmptyCloseReason(IssueId),

    /// The namespace already holds the largest representable sequence number.
    #[error("No sequence numbers left in namespace {0}")]
    NamespaceExhausted(String),
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IssueNotFound(_) | Self::DependencyNotFound(_) | Self::SessionNotFound(_) => {
                ErrorCategory::Reference
            }
            Self::AlreadyClosed(_)
            | Self::IssueClosed(_)
            | Self::DependenciesAlreadyPresent { .. }
            | Self::DependenciesNotPresent { .. }
            | Self::InvalidPriority(_)
            | Self::EmptyTitle
            | Self::EmptyCloseReason(_)
            | Self::NamespaceExhausted(_) => ErrorCategory::InvalidState,
            Self::MalformedLog { .. } => ErrorCategory::MalformedLog,
            Self::Io(_) | Self::Json(_) | Self::Storage(_) => ErrorCategory::Io,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Translate a JSONL-layer error raised while touching `path`.
    pub(crate) fn from_jsonl(err: logbook_jsonl::Error, path: PathBuf) -> Self {
        match err {
            logbook_jsonl::Error::Io(e) => Self::Io(e),
            logbook_jsonl::Error::Json(e) => Self::Json(e),
            logbook_jsonl::Error::Parse {
                line_number,
                source,
            } => Self::MalformedLog {
                path,
                line: line_number,
                message: source.to_string(),
            },
            logbook_jsonl::Error::InvalidFormat(msg) => Self::Storage(msg),
        }
    }
}

fn join(ids: &[IssueId]) -> String {
    ids.iter()
        .map(IssueId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A specialized Result type for logbook operations.
pub type Result<T> = std::result::Result<T, Error>;
