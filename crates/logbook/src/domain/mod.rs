//! Domain types for issue and session tracking.
//!
//! This module contains the entity types that the reconstructor produces from
//! the event logs. Entities are never mutated directly: new state comes only
//! from appending an event and folding it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Priority assigned when a `created` event carries none.
pub const DEFAULT_PRIORITY: u8 = 2;

/// Lowest-urgency priority accepted by write operations (0 is most urgent).
pub const MAX_PRIORITY: u8 = 4;

/// Unique identifier for an issue (`dp-001`, or legacy `001`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub String);

impl IssueId {
    /// Create a new issue ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a session (`dp-s001`, or legacy `s001`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of an issue. Moves only from `Open` to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    /// Issue is open
    Open,

    /// Issue has been closed
    Closed,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Type of issue.
///
/// Unrecognized values in a log decode as [`IssueType::Task`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// Bug fix
    Bug,

    /// New feature
    Feature,

    /// General task
    #[default]
    #[serde(other)]
    Task,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bug => f.write_str("bug"),
            Self::Feature => f.write_str("feature"),
            Self::Task => f.write_str("task"),
        }
    }
}

/// A timestamped note attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// When the note was recorded
    pub ts: String,

    /// Note text
    pub content: String,
}

/// Old and new value of one field touched by an `updated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange<T> {
    /// Value before the update
    pub from: T,

    /// Value after the update
    pub to: T,
}

/// One entry of an issue's update history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// When the update was recorded
    pub ts: String,

    /// Human-readable reason, if the writer gave one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Priority change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<FieldChange<u8>>,

    /// Label set change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<FieldChange<BTreeSet<String>>>,

    /// Dependency set change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<FieldChange<BTreeSet<IssueId>>>,
}

/// Current state of an issue, as reconstructed from its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier for the issue
    pub id: IssueId,

    /// Issue title
    pub title: String,

    /// Issue type
    #[serde(rename = "type")]
    pub issue_type: IssueType,

    /// Priority level (0 = highest, 4 = lowest)
    pub priority: u8,

    /// Issue description
    pub description: String,

    /// Issues this one cannot start before
    pub depends_on: BTreeSet<IssueId>,

    /// Labels
    pub labels: BTreeSet<String>,

    /// Current status
    pub status: IssueStatus,

    /// Creation timestamp (ISO 8601)
    #[serde(rename = "created")]
    pub created_at: String,

    /// Notes in the order they were added
    pub notes: Vec<Note>,

    /// Update history in the order it was applied
    pub updates: Vec<UpdateRecord>,

    /// Reason given when the issue was closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_reason: Option<String>,

    /// Closed timestamp (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
}

impl Issue {
    /// Returns `true` while the issue has not been closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == IssueStatus::Open
    }
}

/// A work session record.
///
/// Sessions are written whole, once, and never change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session
    #[serde(default)]
    pub id: SessionId,

    /// Owning user prefix. Absent on records written before multi-user support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Creation date (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: String,

    /// Free-text topic
    #[serde(default)]
    pub topic: String,

    /// Things learned during the session
    #[serde(default)]
    pub learnings: Vec<String>,

    /// Questions left open
    #[serde(default)]
    pub open_questions: Vec<String>,

    /// Suggested follow-ups
    #[serde(default)]
    pub next_actions: Vec<String>,

    /// Issues touched during the session
    #[serde(default)]
    pub issues_worked: Vec<IssueId>,
}

impl Session {
    /// The user prefix that owns this session.
    ///
    /// Uses the explicit `user` field when present, otherwise the prefix
    /// parsed from a namespaced ID. Legacy `sNNN` sessions have no owner.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        if let Some(user) = self.user.as_deref() {
            return Some(user);
        }
        match crate::id_generation::parse_session_id(self.id.as_str()) {
            crate::id_generation::ParsedId::Namespaced { prefix, .. } => Some(prefix),
            _ => None,
        }
    }
}

/// Data for creating a new issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Issue title
    pub title: String,

    /// Issue type
    pub issue_type: IssueType,

    /// Priority level (0-4)
    pub priority: u8,

    /// Issue description
    pub description: String,

    /// Dependencies; every ID must already exist
    pub depends_on: Vec<IssueId>,

    /// Labels
    pub labels: Vec<String>,
}

impl NewIssue {
    /// A task at the default priority with no description, labels or dependencies.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            issue_type: IssueType::Task,
            priority: DEFAULT_PRIORITY,
            description: String::new(),
            depends_on: Vec::new(),
            labels: Vec::new(),
        }
    }
}

/// Data for creating a new session. Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSession {
    /// Free-text topic
    pub topic: String,

    /// Things learned
    pub learnings: Vec<String>,

    /// Questions left open
    pub open_questions: Vec<String>,

    /// Suggested follow-ups
    pub next_actions: Vec<String>,

    /// Issues touched
    pub issues_worked: Vec<IssueId>,
}
