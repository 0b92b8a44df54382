//! Issue events, the unit of the append-only issue log.
//!
//! Every line of an issue log is one [`Event`]: a timestamp, the issue ID it
//! applies to, and a typed payload. Decoding is lenient. Absent fields take
//! their documented defaults, `blocked_by` is accepted as an alias of
//! `depends_on`, and an unrecognized `type` decodes as
//! [`EventPayload::Unknown`] so the reconstructor can skip it.

use crate::domain::{DEFAULT_PRIORITY, IssueId, IssueType, MAX_PRIORITY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Format of every timestamp written to a log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a UTC instant the way log records store it.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One record of the issue log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEvent")]
pub struct Event {
    /// ISO 8601 UTC timestamp; the merge sort key
    pub ts: String,

    /// Issue the event applies to
    pub id: IssueId,

    /// What happened
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Event kinds, tagged on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventPayload {
    /// Issue creation
    Created(Created),

    /// Partial field update
    Updated(Updated),

    /// Note appended
    Note(NoteAdded),

    /// Issue closed
    Closed(Closed),

    /// A `type` this version does not know. Never written.
    #[serde(skip_serializing)]
    Unknown(String),
}

impl EventPayload {
    /// Wire name of the event kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Note(_) => "note",
            Self::Closed(_) => "closed",
            Self::Unknown(kind) => kind,
        }
    }
}

/// Payload of a `created` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    /// Issue title
    pub title: String,

    /// Issue type
    pub issue_type: IssueType,

    /// Priority (0-4)
    pub priority: u8,

    /// Description, omitted when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Initial dependencies, omitted when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<IssueId>,

    /// Initial labels, omitted when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Payload of an `updated` event. Only present fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Updated {
    /// New priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,

    /// Replacement label set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// Replacement dependency set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<IssueId>>,

    /// Why the update was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Payload of a `note` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteAdded {
    /// Note text
    pub content: String,
}

/// Payload of a `closed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Closed {
    /// Why the issue was closed
    pub reason: String,
}

impl Event {
    /// Build an event.
    pub fn new(ts: impl Into<String>, id: IssueId, payload: EventPayload) -> Self {
        Self {
            ts: ts.into(),
            id,
            payload,
        }
    }
}

/// Superset of every field any event kind may carry.
#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    ts: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    id: IssueId,
    title: Option<String>,
    issue_type: Option<IssueType>,
    priority: Option<i64>,
    description: Option<String>,
    depends_on: Option<Vec<IssueId>>,
    blocked_by: Option<Vec<IssueId>>,
    labels: Option<Vec<String>>,
    reason: Option<String>,
    content: Option<String>,
}

/// Clamp a logged priority into `0..=MAX_PRIORITY`.
fn clamp_priority(id: &IssueId, priority: i64) -> u8 {
    let clamped = priority.clamp(0, i64::from(MAX_PRIORITY));
    if clamped != priority {
        warn!("Priority {priority} on {id} is out of range, using {clamped}");
    }
    u8::try_from(clamped).unwrap_or(DEFAULT_PRIORITY)
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        let depends_on = raw.depends_on.or(raw.blocked_by);
        let priority = raw.priority.map(|p| clamp_priority(&raw.id, p));
        let payload = match raw.kind.as_str() {
            "created" => EventPayload::Created(Created {
                title: raw.title.unwrap_or_default(),
                issue_type: raw.issue_type.unwrap_or_default(),
                priority: priority.unwrap_or(DEFAULT_PRIORITY),
                description: raw.description.unwrap_or_default(),
                depends_on: depends_on.unwrap_or_default(),
                labels: raw.labels.unwrap_or_default(),
            }),
            "updated" => EventPayload::Updated(Updated {
                priority,
                labels: raw.labels,
                depends_on,
                reason: raw.reason,
            }),
            "note" => EventPayload::Note(NoteAdded {
                content: raw.content.unwrap_or_default(),
            }),
            "closed" => EventPayload::Closed(Closed {
                reason: raw.reason.unwrap_or_default(),
            }),
            other => EventPayload::Unknown(other.to_string()),
        };
        Self {
            ts: raw.ts,
            id: raw.id,
            payload,
        }
    }
}
