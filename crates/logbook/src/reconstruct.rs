//! Fold merged logs into current entity state.
//!
//! Reconstruction is a pure left fold over the merged event sequence. Events
//! that make no sense in context are skipped rather than failing the fold:
//!
//! - an event with an empty `id` (logged at `warn`)
//! - a `created` for an ID that already exists (first one wins)
//! - `updated`, `note` or `closed` for an ID never created
//! - a second `closed` for the same issue (first one wins)
//! - an unrecognized event type
//!
//! Because the fold is pure and the merge order is deterministic, any two
//! readers that see the same files reconstruct identical state.

use crate::domain::{
    FieldChange, Issue, IssueId, IssueStatus, Note, Session, SessionId, UpdateRecord,
};
use crate::event::{Created, Event, EventPayload, Updated};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// Current issues keyed by ID, iterated in ID order.
pub type IssueMap = BTreeMap<IssueId, Issue>;

/// What applying one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new issue was added.
    Created,

    /// An existing issue changed.
    Updated,

    /// A note was appended.
    Noted,

    /// The issue was closed.
    Closed,

    /// The event was skipped.
    Ignored(IgnoreReason),
}

/// Why an event was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event has no issue ID.
    MissingId,

    /// A `created` for an ID that already exists.
    DuplicateCreate,

    /// The event targets an issue never created.
    UnknownIssue,

    /// The issue was already closed.
    AlreadyClosed,

    /// The event type is not recognized.
    UnknownType(String),
}

/// Incremental issue reconstructor.
///
/// [`apply`](Self::apply) folds one event at a time, so the write path can
/// extend an already-reconstructed map with the event it just appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstructor {
    issues: IssueMap,
}

impl Reconstructor {
    /// Start from no issues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue folding on top of existing state.
    #[must_use]
    pub fn from_issues(issues: IssueMap) -> Self {
        Self { issues }
    }

    /// Current state.
    #[must_use]
    pub fn issues(&self) -> &IssueMap {
        &self.issues
    }

    /// Consume the reconstructor, returning its state.
    #[must_use]
    pub fn into_issues(self) -> IssueMap {
        self.issues
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: &Event) -> Outcome {
        let outcome = self.apply_inner(event);
        if let Outcome::Ignored(reason) = &outcome {
            match reason {
                IgnoreReason::MissingId => {
                    warn!("Skipping {} event with no issue id (ts {})", event.payload.kind(), event.ts);
                }
                _ => debug!("Skipping {} event for {}: {:?}", event.payload.kind(), event.id, reason),
            }
        }
        outcome
    }

    fn apply_inner(&mut self, event: &Event) -> Outcome {
        if event.id.as_str().is_empty() {
            return Outcome::Ignored(IgnoreReason::MissingId);
        }

        match &event.payload {
            EventPayload::Created(created) => self.create(event, created),
            EventPayload::Updated(update) => self.with_issue(&event.id, |issue| {
                apply_update(issue, &event.ts, update);
                Outcome::Updated
            }),
            EventPayload::Note(note) => self.with_issue(&event.id, |issue| {
                issue.notes.push(Note {
                    ts: event.ts.clone(),
                    content: note.content.clone(),
                });
                Outcome::Noted
            }),
            EventPayload::Closed(closed) => self.with_issue(&event.id, |issue| {
                if issue.status == IssueStatus::Closed {
                    return Outcome::Ignored(IgnoreReason::AlreadyClosed);
                }
                issue.status = IssueStatus::Closed;
                issue.closed_reason = Some(closed.reason.clone());
                issue.closed_at = Some(event.ts.clone());
                Outcome::Closed
            }),
            EventPayload::Unknown(kind) => Outcome::Ignored(IgnoreReason::UnknownType(kind.clone())),
        }
    }

    fn create(&mut self, event: &Event, created: &Created) -> Outcome {
        if self.issues.contains_key(&event.id) {
            return Outcome::Ignored(IgnoreReason::DuplicateCreate);
        }
        self.issues.insert(
            event.id.clone(),
            Issue {
                id: event.id.clone(),
                title: created.title.clone(),
                issue_type: created.issue_type,
                priority: created.priority,
                description: created.description.clone(),
                depends_on: created.depends_on.iter().cloned().collect(),
                labels: created.labels.iter().cloned().collect(),
                status: IssueStatus::Open,
                created_at: event.ts.clone(),
                notes: Vec::new(),
                updates: Vec::new(),
                closed_reason: None,
                closed_at: None,
            },
        );
        Outcome::Created
    }

    fn with_issue(&mut self, id: &IssueId, f: impl FnOnce(&mut Issue) -> Outcome) -> Outcome {
        match self.issues.get_mut(id) {
            Some(issue) => f(issue),
            None => Outcome::Ignored(IgnoreReason::UnknownIssue),
        }
    }
}

fn apply_update(issue: &mut Issue, ts: &str, update: &Updated) {
    let mut record = UpdateRecord {
        ts: ts.to_string(),
        reason: update.reason.clone(),
        priority: None,
        labels: None,
        depends_on: None,
    };

    if let Some(priority) = update.priority {
        record.priority = Some(FieldChange {
            from: issue.priority,
            to: priority,
        });
        issue.priority = priority;
    }
    if let Some(labels) = &update.labels {
        let to: BTreeSet<String> = labels.iter().cloned().collect();
        let from = std::mem::replace(&mut issue.labels, to.clone());
        record.labels = Some(FieldChange { from, to });
    }
    if let Some(deps) = &update.depends_on {
        let to: BTreeSet<IssueId> = deps.iter().cloned().collect();
        let from = std::mem::replace(&mut issue.depends_on, to.clone());
        record.depends_on = Some(FieldChange { from, to });
    }

    issue.updates.push(record);
}

/// Reconstruct every issue from a merged event sequence.
pub fn reconstruct_issues<'a, I>(events: I) -> IssueMap
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut reconstructor = Reconstructor::new();
    for event in events {
        reconstructor.apply(event);
    }
    reconstructor.into_issues()
}

/// Sessions in merge order, indexed by ID. The first record for an ID wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    sessions: Vec<Session>,
    index: HashMap<SessionId, usize>,
}

impl SessionLog {
    /// Build from merged records.
    #[must_use]
    pub fn from_records(records: Vec<Session>) -> Self {
        let mut log = Self::default();
        for session in records {
            log.insert(session);
        }
        log
    }

    /// Add a record. Returns `false` if it was skipped.
    pub fn insert(&mut self, session: Session) -> bool {
        if session.id.as_str().is_empty() {
            warn!("Skipping session record with no id (date {})", session.date);
            return false;
        }
        if self.index.contains_key(&session.id) {
            debug!("Skipping duplicate session record {}", session.id);
            return false;
        }
        self.index.insert(session.id.clone(), self.sessions.len());
        self.sessions.push(session);
        true
    }

    /// Look up a session by ID.
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.index.get(id).map(|&i| &self.sessions[i])
    }

    /// Sessions in merge order (oldest date first).
    #[must_use]
    pub fn as_slice(&self) -> &[Session] {
        &self.sessions
    }

    /// Every known session ID.
    pub fn ids(&self) -> impl Iterator<Item = &SessionId> {
        self.sessions.iter().map(|s| &s.id)
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IssueType;
    use crate::event::{Closed, NoteAdded};

    fn created(ts: &str, id: &str, title: &str, deps: &[&str]) -> Event {
        Event::new(
            ts,
            IssueId::new(id),
            EventPayload::Created(Created {
                title: title.to_string(),
                issue_type: IssueType::Task,
                priority: 2,
                description: String::new(),
                depends_on: deps.iter().map(|d| IssueId::new(*d)).collect(),
                labels: Vec::new(),
            }),
        )
    }

    fn closed(ts: &str, id: &str, reason: &str) -> Event {
        Event::new(
            ts,
            IssueId::new(id),
            EventPayload::Closed(Closed {
                reason: reason.to_string(),
            }),
        )
    }

    fn note(ts: &str, id: &str, content: &str) -> Event {
        Event::new(
            ts,
            IssueId::new(id),
            EventPayload::Note(NoteAdded {
                content: content.to_string(),
            }),
        )
    }

    #[test]
    fn created_issue_starts_open() {
        let issues = reconstruct_issues(&[created("t1", "dp-001", "A", &["dp-000"])]);
        let issue = &issues[&IssueId::new("dp-001")];
        assert!(issue.is_open());
        assert_eq!(issue.created_at, "t1");
        assert!(issue.depends_on.contains(&IssueId::new("dp-000")));
    }

    #[test]
    fn duplicate_create_keeps_first() {
        let mut r = Reconstructor::new();
        assert_eq!(r.apply(&created("t1", "dp-001", "first", &[])), Outcome::Created);
        assert_eq!(
            r.apply(&created("t2", "dp-001", "second", &[])),
            Outcome::Ignored(IgnoreReason::DuplicateCreate)
        );
        assert_eq!(r.issues()[&IssueId::new("dp-001")].title, "first");
    }

    #[test]
    fn events_for_unknown_issue_are_ignored() {
        let mut r = Reconstructor::new();
        assert_eq!(
            r.apply(&note("t1", "dp-404", "hello")),
            Outcome::Ignored(IgnoreReason::UnknownIssue)
        );
        assert!(r.issues().is_empty());
    }

    #[test]
    fn event_without_id_is_ignored() {
        let mut r = Reconstructor::new();
        assert_eq!(
            r.apply(&created("t1", "", "nameless", &[])),
            Outcome::Ignored(IgnoreReason::MissingId)
        );
    }

    #[test]
    fn second_close_is_ignored() {
        let issues = reconstruct_issues(&[
            created("t1", "a", "A", &[]),
            closed("t2", "a", "done"),
            closed("t3", "a", "again"),
        ]);
        let issue = &issues[&IssueId::new("a")];
        assert_eq!(issue.status, IssueStatus::Closed);
        assert_eq!(issue.closed_reason.as_deref(), Some("done"));
        assert_eq!(issue.closed_at.as_deref(), Some("t2"));
    }

    #[test]
    fn notes_and_updates_accumulate_in_order() {
        let update = Event::new(
            "t3",
            IssueId::new("a"),
            EventPayload::Updated(Updated {
                priority: Some(0),
                labels: Some(vec!["urgent".into()]),
                depends_on: Some(vec![IssueId::new("b")]),
                reason: Some("escalated".into()),
            }),
        );
        let issues = reconstruct_issues(&[
            created("t1", "a", "A", &[]),
            note("t2", "a", "one"),
            update,
            note("t4", "a", "two"),
        ]);
        let issue = &issues[&IssueId::new("a")];
        let contents: Vec<_> = issue.notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["one", "two"]);
        assert_eq!(issue.priority, 0);
        assert!(issue.labels.contains("urgent"));

        let record = &issue.updates[0];
        assert_eq!(record.priority, Some(FieldChange { from: 2, to: 0 }));
        assert_eq!(record.reason.as_deref(), Some("escalated"));
        let deps = record.depends_on.as_ref().unwrap();
        assert!(deps.from.is_empty());
        assert_eq!(deps.to.len(), 1);
    }

    #[test]
    fn partial_update_leaves_other_fields() {
        let update = Event::new(
            "t2",
            IssueId::new("a"),
            EventPayload::Updated(Updated {
                priority: Some(4),
                ..Updated::default()
            }),
        );
        let issues = reconstruct_issues(&[created("t1", "a", "A", &["x"]), update]);
        let issue = &issues[&IssueId::new("a")];
        assert_eq!(issue.priority, 4);
        assert_eq!(issue.depends_on.len(), 1);
        assert!(issue.updates[0].depends_on.is_none());
    }

    #[test]
    fn closed_issue_still_accepts_notes() {
        let issues = reconstruct_issues(&[
            created("t1", "a", "A", &[]),
            closed("t2", "a", "done"),
            note("t3", "a", "postmortem"),
        ]);
        assert_eq!(issues[&IssueId::new("a")].notes.len(), 1);
    }

    #[test]
    fn incremental_matches_batch() {
        let events = vec![
            created("t1", "a", "A", &[]),
            created("t2", "b", "B", &["a"]),
            closed("t3", "a", "done"),
        ];
        let batch = reconstruct_issues(&events);

        let mut r = Reconstructor::from_issues(reconstruct_issues(&events[..2]));
        r.apply(&events[2]);
        assert_eq!(r.into_issues(), batch);
    }

    #[test]
    fn session_log_first_record_wins() {
        let first = Session {
            id: SessionId::new("dp-s001"),
            topic: "first".into(),
            ..Session::default()
        };
        let dup = Session {
            topic: "dup".into(),
            ..first.clone()
        };
        let log = SessionLog::from_records(vec![first, dup, Session::default()]);
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(&SessionId::new("dp-s001")).unwrap().topic, "first");
    }
}
