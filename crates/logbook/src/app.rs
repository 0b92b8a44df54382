//! Application context for CLI command execution.
//!
//! This module provides the `App` struct, which owns the storage backend
//! and the writer's namespace. Reads reconstruct state from the merged logs
//! on every call. Writes validate against that state, append exactly one
//! record to the writer's own log, and return the updated entity.
//!
//! # Example
//!
//! ```no_run
//! use logbook::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::open(Path::new(".")).await?;
//!     let issues = app.load_issues().await?;
//!     println!("{} issues", issues.len());
//!     Ok(())
//! }
//! ```

use crate::config;
use crate::domain::{Issue, IssueId, MAX_PRIORITY, NewIssue, NewSession, Session, SessionId};
use crate::error::{Error, Result};
use crate::event::{self, Closed, Created, Event, EventPayload, NoteAdded, Updated};
use crate::graph::{DependencyGraph, DisplaySet};
use crate::id_generation::{next_issue_id, next_session_id};
use crate::output::diagram::{self, DiagramFormat};
use crate::reconstruct::{IssueMap, Outcome, Reconstructor, SessionLog, reconstruct_issues};
use crate::storage::{JsonlLogStore, LogStore};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Session dates are calendar days.
const SESSION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current time for new records.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Application context for CLI operations.
pub struct App {
    /// The storage backend (trait object for polymorphism)
    store: Box<dyn LogStore>,

    /// Namespace this writer appends to
    namespace: String,

    /// Whether the namespace was derived rather than configured
    derived_prefix: bool,

    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("namespace", &self.namespace)
            .field("derived_prefix", &self.derived_prefix)
            .field("store", &"<dyn LogStore>")
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App over `store`, writing as `namespace`.
    pub fn new(store: Box<dyn LogStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            derived_prefix: false,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used to stamp new records.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Open the project containing `working_dir`.
    ///
    /// Searches up the directory tree for an existing project root, using
    /// `working_dir` itself when none is found, then resolves the namespace
    /// prefix and opens JSONL storage there.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or an explicitly
    /// configured prefix is invalid.
    pub async fn open(working_dir: &Path) -> Result<Self> {
        let root =
            config::find_project_root(working_dir).unwrap_or_else(|| working_dir.to_path_buf());
        let resolved = config::resolve(&root).await?;
        tracing::debug!(root = %root.display(), prefix = %resolved.prefix, "Opened project");

        let mut app = Self::new(Box::new(JsonlLogStore::new(root)), resolved.prefix);
        app.derived_prefix = resolved.derived;
        Ok(app)
    }

    /// Get the namespace prefix new records are written under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether the prefix was derived instead of configured.
    pub fn prefix_is_derived(&self) -> bool {
        self.derived_prefix
    }

    fn now(&self) -> String {
        event::timestamp(self.clock.now())
    }

    // ========== Reads ==========

    /// Reconstruct every issue from the merged logs.
    pub async fn load_issues(&self) -> Result<IssueMap> {
        let events = self.store.read_events().await?;
        Ok(reconstruct_issues(&events))
    }

    /// Reconstruct every session from the merged logs.
    pub async fn load_sessions(&self) -> Result<SessionLog> {
        Ok(SessionLog::from_records(self.store.read_sessions().await?))
    }

    /// Look up one issue.
    pub async fn get_issue(&self, id: &IssueId) -> Result<Issue> {
        self.load_issues()
            .await?
            .remove(id)
            .ok_or_else(|| Error::IssueNotFound(id.clone()))
    }

    /// Look up one session.
    pub async fn get_session(&self, id: &SessionId) -> Result<Session> {
        self.load_sessions()
            .await?
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.clone()))
    }

    /// The most recent session, if any.
    pub async fn latest_session(&self) -> Result<Option<Session>> {
        Ok(self.load_sessions().await?.as_slice().last().cloned())
    }

    /// Render a dependency diagram of the current issues.
    pub async fn diagram(&self, format: DiagramFormat, display: DisplaySet) -> Result<String> {
        let issues = self.load_issues().await?;
        let graph = DependencyGraph::build(&issues, display);
        Ok(diagram::render(&graph, format))
    }

    // ========== Writes ==========

    /// Append `event` and fold it into `issues`, returning the affected issue.
    async fn commit(&self, issues: IssueMap, event: Event) -> Result<Issue> {
        self.store.append_event(&self.namespace, &event).await?;

        let mut reconstructor = Reconstructor::from_issues(issues);
        let outcome = reconstructor.apply(&event);
        info!(id = %event.id, kind = event.payload.kind(), "Recorded event");

        match outcome {
            Outcome::Ignored(reason) => Err(Error::Storage(format!(
                "{} event for {} was not applied: {reason:?}",
                event.payload.kind(),
                event.id
            ))),
            _ => reconstructor
                .into_issues()
                .remove(&event.id)
                .ok_or_else(|| Error::IssueNotFound(event.id.clone())),
        }
    }

    /// Create an issue with the next ID in this writer's namespace.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyTitle`] if the title is blank
    /// - [`Error::InvalidPriority`] if the priority is above 4
    /// - [`Error::DependencyNotFound`] if a dependency does not exist
    pub async fn create_issue(&self, new: NewIssue) -> Result<Issue> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        if new.priority > MAX_PRIORITY {
            return Err(Error::InvalidPriority(new.priority));
        }

        let issues = self.load_issues().await?;
        if let Some(missing) = new.depends_on.iter().find(|d| !issues.contains_key(*d)) {
            return Err(Error::DependencyNotFound(missing.clone()));
        }

        let id = next_issue_id(issues.keys(), &self.namespace)?;
        let created = Created {
            title: title.to_string(),
            issue_type: new.issue_type,
            priority: new.priority,
            description: new.description,
            depends_on: new.depends_on,
            labels: new.labels,
        };
        let event = Event::new(self.now(), id, EventPayload::Created(created));
        self.commit(issues, event).await
    }

    /// Close an open issue.
    ///
    /// # Errors
    ///
    /// - [`Error::IssueNotFound`] if the issue does not exist
    /// - [`Error::AlreadyClosed`] if it is closed
    /// - [`Error::EmptyCloseReason`] if `reason` is blank
    pub async fn close_issue(&self, id: &IssueId, reason: &str) -> Result<Issue> {
        let issues = self.load_issues().await?;
        let issue = issues
            .get(id)
            .ok_or_else(|| Error::IssueNotFound(id.clone()))?;
        if !issue.is_open() {
            return Err(Error::AlreadyClosed(id.clone()));
        }
        if reason.trim().is_empty() {
            return Err(Error::EmptyCloseReason(id.clone()));
        }

        let payload = EventPayload::Closed(Closed {
            reason: reason.trim().to_string(),
        });
        let event = Event::new(self.now(), id.clone(), payload);
        self.commit(issues, event).await
    }

    /// Add a note to an issue. Closed issues accept notes.
    pub async fn add_note(&self, id: &IssueId, content: &str) -> Result<Issue> {
        let issues = self.load_issues().await?;
        if !issues.contains_key(id) {
            return Err(Error::IssueNotFound(id.clone()));
        }

        let payload = EventPayload::Note(NoteAdded {
            content: content.to_string(),
        });
        let event = Event::new(self.now(), id.clone(), payload);
        self.commit(issues, event).await
    }

    /// Add dependencies to an open issue.
    ///
    /// The appended `updated` event carries the full resulting dependency
    /// set and a reason naming the dependencies that were new.
    ///
    /// # Errors
    ///
    /// - [`Error::IssueNotFound`] or [`Error::DependencyNotFound`] for unknown IDs
    /// - [`Error::IssueClosed`] if the issue is closed
    /// - [`Error::DependenciesAlreadyPresent`] if nothing would change
    pub async fn add_dependencies(&self, id: &IssueId, deps: &[IssueId]) -> Result<Issue> {
        let issues = self.load_issues().await?;
        let issue = open_issue(&issues, id)?;

        if let Some(missing) = deps.iter().find(|d| !issues.contains_key(*d)) {
            return Err(Error::DependencyNotFound(missing.clone()));
        }

        let requested: BTreeSet<&IssueId> = deps.iter().collect();
        let added: Vec<&IssueId> = requested
            .iter()
            .copied()
            .filter(|d| !issue.depends_on.contains(*d))
            .collect();
        if added.is_empty() {
            return Err(Error::DependenciesAlreadyPresent {
                id: id.clone(),
                deps: requested.into_iter().cloned().collect(),
            });
        }

        let reason = format!("Added dependencies: {}", join(&added));
        let all: BTreeSet<IssueId> = issue
            .depends_on
            .iter()
            .cloned()
            .chain(added.into_iter().cloned())
            .collect();
        self.commit_dependencies(issues, id, all, reason).await
    }

    /// Remove dependencies from an open issue.
    ///
    /// # Errors
    ///
    /// - [`Error::IssueNotFound`] if the issue does not exist
    /// - [`Error::IssueClosed`] if the issue is closed
    /// - [`Error::DependenciesNotPresent`] if none of `deps` is a dependency
    pub async fn remove_dependencies(&self, id: &IssueId, deps: &[IssueId]) -> Result<Issue> {
        let issues = self.load_issues().await?;
        let issue = open_issue(&issues, id)?;

        let requested: BTreeSet<&IssueId> = deps.iter().collect();
        let removed: Vec<&IssueId> = requested
            .iter()
            .copied()
            .filter(|d| issue.depends_on.contains(*d))
            .collect();
        if removed.is_empty() {
            return Err(Error::DependenciesNotPresent {
                id: id.clone(),
                deps: requested.into_iter().cloned().collect(),
            });
        }

        let reason = format!("Removed dependencies: {}", join(&removed));
        let remaining: BTreeSet<IssueId> = issue
            .depends_on
            .iter()
            .filter(|d| !requested.contains(d))
            .cloned()
            .collect();
        self.commit_dependencies(issues, id, remaining, reason).await
    }

    async fn commit_dependencies(
        &self,
        issues: IssueMap,
        id: &IssueId,
        deps: BTreeSet<IssueId>,
        reason: String,
    ) -> Result<Issue> {
        let update = Updated {
            depends_on: Some(deps.into_iter().collect()),
            reason: Some(reason),
            ..Updated::default()
        };
        let event = Event::new(self.now(), id.clone(), EventPayload::Updated(update));
        self.commit(issues, event).await
    }

    /// Record a session with the next ID in this writer's namespace.
    ///
    /// The session is dated today (by the app's clock) and owned by the
    /// namespace. Repeated entries in `issues_worked` are dropped.
    pub async fn create_session(&self, new: NewSession) -> Result<Session> {
        let sessions = self.load_sessions().await?;
        let id = next_session_id(sessions.ids(), &self.namespace)?;

        let mut seen = BTreeSet::new();
        let issues_worked = new
            .issues_worked
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let session = Session {
            id,
            user: Some(self.namespace.clone()),
            date: self.clock.now().format(SESSION_DATE_FORMAT).to_string(),
            topic: new.topic,
            learnings: new.learnings,
            open_questions: new.open_questions,
            next_actions: new.next_actions,
            issues_worked,
        };

        self.store.append_session(&self.namespace, &session).await?;
        info!(id = %session.id, "Recorded session");
        Ok(session)
    }
}

fn open_issue<'a>(issues: &'a IssueMap, id: &IssueId) -> Result<&'a Issue> {
    let issue = issues
        .get(id)
        .ok_or_else(|| Error::IssueNotFound(id.clone()))?;
    if issue.is_open() {
        Ok(issue)
    } else {
        Err(Error::IssueClosed(id.clone()))
    }
}

fn join(ids: &[&IssueId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
