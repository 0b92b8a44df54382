//! Read-only queries over reconstructed issues and sessions.
//!
//! Issue listings come back in ID order because [`IssueMap`] is ordered.
//! Session listings keep merge order (oldest date first) unless stated.

use crate::domain::{Issue, IssueId, Session};
use crate::graph;
use crate::reconstruct::IssueMap;
use serde::Serialize;
use std::collections::HashSet;

/// Which issues a listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IssueFilter {
    /// Open issues
    #[default]
    Open,

    /// Closed issues
    Closed,

    /// Open issues with no open dependency
    Ready,

    /// Every issue
    All,
}

/// Open issues, in ID order.
#[must_use]
pub fn filter_open(issues: &IssueMap) -> Vec<&Issue> {
    issues.values().filter(|i| i.is_open()).collect()
}

/// Closed issues, in ID order.
#[must_use]
pub fn filter_closed(issues: &IssueMap) -> Vec<&Issue> {
    issues.values().filter(|i| !i.is_open()).collect()
}

/// Ready issues, in ID order.
#[must_use]
pub fn filter_ready(issues: &IssueMap) -> Vec<&Issue> {
    graph::ready_issues(issues)
}

/// Apply `filter` to `issues`.
#[must_use]
pub fn list_issues(issues: &IssueMap, filter: IssueFilter) -> Vec<&Issue> {
    match filter {
        IssueFilter::Open => filter_open(issues),
        IssueFilter::Closed => filter_closed(issues),
        IssueFilter::Ready => filter_ready(issues),
        IssueFilter::All => issues.values().collect(),
    }
}

/// The open dependencies of `id`, or `None` if no such issue exists.
#[must_use]
pub fn blockers_of<'a>(issues: &'a IssueMap, id: &IssueId) -> Option<Vec<&'a Issue>> {
    let issue = issues.get(id)?;
    Some(
        graph::open_blockers(issue, issues)
            .into_iter()
            .filter_map(|dep| issues.get(dep))
            .collect(),
    )
}

/// The last `n` sessions, oldest first.
#[must_use]
pub fn last_sessions(sessions: &[Session], n: usize) -> &[Session] {
    &sessions[sessions.len().saturating_sub(n)..]
}

/// Sessions that list `issue` among the issues worked.
#[must_use]
pub fn sessions_for_issue<'a>(sessions: &'a [Session], issue: &IssueId) -> Vec<&'a Session> {
    sessions
        .iter()
        .filter(|s| s.issues_worked.contains(issue))
        .collect()
}

/// Sessions whose topic contains `keyword`, ignoring case.
#[must_use]
pub fn sessions_by_topic<'a>(sessions: &'a [Session], keyword: &str) -> Vec<&'a Session> {
    let keyword = keyword.to_lowercase();
    sessions
        .iter()
        .filter(|s| s.topic.to_lowercase().contains(&keyword))
        .collect()
}

/// Sessions owned by `user`. See [`Session::owner`].
#[must_use]
pub fn sessions_by_user<'a>(sessions: &'a [Session], user: &str) -> Vec<&'a Session> {
    sessions
        .iter()
        .filter(|s| s.owner() == Some(user))
        .collect()
}

/// Every open question, de-duplicated in first-seen order.
#[must_use]
pub fn open_questions(sessions: &[Session]) -> Vec<&str> {
    let mut seen = HashSet::new();
    sessions
        .iter()
        .flat_map(|s| &s.open_questions)
        .map(String::as_str)
        .filter(|q| seen.insert(*q))
        .collect()
}

/// A next action tagged with the session that recorded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAction<'a> {
    /// Session ID
    pub session: &'a str,

    /// Session date
    pub date: &'a str,

    /// The action
    pub action: &'a str,
}

/// Every next action, most recent session first.
#[must_use]
pub fn next_actions(sessions: &[Session]) -> Vec<NextAction<'_>> {
    sessions
        .iter()
        .rev()
        .flat_map(|s| {
            s.next_actions.iter().map(|action| NextAction {
                session: s.id.as_str(),
                date: &s.date,
                action,
            })
        })
        .collect()
}
