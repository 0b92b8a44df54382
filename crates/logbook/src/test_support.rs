//! Fixtures shared by unit tests.

use crate::domain::{Issue, IssueId, IssueStatus, IssueType};

/// An open task titled `Issue <id>` depending on `deps`.
pub fn issue(id: &str, deps: &[&str]) -> Issue {
    Issue {
        id: IssueId::new(id),
        title: format!("Issue {id}"),
        issue_type: IssueType::Task,
        priority: 2,
        description: String::new(),
        depends_on: deps.iter().map(|d| IssueId::new(*d)).collect(),
        labels: Default::default(),
        status: IssueStatus::Open,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        notes: Vec::new(),
        updates: Vec::new(),
        closed_reason: None,
        closed_at: None,
    }
}
