//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;
use serde_json::json;

use super::args::{
    CloseArgs, CreateArgs, DepArgs, DiagramArgs, ListArgs, NoteArgs, SessionCreateArgs,
    SessionShowArgs, ShowArgs,
};
use super::validators::{IdList, split_list};
use crate::app::App;
use crate::domain::{Issue, IssueId, NewIssue, NewSession};
use crate::error::Error;
use crate::graph::DisplaySet;
use crate::output::{self, OutputConfig, OutputMode, report};
use crate::query;

/// Print a write result: a small JSON object, or a colored confirmation.
fn report_write(output_mode: OutputMode, value: &serde_json::Value, text: &str) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(value)?,
        OutputMode::Text => {
            output::print_message(&output::success(text, &OutputConfig::from_env()))?;
        }
    }
    Ok(())
}

/// Suggest configuring a prefix when the current one was guessed.
fn hint_derived_prefix(app: &App) {
    if app.prefix_is_derived() {
        let config = OutputConfig::from_env();
        eprintln!(
            "{}",
            output::warning(
                &format!(
                    "Using derived prefix '{}'. Set LOGBOOK_PREFIX or run \
                     `git config logbook.prefix <prefix>` to choose one.",
                    app.namespace()
                ),
                &config
            )
        );
    }
}

fn join_ids(ids: &[IssueId]) -> String {
    ids.iter()
        .map(IssueId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Issue Commands
// ============================================================================

/// Execute `issues list`
pub async fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let issues = app.load_issues().await?;
    let listed = query::list_issues(&issues, args.filter());
    output::print_issues(&listed, &issues, output_mode)?;
    Ok(())
}

/// Execute `issues show`
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let issues = app.load_issues().await?;

    let found = args
        .ids
        .iter()
        .flat_map(IdList::ids)
        .map(|id| issues.get(id).ok_or_else(|| Error::IssueNotFound(id.clone())))
        .collect::<Result<Vec<&Issue>, _>>()?;

    match (output_mode, found.as_slice()) {
        (OutputMode::Json, [single]) => output::print_json(single)?,
        (OutputMode::Json, many) => output::print_json(many)?,
        (OutputMode::Text, _) => {
            for (i, issue) in found.iter().enumerate() {
                if i > 0 {
                    output::print_message("")?;
                }
                output::print_issue_details(issue, &issues, output_mode)?;
            }
        }
    }
    Ok(())
}

/// Execute `issues create`
pub async fn execute_create(app: &App, args: &CreateArgs, output_mode: OutputMode) -> Result<()> {
    let new = NewIssue {
        title: args.title.clone(),
        issue_type: args.issue_type.into(),
        priority: args.priority,
        description: args.description.clone(),
        depends_on: args
            .depends_on
            .as_ref()
            .map(|list| list.ids().to_vec())
            .unwrap_or_default(),
        labels: split_list(&args.labels),
    };

    let issue = app.create_issue(new).await?;
    hint_derived_prefix(app);
    report_write(
        output_mode,
        &json!({ "created": issue.id }),
        &format!("Created issue {}: {}", issue.id, issue.title),
    )
}

/// Execute `issues close`
pub async fn execute_close(app: &App, args: &CloseArgs, output_mode: OutputMode) -> Result<()> {
    let issue = app.close_issue(&IssueId::new(&args.id), &args.reason).await?;
    report_write(
        output_mode,
        &json!({ "closed": issue.id }),
        &format!("Closed issue {}", issue.id),
    )
}

/// Execute `issues note`
pub async fn execute_note(app: &App, args: &NoteArgs, output_mode: OutputMode) -> Result<()> {
    let issue = app.add_note(&IssueId::new(&args.id), &args.content).await?;
    report_write(
        output_mode,
        &json!({ "noted": issue.id }),
        &format!("Added note to {}", issue.id),
    )
}

/// Execute `issues add-dep`
pub async fn execute_add_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    let id = IssueId::new(&args.id);
    let before = app.get_issue(&id).await?.depends_on;
    let issue = app.add_dependencies(&id, args.deps.ids()).await?;
    let added: Vec<IssueId> = issue.depends_on.difference(&before).cloned().collect();

    report_write(
        output_mode,
        &json!({ "issue": issue.id, "added_deps": added }),
        &format!("{} now depends on {}", issue.id, join_ids(&added)),
    )
}

/// Execute `issues remove-dep`
pub async fn execute_remove_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    let id = IssueId::new(&args.id);
    let before = app.get_issue(&id).await?.depends_on;
    let issue = app.remove_dependencies(&id, args.deps.ids()).await?;
    let removed: Vec<IssueId> = before.difference(&issue.depends_on).cloned().collect();

    report_write(
        output_mode,
        &json!({ "issue": issue.id, "removed_deps": removed }),
        &format!("{} no longer depends on {}", issue.id, join_ids(&removed)),
    )
}

/// Execute `issues diagram`
pub async fn execute_diagram(app: &App, args: &DiagramArgs) -> Result<()> {
    let display = if args.include_closed {
        DisplaySet::All
    } else {
        DisplaySet::Open
    };
    let text = app.diagram(args.format.into(), display).await?;
    output::print_block(&text)?;
    Ok(())
}

// ============================================================================
// Session Commands
// ============================================================================

/// Execute `sessions show`
pub async fn execute_session_show(app: &App, args: &SessionShowArgs) -> Result<()> {
    let log = app.load_sessions().await?;
    let sessions = log.as_slice();

    if let Some(n) = args.last {
        output::print_json(query::last_sessions(sessions, n))?;
    } else if args.all {
        output::print_json(sessions)?;
    } else if let Some(issue) = &args.issue {
        output::print_json(&query::sessions_for_issue(sessions, &IssueId::new(issue)))?;
    } else if let Some(topic) = &args.topic {
        output::print_json(&query::sessions_by_topic(sessions, topic))?;
    } else if let Some(user) = &args.user {
        output::print_json(&query::sessions_by_user(sessions, &user.trim().to_lowercase()))?;
    } else {
        match sessions.last() {
            Some(latest) => output::print_json(latest)?,
            None => output::print_json(sessions)?,
        }
    }
    Ok(())
}

/// Execute `sessions open-questions`
pub async fn execute_open_questions(app: &App) -> Result<()> {
    let log = app.load_sessions().await?;
    output::print_json(&query::open_questions(log.as_slice()))?;
    Ok(())
}

/// Execute `sessions next-actions`
pub async fn execute_next_actions(app: &App) -> Result<()> {
    let log = app.load_sessions().await?;
    output::print_json(&query::next_actions(log.as_slice()))?;
    Ok(())
}

/// Execute `sessions timeline`
pub async fn execute_timeline(app: &App) -> Result<()> {
    let log = app.load_sessions().await?;
    output::print_block(&report::timeline(log.as_slice()))?;
    Ok(())
}

/// Execute `sessions summary`
pub async fn execute_summary(app: &App) -> Result<()> {
    let log = app.load_sessions().await?;
    output::print_block(&report::summary(log.as_slice()))?;
    Ok(())
}

/// Execute `sessions create`
pub async fn execute_session_create(app: &App, args: &SessionCreateArgs) -> Result<()> {
    let new = NewSession {
        topic: args.topic.clone(),
        learnings: args.learnings.clone(),
        open_questions: args.questions.clone(),
        next_actions: args.actions.clone(),
        issues_worked: args
            .issues
            .as_ref()
            .map(|list| list.ids().to_vec())
            .unwrap_or_default(),
    };

    let session = app.create_session(new).await?;
    hint_derived_prefix(app);
    output::print_json(&session)?;
    Ok(())
}
