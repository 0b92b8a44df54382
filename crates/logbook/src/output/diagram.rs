//! Dependency diagram rendering.
//!
//! Two textual formats over a [`DependencyGraph`]:
//!
//! - **Mermaid**: a `flowchart LR` definition for Markdown renderers
//! - **ASCII**: issues grouped by dependency depth, for terminals
//!
//! Both are pure functions of the graph, so the same issues always render
//! to the same text.

use crate::domain::Issue;
use crate::graph::{DependencyGraph, NodeState};

const MERMAID_TITLE_WIDTH: usize = 30;
const ASCII_TITLE_WIDTH: usize = 40;
const HEADER_RULE_WIDTH: usize = 50;

const CLOSED_FILL: &str = "#90EE90";
const BLOCKED_FILL: &str = "#FFB6C1";
const READY_FILL: &str = "#87CEEB";

/// Diagram output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagramFormat {
    /// Mermaid flowchart
    #[default]
    Mermaid,

    /// Plain-text depth listing
    Ascii,
}

/// Render `graph` in `format`.
#[must_use]
pub fn render(graph: &DependencyGraph<'_>, format: DiagramFormat) -> String {
    match format {
        DiagramFormat::Mermaid => render_mermaid(graph),
        DiagramFormat::Ascii => render_ascii(graph),
    }
}

/// Shorten `title` to at most `max` characters, ending in `...` when cut.
fn truncate(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }
    let kept: String = title.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Replace characters that would end a quoted Mermaid label early.
fn mermaid_label(title: &str) -> String {
    truncate(title, MERMAID_TITLE_WIDTH)
        .replace('"', "'")
        .replace('[', "(")
        .replace(']', ")")
}

/// Render a Mermaid `flowchart LR`.
///
/// Closed issues are drawn as stadium nodes, open issues as boxes. Nodes
/// are filled by state: green closed, pink blocked, blue ready.
#[must_use]
pub fn render_mermaid(graph: &DependencyGraph<'_>) -> String {
    if graph.is_empty() {
        return "flowchart LR\n    empty[No issues to display]".to_string();
    }

    let mut lines = vec!["flowchart LR".to_string()];

    for issue in graph.displayed() {
        let label = format!("{}: {}", issue.id, mermaid_label(&issue.title));
        if issue.is_open() {
            lines.push(format!("    {}[\"{label}\"]", issue.id));
        } else {
            lines.push(format!("    {}([\"{label}\"])", issue.id));
        }
    }

    for (dependency, dependent) in graph.edges() {
        lines.push(format!("    {dependency} --> {dependent}"));
    }

    for issue in graph.displayed() {
        let fill = match graph.node_state(issue) {
            NodeState::Closed => CLOSED_FILL,
            NodeState::Blocked => BLOCKED_FILL,
            NodeState::Ready => READY_FILL,
        };
        lines.push(format!("    style {} fill:{fill}", issue.id));
    }

    lines.join("\n")
}

fn ascii_marker(state: NodeState) -> &'static str {
    match state {
        NodeState::Ready => "[READY]",
        NodeState::Blocked => "(BLOCKED)",
        NodeState::Closed => "{CLOSED}",
    }
}

/// `dp-001(open)`, `dp-001(closed)` or `dp-001(not shown)` for each dependency.
fn dependency_summary(graph: &DependencyGraph<'_>, issue: &Issue) -> String {
    issue
        .depends_on
        .iter()
        .map(|dep| {
            let status = if !graph.contains(dep) {
                "not shown"
            } else if graph.issues().get(dep).is_some_and(Issue::is_open) {
                "open"
            } else {
                "closed"
            };
            format!("{dep}({status})")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the depth listing.
///
/// Depth 0 holds issues with no displayed dependency. Issues that could not
/// be leveled because of a dependency cycle are listed together under the
/// final depth, marked as a cycle.
#[must_use]
pub fn render_ascii(graph: &DependencyGraph<'_>) -> String {
    if graph.is_empty() {
        return "No issues to display".to_string();
    }

    let mut lines = vec![
        "Issue Dependency Diagram".to_string(),
        "=".repeat(HEADER_RULE_WIDTH),
        String::new(),
        "Legend: [READY] (BLOCKED) {CLOSED}".to_string(),
        String::new(),
    ];

    let levels = graph.levels();
    let cycle_depth = levels.unresolved_depth();

    for (&depth, ids) in &levels.buckets {
        if depth == 0 {
            lines.push("Root issues (no dependencies):".to_string());
        } else if Some(depth) == cycle_depth {
            lines.push(format!("Depth {depth} (dependency cycle):"));
        } else {
            lines.push(format!("Depth {depth}:"));
        }

        for id in ids {
            let Some(issue) = graph.issues().get(id) else {
                continue;
            };
            lines.push(format!(
                "  {} {}: {}",
                ascii_marker(graph.node_state(issue)),
                issue.id,
                truncate(&issue.title, ASCII_TITLE_WIDTH)
            ));
            if !issue.depends_on.is_empty() {
                lines.push(format!(
                    "           └── depends on: {}",
                    dependency_summary(graph, issue)
                ));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
