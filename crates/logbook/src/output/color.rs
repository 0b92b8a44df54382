//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Closed: green  (closed issues, completed actions)
//!   - Warning:        yellow (P1 priority, warnings)
//!   - Error/Blocked:  red    (blocked issues, P0 priority, bugs)
//!   - Info/Reference: cyan   (issue and session IDs)
//!   - Accent:         magenta (labels)
//!   - Muted:          dimmed (field labels, dates)
//!   - Emphasis:       bold   (section headers)

use crate::domain::IssueType;
use crate::graph::NodeState;
use colored::Colorize;
use std::collections::BTreeSet;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Name of a node state as shown to users.
pub(crate) fn state_name(state: NodeState) -> &'static str {
    match state {
        NodeState::Ready => "ready",
        NodeState::Blocked => "blocked",
        NodeState::Closed => "closed",
    }
}

/// Apply color to a state name.
pub(crate) fn colorize_state(state: NodeState, config: &OutputConfig) -> String {
    let text = state_name(state);
    if !config.use_colors {
        return text.to_string();
    }
    match state {
        NodeState::Ready => text.white().to_string(),
        NodeState::Blocked => text.red().to_string(),
        NodeState::Closed => text.green().to_string(),
    }
}

/// Apply color to priority text based on priority level.
pub(crate) fn colorize_priority(priority: u8, config: &OutputConfig) -> String {
    let text = format!("P{priority}");
    if !config.use_colors {
        return text;
    }
    match priority {
        0 => text.red().bold().to_string(),
        1 => text.yellow().to_string(),
        _ => text,
    }
}

/// Colorize an issue or session ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Colorize labels (magenta).
pub(crate) fn colorize_labels(labels: &BTreeSet<String>, config: &OutputConfig) -> String {
    let text = labels.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    if !config.use_colors || text.is_empty() {
        return text;
    }
    text.magenta().to_string()
}

/// Get a colored state icon, with ASCII fallback support.
pub(crate) fn colored_state_icon(state: NodeState, config: &OutputConfig) -> String {
    let icon = match (config.use_ascii, state) {
        (true, NodeState::Ready) => "o",
        (true, NodeState::Blocked) => "x",
        (true, NodeState::Closed) => "+",
        (false, NodeState::Ready) => "○",
        (false, NodeState::Blocked) => "✗",
        (false, NodeState::Closed) => "✓",
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match state {
        NodeState::Ready => icon.white().to_string(),
        NodeState::Blocked => icon.red().to_string(),
        NodeState::Closed => icon.green().to_string(),
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Apply cyan color to text (for arrows/connectors).
pub(crate) fn cyan(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Get a type icon for issue types, with ASCII fallback support.
pub(crate) fn type_icon(issue_type: IssueType, config: &OutputConfig) -> &'static str {
    if config.use_ascii {
        match issue_type {
            IssueType::Task => "-",
            IssueType::Bug => "*",
            IssueType::Feature => "+",
        }
    } else {
        match issue_type {
            IssueType::Task => "◇",
            IssueType::Bug => "●",
            IssueType::Feature => "★",
        }
    }
}

/// Get a colored type icon for issue types.
pub(crate) fn colored_type_icon(issue_type: IssueType, config: &OutputConfig) -> String {
    let icon = type_icon(issue_type, config);
    if !config.use_colors {
        return icon.to_string();
    }
    match issue_type {
        IssueType::Bug => icon.red().to_string(),
        IssueType::Feature => icon.green().to_string(),
        IssueType::Task => icon.blue().to_string(),
    }
}
