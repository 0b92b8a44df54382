//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`diagram`]: Mermaid and ASCII dependency diagrams
//! - [`report`]: Markdown session reports

pub mod color;
pub mod diagram;
pub mod report;

use crate::domain::Issue;
use crate::graph::{self, NodeState};
use crate::reconstruct::IssueMap;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{
    bold, colored_state_icon, colored_type_icon, colorize_id, colorize_labels, colorize_priority,
    colorize_state, cyan, dimmed,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for output formatting.
///
/// This struct holds settings that control how output is formatted,
/// including terminal width limits, ASCII fallback mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `LOGBOOK_MAX_WIDTH`: Maximum content width (default: 100)
    /// - `LOGBOOK_ASCII`: Set to "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `LOGBOOK_COLOR`: Set to "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_width = match lookup("LOGBOOK_MAX_WIDTH") {
            Some(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "LOGBOOK_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("LOGBOOK_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "LOGBOOK_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("LOGBOOK_COLOR")
                .is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| w.0)
        .into()
}

/// Output format mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a list of issues in the specified format.
///
/// `all` is the full issue map, used to compute each issue's state.
pub fn print_issues(issues: &[&Issue], all: &IssueMap, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let width = get_terminal_width().min(config.max_width);
            write_issue_list(&mut handle, issues, all, width, &config)
        }
        OutputMode::Json => write_json(&mut handle, &issues),
    }
}

/// Print one issue with full details.
pub fn print_issue_details(issue: &Issue, all: &IssueMap, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let width = get_terminal_width().min(config.max_width);
            write_issue_details(&mut handle, issue, all, width, &config)
        }
        OutputMode::Json => write_json(&mut handle, issue),
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a multi-line text block, dropping trailing blank lines.
pub fn print_block(text: &str) -> io::Result<()> {
    print_message(text.trim_end())
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn state_of(issue: &Issue, all: &IssueMap) -> NodeState {
    if !issue.is_open() {
        NodeState::Closed
    } else if graph::is_ready(issue, all) {
        NodeState::Ready
    } else {
        NodeState::Blocked
    }
}

fn write_issue_list<W: Write>(
    w: &mut W,
    issues: &[&Issue],
    all: &IssueMap,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if issues.is_empty() {
        writeln!(w, "No issues found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} issue(s):", issues.len())?;
    writeln!(w)?;

    let id_width = issues.iter().map(|i| i.id.as_str().len()).max().unwrap_or(0);
    // icon, space, id, two spaces, type icon, two spaces, "Pn", two spaces
    let indent = 1 + 1 + id_width + 2 + 1 + 2 + 2 + 2;
    let title_width = width.saturating_sub(indent).max(20);

    for issue in issues {
        let padding = " ".repeat(id_width - issue.id.as_str().len());
        let mut title_lines = wrap_text(&issue.title, title_width).into_iter();
        writeln!(
            w,
            "{} {}{padding}  {}  {}  {}",
            colored_state_icon(state_of(issue, all), config),
            colorize_id(issue.id.as_str(), config),
            colored_type_icon(issue.issue_type, config),
            colorize_priority(issue.priority, config),
            title_lines.next().unwrap_or_default()
        )?;
        for line in title_lines {
            writeln!(w, "{}{line}", " ".repeat(indent))?;
        }
    }

    Ok(())
}

/// Print a text section with a bold title and wrapped, indented content.
fn write_text_section<W: Write>(
    w: &mut W,
    title: &str,
    content: &str,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    if content.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "{}:", bold(title, config))?;
    for line in wrap_text(content, width.saturating_sub(2)) {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

fn write_issue_details<W: Write>(
    w: &mut W,
    issue: &Issue,
    all: &IssueMap,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    let state = state_of(issue, all);

    writeln!(
        w,
        "{} {}: {}",
        colored_state_icon(state, config),
        colorize_id(issue.id.as_str(), config),
        issue.title
    )?;

    writeln!(
        w,
        "{}  {} {}    {}  {}    {}  {}",
        dimmed("Type:", config),
        colored_type_icon(issue.issue_type, config),
        issue.issue_type,
        dimmed("Status:", config),
        colorize_state(state, config),
        dimmed("Priority:", config),
        colorize_priority(issue.priority, config)
    )?;

    if !issue.labels.is_empty() {
        writeln!(
            w,
            "{} {}",
            dimmed("Labels:", config),
            colorize_labels(&issue.labels, config)
        )?;
    }

    writeln!(w, "{} {}", dimmed("Created:", config), issue.created_at)?;
    if let Some(closed_at) = &issue.closed_at {
        writeln!(
            w,
            "{} {} ({})",
            dimmed("Closed:", config),
            closed_at,
            issue.closed_reason.as_deref().unwrap_or_default()
        )?;
    }

    write_text_section(w, "Description", &issue.description, width, config)?;

    if !issue.depends_on.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "{} ({}):",
            bold("Depends on", config),
            issue.depends_on.len()
        )?;
        for dep in &issue.depends_on {
            let status = match all.get(dep) {
                Some(d) if d.is_open() => "open",
                Some(_) => "closed",
                None => "unknown",
            };
            writeln!(
                w,
                "  {} {} ({status})",
                cyan("→", config),
                colorize_id(dep.as_str(), config)
            )?;
        }
    }

    if !issue.notes.is_empty() {
        writeln!(w)?;
        writeln!(w, "{} ({}):", bold("Notes", config), issue.notes.len())?;
        for note in &issue.notes {
            writeln!(w, "  {}", dimmed(&note.ts, config))?;
            for line in wrap_text(&note.content, width.saturating_sub(4)) {
                writeln!(w, "    {line}")?;
            }
        }
    }

    let reasons: Vec<_> = issue
        .updates
        .iter()
        .filter_map(|u| u.reason.as_deref().map(|r| (u.ts.as_str(), r)))
        .collect();
    if !reasons.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}:", bold("History", config))?;
        for (ts, reason) in reasons {
            writeln!(w, "  {} {reason}", dimmed(ts, config))?;
        }
    }

    Ok(())
}

/// Wrap text to fit within a given width, preserving existing line breaks.
/// Uses textwrap to handle edge cases like long words (URLs, file paths).
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IssueId, IssueStatus, Note, UpdateRecord};
    use crate::test_support::issue;
    use std::collections::HashMap;

    fn plain() -> OutputConfig {
        OutputConfig::new(80, false, false)
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn sample() -> IssueMap {
        let mut done = issue("dp-001", &[]);
        done.status = IssueStatus::Closed;
        done.closed_at = Some("2025-01-02T00:00:00Z".into());
        done.closed_reason = Some("shipped".into());
        let mut b = issue("dp-002", &["dp-001", "dp-404"]);
        b.labels.insert("backend".into());
        b.description = "Wire the thing".into();
        b.notes.push(Note {
            ts: "2025-01-03T00:00:00Z".into(),
            content: "started".into(),
        });
        b.updates.push(UpdateRecord {
            ts: "2025-01-04T00:00:00Z".into(),
            reason: Some("Added dependencies: dp-404".into()),
            priority: None,
            labels: None,
            depends_on: None,
        });
        [done, b, issue("dp-003", &["dp-002"])]
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect()
    }

    #[test]
    fn wrap_text_respects_width() {
        let wrapped = wrap_text("This is a test of text wrapping functionality", 20);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.len() <= 20));
    }

    #[test]
    fn wrap_text_preserves_newlines() {
        assert_eq!(wrap_text("one\ntwo\n\nthree", 50).len(), 4);
    }

    #[test]
    fn output_config_from_lookup() {
        let vars: HashMap<&str, &str> = [("LOGBOOK_MAX_WIDTH", "120"), ("LOGBOOK_ASCII", "1")]
            .into_iter()
            .collect();
        let config = OutputConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.max_width, 120);
        assert!(config.use_ascii);
        assert!(config.use_colors);

        let config = OutputConfig::from_lookup(|k| match k {
            "LOGBOOK_MAX_WIDTH" => Some("wide".into()),
            "NO_COLOR" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.max_width, DEFAULT_MAX_CONTENT_WIDTH);
        assert!(!config.use_colors, "NO_COLOR should disable colors");

        let config =
            OutputConfig::from_lookup(|k| (k == "LOGBOOK_COLOR").then(|| "false".to_string()));
        assert!(!config.use_colors);

        assert_eq!(OutputConfig::from_lookup(|_| None), OutputConfig::default());
    }

    #[test]
    fn issue_list_shows_state_icons() {
        let all = sample();
        let issues: Vec<&Issue> = all.values().collect();
        let out = render(|w| write_issue_list(w, &issues, &all, 80, &plain()));
        assert!(out.starts_with("Found 3 issue(s):\n\n"));
        assert!(out.contains("✓ dp-001"));
        assert!(out.contains("○ dp-002"));
        assert!(out.contains("✗ dp-003"));
        assert!(out.contains("P2  Issue dp-002"));
    }

    #[test]
    fn issue_list_wraps_long_titles() {
        let mut long = issue("dp-001", &[]);
        long.title = "word ".repeat(30);
        let all: IssueMap = [(long.id.clone(), long)].into_iter().collect();
        let issues: Vec<&Issue> = all.values().collect();
        let out = render(|w| write_issue_list(w, &issues, &all, 60, &plain()));
        let body: Vec<_> = out.lines().skip(2).collect();
        assert!(body.len() > 1);
        assert!(body[1].starts_with("    "));
    }

    #[test]
    fn empty_list() {
        let out = render(|w| write_issue_list(w, &[], &IssueMap::new(), 80, &plain()));
        assert_eq!(out, "No issues found.\n");
    }

    #[test]
    fn details_include_dependencies_notes_and_history() {
        let all = sample();
        let issue = &all[&IssueId::new("dp-002")];
        let out = render(|w| write_issue_details(w, issue, &all, 80, &plain()));
        assert!(out.contains("dp-002: Issue dp-002"));
        assert!(out.contains("Status:  ready"));
        assert!(out.contains("Labels: backend"));
        assert!(out.contains("Description:\n  Wire the thing"));
        assert!(out.contains("→ dp-001 (closed)"));
        assert!(out.contains("→ dp-404 (unknown)"));
        assert!(out.contains("Notes (1):"));
        assert!(out.contains("    started"));
        assert!(out.contains("Added dependencies: dp-404"));
    }

    #[test]
    fn details_show_close_reason() {
        let all = sample();
        let out = render(|w| write_issue_details(w, &all[&IssueId::new("dp-001")], &all, 80, &plain()));
        assert!(out.contains("Closed: 2025-01-02T00:00:00Z (shipped)"));
    }

    #[test]
    fn json_output_is_pretty() {
        let all = sample();
        let out = render(|w| write_json(w, &all[&IssueId::new("dp-001")]));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["id"], "dp-001");
        assert_eq!(parsed["status"], "closed");
        assert!(out.contains("\n  \"id\""));
    }
}
