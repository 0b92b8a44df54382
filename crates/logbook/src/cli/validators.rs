//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::IssueId;
use crate::id_generation::{ParsedId, parse_issue_id};

/// A comma-separated list of issue IDs, as given to `add-dep`, `-b` or `-i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdList(pub Vec<IssueId>);

impl IdList {
    /// The IDs, in the order given.
    pub fn ids(&self) -> &[IssueId] {
        &self.0
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate issue ID format.
///
/// Accepts namespaced IDs (`dp-001`) and legacy numeric IDs (`001`).
pub fn validate_issue_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Issue ID cannot be empty".to_string());
    }

    match parse_issue_id(s) {
        ParsedId::Namespaced { .. } | ParsedId::Legacy { .. } => Ok(s.to_string()),
        ParsedId::Unrecognized => Err(format!(
            "Invalid issue ID format: '{s}'. Expected format: prefix-NNN (e.g., dp-001) or NNN"
        )),
    }
}

/// Parse a comma-separated list of issue IDs.
///
/// Entries are trimmed and empty entries dropped. At least one ID must remain.
pub fn parse_id_list(s: &str) -> Result<IdList, String> {
    let ids = split_list(s)
        .iter()
        .map(|part| validate_issue_id(part).map(IssueId::new))
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err("No issue IDs provided".to_string());
    }
    Ok(IdList(ids))
}

fn control_char_position(s: &str, allow_newlines: bool) -> Option<usize> {
    s.chars().position(|c| {
        let code = c as u32;
        let allowed = c == '\t' || (allow_newlines && (c == '\n' || c == '\r'));
        !allowed && (code < 0x20 || (0x7F..=0x9F).contains(&code))
    })
}

/// Validate an issue title: non-blank, single line, no control characters.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    if s.contains('\n') || s.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }

    if let Some(pos) = control_char_position(s, false) {
        return Err(format!("Title contains invalid control character at position {pos}"));
    }

    Ok(s.to_string())
}

/// Validate free text (descriptions, notes, reasons, session entries).
///
/// Allows newlines but rejects other control characters.
pub fn validate_text(s: &str) -> Result<String, String> {
    match control_char_position(s, true) {
        Some(pos) => Err(format!("Text contains invalid control character at position {pos}")),
        None => Ok(s.to_string()),
    }
}
