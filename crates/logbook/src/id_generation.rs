//! Sequential, namespace-scoped ID allocation.
//!
//! Each writer owns a short prefix (2-4 lowercase alphanumerics) and numbers
//! its own issues and sessions independently: `dp-001`, `dp-002`, ... and
//! `dp-s001`, `dp-s002`, .... Writers never contend for a sequence because
//! the next number depends only on IDs carrying the same prefix.
//!
//! Legacy IDs written before namespacing (`001`, `s001`) are recognized but
//! belong to no namespace, so they never influence allocation.
//!
//! # Example
//!
//! ```
//! use logbook::id_generation::{parse_issue_id, ParsedId};
//!
//! assert_eq!(
//!     parse_issue_id("dp-007"),
//!     ParsedId::Namespaced { prefix: "dp", number: 7 }
//! );
//! assert_eq!(parse_issue_id("007"), ParsedId::Legacy { number: 7 });
//! ```

use crate::domain::{IssueId, SessionId};
use crate::error::{Error, Result};

/// Shortest accepted prefix.
pub const MIN_PREFIX_LEN: usize = 2;

/// Longest accepted prefix.
pub const MAX_PREFIX_LEN: usize = 4;

/// Result of parsing an issue or session ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedId<'a> {
    /// `<prefix>-<n>` (or `<prefix>-s<n>` for sessions)
    Namespaced {
        /// Owning namespace
        prefix: &'a str,
        /// Sequence number
        number: u64,
    },

    /// Pre-namespace ID (`<n>`, or `s<n>` for sessions)
    Legacy {
        /// Sequence number
        number: u64,
    },

    /// Anything else
    Unrecognized,
}

fn is_prefix(s: &str) -> bool {
    (MIN_PREFIX_LEN..=MAX_PREFIX_LEN).contains(&s.len())
        && s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn parse_number(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse an issue ID of the form `<prefix>-<digits>` or legacy `<digits>`.
#[must_use]
pub fn parse_issue_id(id: &str) -> ParsedId<'_> {
    if let Some(number) = parse_number(id) {
        return ParsedId::Legacy { number };
    }
    match id.split_once('-') {
        Some((prefix, rest)) if is_prefix(prefix) => parse_number(rest)
            .map_or(ParsedId::Unrecognized, |number| ParsedId::Namespaced {
                prefix,
                number,
            }),
        _ => ParsedId::Unrecognized,
    }
}

/// Parse a session ID of the form `<prefix>-s<digits>` or legacy `s<digits>`.
#[must_use]
pub fn parse_session_id(id: &str) -> ParsedId<'_> {
    if let Some(number) = id.strip_prefix('s').and_then(parse_number) {
        return ParsedId::Legacy { number };
    }
    match id.split_once('-') {
        Some((prefix, rest)) if is_prefix(prefix) => rest
            .strip_prefix('s')
            .and_then(parse_number)
            .map_or(ParsedId::Unrecognized, |number| ParsedId::Namespaced {
                prefix,
                number,
            }),
        _ => ParsedId::Unrecognized,
    }
}

/// Highest sequence number among `ids` that belong to `prefix`, plus one.
/// Fails when that maximum is already `u64::MAX`.
fn next_number<'a, I, F>(ids: I, prefix: &str, parse: F) -> Result<u64>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&'a str) -> ParsedId<'a>,
{
    ids.into_iter()
        .filter_map(|id| match parse(id) {
            ParsedId::Namespaced { prefix: p, number } if p == prefix => Some(number),
            _ => None,
        })
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| Error::NamespaceExhausted(prefix.to_string()))
}

/// Next issue ID for `prefix`, given every issue ID currently known.
///
/// Numbers are zero-padded to three digits and grow past 999 naturally.
/// Gaps are never reused: the result is always one past the maximum.
///
/// # Errors
///
/// Returns [`Error::NamespaceExhausted`] if the namespace already holds
/// sequence number `u64::MAX`.
pub fn next_issue_id<'a, I>(existing: I, prefix: &str) -> Result<IssueId>
where
    I: IntoIterator<Item = &'a IssueId>,
{
    let n = next_number(existing.into_iter().map(IssueId::as_str), prefix, parse_issue_id)?;
    Ok(IssueId(format!("{prefix}-{n:03}")))
}

/// Next session ID for `prefix`, given every session ID currently known.
///
/// # Errors
///
/// Same as [`next_issue_id`].
pub fn next_session_id<'a, I>(existing: I, prefix: &str) -> Result<SessionId>
where
    I: IntoIterator<Item = &'a SessionId>,
{
    let n = next_number(
        existing.into_iter().map(SessionId::as_str),
        prefix,
        parse_session_id,
    )?;
    Ok(SessionId(format!("{prefix}-s{n:03}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dp-001", ParsedId::Namespaced { prefix: "dp", number: 1 })]
    #[case("ab12-042", ParsedId::Namespaced { prefix: "ab12", number: 42 })]
    #[case("dp-1000", ParsedId::Namespaced { prefix: "dp", number: 1000 })]
    #[case("017", ParsedId::Legacy { number: 17 })]
    #[case("d-001", ParsedId::Unrecognized)]
    #[case("abcde-001", ParsedId::Unrecognized)]
    #[case("DP-001", ParsedId::Unrecognized)]
    #[case("dp-s001", ParsedId::Unrecognized)]
    #[case("dp-", ParsedId::Unrecognized)]
    #[case("", ParsedId::Unrecognized)]
    fn issue_ids(#[case] input: &str, #[case] expected: ParsedId<'static>) {
        assert_eq!(parse_issue_id(input), expected);
    }

    #[rstest]
    #[case("dp-s001", ParsedId::Namespaced { prefix: "dp", number: 1 })]
    #[case("s004", ParsedId::Legacy { number: 4 })]
    #[case("dp-001", ParsedId::Unrecognized)]
    #[case("s", ParsedId::Unrecognized)]
    #[case("x-s001", ParsedId::Unrecognized)]
    fn session_ids(#[case] input: &str, #[case] expected: ParsedId<'static>) {
        assert_eq!(parse_session_id(input), expected);
    }

    fn issue_ids_of(ids: &[&str]) -> Vec<IssueId> {
        ids.iter().map(|s| IssueId::new(*s)).collect()
    }

    #[test]
    fn first_issue_in_empty_namespace() {
        assert_eq!(
            next_issue_id(&Vec::<IssueId>::new(), "dp").unwrap(),
            IssueId::new("dp-001")
        );
    }

    #[test]
    fn next_issue_ignores_other_namespaces_and_legacy() {
        let ids = issue_ids_of(&["dp-001", "dp-002", "jb-001", "017"]);
        assert_eq!(next_issue_id(&ids, "dp").unwrap(), IssueId::new("dp-003"));
        assert_eq!(next_issue_id(&ids, "jb").unwrap(), IssueId::new("jb-002"));
        assert_eq!(next_issue_id(&ids, "zz").unwrap(), IssueId::new("zz-001"));
    }

    #[test]
    fn gaps_are_not_filled() {
        let ids = issue_ids_of(&["dp-001", "dp-007"]);
        assert_eq!(next_issue_id(&ids, "dp").unwrap(), IssueId::new("dp-008"));
    }

    #[test]
    fn numbering_grows_past_three_digits() {
        let ids = issue_ids_of(&["dp-999"]);
        assert_eq!(next_issue_id(&ids, "dp").unwrap(), IssueId::new("dp-1000"));
    }

    #[test]
    fn next_session_uses_s_marker() {
        let ids: Vec<SessionId> = ["dp-s001", "s009", "jb-s004"]
            .iter()
            .map(|s| SessionId::new(*s))
            .collect();
        assert_eq!(next_session_id(&ids, "dp").unwrap(), SessionId::new("dp-s002"));
        assert_eq!(next_session_id(&ids, "jb").unwrap(), SessionId::new("jb-s005"));
    }

    #[test]
    fn largest_number_accepted_is_one_below_max() {
        let near_max = format!("dp-{}", u64::MAX - 1);
        let ids = issue_ids_of(&[near_max.as_str()]);
        assert_eq!(
            next_issue_id(&ids, "dp").unwrap(),
            IssueId(format!("dp-{}", u64::MAX))
        );
    }

    #[test]
    fn exhausted_namespace_is_an_error() {
        let max = format!("dp-{}", u64::MAX);
        let ids = issue_ids_of(&[max.as_str(), "jb-001"]);
        let err = next_issue_id(&ids, "dp").unwrap_err();
        assert!(matches!(err, Error::NamespaceExhausted(ref p) if p == "dp"));
        assert_eq!(next_issue_id(&ids, "jb").unwrap(), IssueId::new("jb-002"));

        let sessions = vec![SessionId(format!("dp-s{}", u64::MAX))];
        assert!(next_session_id(&sessions, "dp").is_err());
    }
}
