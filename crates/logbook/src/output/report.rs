//! Markdown reports over sessions.

use crate::domain::Session;
use crate::query;
use std::collections::{BTreeMap, BTreeSet};

/// Printed by every report when there are no sessions.
pub const NO_SESSIONS: &str = "No sessions recorded yet.";

const SUMMARY_TOPICS_PER_DATE: usize = 3;
const SUMMARY_LEARNING_SESSIONS: usize = 10;

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn by_date(sessions: &[Session]) -> BTreeMap<&str, Vec<&Session>> {
    let mut groups: BTreeMap<&str, Vec<&Session>> = BTreeMap::new();
    for session in sessions {
        let date = if session.date.is_empty() {
            "unknown"
        } else {
            session.date.as_str()
        };
        groups.entry(date).or_default().push(session);
    }
    groups
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.is_empty() { placeholder } else { text }
}

/// Sessions grouped under `### <date>` headings, newest date first.
///
/// Each line reads `- **<id>** <topic> (<counts>)`, listing only the
/// non-zero counts of learnings, questions and issues.
#[must_use]
pub fn timeline(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return NO_SESSIONS.to_string();
    }

    let mut lines = vec!["## Session Timeline".to_string(), String::new()];

    for (date, group) in by_date(sessions).into_iter().rev() {
        lines.push(format!("### {date}"));
        lines.push(String::new());

        for s in group {
            let mut stats = Vec::new();
            if !s.learnings.is_empty() {
                stats.push(plural(s.learnings.len(), "learning"));
            }
            if !s.open_questions.is_empty() {
                stats.push(plural(s.open_questions.len(), "question"));
            }
            if !s.issues_worked.is_empty() {
                stats.push(plural(s.issues_worked.len(), "issue"));
            }
            let stats = if stats.is_empty() {
                String::new()
            } else {
                format!(" ({})", stats.join(", "))
            };
            lines.push(format!(
                "- **{}** {}{stats}",
                or_placeholder(s.id.as_str(), "?"),
                or_placeholder(&s.topic, "untitled")
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Project summary: overview, compact timeline, key learnings and open questions.
#[must_use]
pub fn summary(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return NO_SESSIONS.to_string();
    }

    let mut lines = vec!["## Project Session Summary".to_string(), String::new()];

    let dates: BTreeSet<&str> = sessions
        .iter()
        .map(|s| s.date.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    let total_learnings: usize = sessions.iter().map(|s| s.learnings.len()).sum();
    let issues_touched: BTreeSet<_> = sessions.iter().flat_map(|s| &s.issues_worked).collect();

    lines.push("### Overview".to_string());
    lines.push(String::new());
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        lines.push(format!("- **Period:** {first} to {last}"));
    }
    lines.push(format!("- **Sessions:** {}", sessions.len()));
    lines.push(format!("- **Total learnings:** {total_learnings}"));
    lines.push(format!("- **Issues touched:** {}", issues_touched.len()));
    lines.push(String::new());

    lines.push("### Timeline".to_string());
    lines.push(String::new());
    for (date, group) in by_date(sessions) {
        let topics: Vec<&str> = group
            .iter()
            .map(|s| or_placeholder(&s.topic, "?"))
            .collect();
        let mut preview = topics
            .iter()
            .take(SUMMARY_TOPICS_PER_DATE)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if topics.len() > SUMMARY_TOPICS_PER_DATE {
            preview.push_str(&format!(" (+{} more)", topics.len() - SUMMARY_TOPICS_PER_DATE));
        }
        lines.push(format!(
            "- **{date}** ({}): {preview}",
            plural(topics.len(), "session")
        ));
    }
    lines.push(String::new());

    lines.push("### Key Learnings".to_string());
    lines.push(String::new());
    for s in query::last_sessions(sessions, SUMMARY_LEARNING_SESSIONS) {
        if let Some(learning) = s.learnings.first() {
            lines.push(format!("- **{}:** {learning}", or_placeholder(&s.topic, "?")));
        }
    }
    lines.push(String::new());

    let questions = query::open_questions(sessions);
    if !questions.is_empty() {
        lines.push("### Open Questions".to_string());
        lines.push(String::new());
        for q in questions {
            lines.push(format!("- {q}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IssueId, SessionId};

    fn session(id: &str, date: &str, topic: &str) -> Session {
        Session {
            id: SessionId::new(id),
            date: date.to_string(),
            topic: topic.to_string(),
            ..Session::default()
        }
    }

    #[test]
    fn empty_reports() {
        assert_eq!(timeline(&[]), NO_SESSIONS);
        assert_eq!(summary(&[]), NO_SESSIONS);
    }

    #[test]
    fn timeline_newest_date_first_with_counts() {
        let mut a = session("dp-s001", "2025-01-01", "setup");
        a.learnings = vec!["one".into()];
        let mut b = session("dp-s002", "2025-01-02", "auth");
        b.learnings = vec!["x".into(), "y".into()];
        b.issues_worked = vec![IssueId::new("dp-001")];
        let c = session("dp-s003", "2025-01-02", "");

        let expected = [
            "## Session Timeline",
            "",
            "### 2025-01-02",
            "",
            "- **dp-s002** auth (2 learnings, 1 issue)",
            "- **dp-s003** untitled",
            "",
            "### 2025-01-01",
            "",
            "- **dp-s001** setup (1 learning)",
            "",
        ]
        .join("\n");
        assert_eq!(timeline(&[a, b, c]), expected);
    }

    #[test]
    fn summary_sections() {
        let mut a = session("s001", "2025-01-01", "setup");
        a.learnings = vec!["use tokio".into(), "ignored".into()];
        a.open_questions = vec!["why?".into()];
        a.issues_worked = vec![IssueId::new("001"), IssueId::new("002")];
        let mut b = session("s002", "2025-01-03", "auth");
        b.open_questions = vec!["why?".into(), "how?".into()];
        b.issues_worked = vec![IssueId::new("002")];

        let text = summary(&[a, b]);
        assert!(text.starts_with("## Project Session Summary\n\n### Overview\n"));
        assert!(text.contains("- **Period:** 2025-01-01 to 2025-01-03"));
        assert!(text.contains("- **Sessions:** 2"));
        assert!(text.contains("- **Total learnings:** 2"));
        assert!(text.contains("- **Issues touched:** 2"));
        assert!(text.contains("- **2025-01-01** (1 session): setup"));
        assert!(text.contains("- **setup:** use tokio"));
        assert!(!text.contains("ignored"));
        assert!(text.contains("### Open Questions\n\n- why?\n- how?\n"));
    }

    #[test]
    fn summary_timeline_caps_topics() {
        let sessions: Vec<_> = (1..=5)
            .map(|n| session(&format!("s00{n}"), "2025-02-01", &format!("t{n}")))
            .collect();
        let text = summary(&sessions);
        assert!(text.contains("- **2025-02-01** (5 sessions): t1, t2, t3 (+2 more)"));
        assert!(!text.contains("### Open Questions"));
    }
}
