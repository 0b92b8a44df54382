//! Integration tests for the logbook CLI.
//!
//! These tests verify the end-to-end behavior of the CLI commands against
//! real log files in a temporary directory.

use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

mod common;
use common::{run_logbook_as, run_logbook_in_dir, stdout_of, write_lines};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Provides a directory with three issues: tt-002 depends on tt-001,
/// tt-003 depends on tt-002.
#[fixture]
fn chain_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    for args in [
        &["issues", "create", "Design schema"][..],
        &["issues", "create", "Write migrations", "-b", "tt-001"][..],
        &["issues", "create", "Ship it", "-b", "tt-002", "-t", "feature"][..],
    ] {
        stdout_of(&run_logbook_in_dir(temp.path(), args));
    }
    temp
}

fn json_of(output: &std::process::Output) -> Value {
    serde_json::from_str(&stdout_of(output)).expect("stdout should be JSON")
}

fn ids_in(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|issue| issue["id"].as_str().unwrap().to_string())
        .collect()
}

fn line_count(path: &std::path::Path) -> usize {
    std::fs::read_to_string(path).unwrap().lines().count()
}

// ============================================================================
// Help Tests
// ============================================================================

#[rstest]
fn test_cli_help_shows_command_groups(temp_dir: TempDir) {
    let stdout = stdout_of(&run_logbook_in_dir(temp_dir.path(), &["--help"]));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("issues"), "Help should show 'issues'");
    assert!(stdout.contains("sessions"), "Help should show 'sessions'");
}

#[rstest]
fn test_cli_no_args(temp_dir: TempDir) {
    let output = run_logbook_in_dir(temp_dir.path(), &[]);
    assert!(output.status.success());
}

#[rstest]
fn test_cli_create_help(temp_dir: TempDir) {
    let stdout = stdout_of(&run_logbook_in_dir(
        temp_dir.path(),
        &["issues", "create", "--help"],
    ));
    for flag in ["--type", "--priority", "--description", "--depends-on", "--labels"] {
        assert!(stdout.contains(flag), "Create help should show {flag}");
    }
}

// ============================================================================
// Issue Command Tests
// ============================================================================

#[rstest]
fn test_cli_create_writes_own_log(temp_dir: TempDir) {
    let output = run_logbook_in_dir(temp_dir.path(), &["--json", "issues", "create", "First"]);
    assert_eq!(json_of(&output)["created"], "tt-001");

    let log = temp_dir.path().join(".issues/events-tt.jsonl");
    assert_eq!(line_count(&log), 1);
    let event: Value = serde_json::from_str(&std::fs::read_to_string(&log).unwrap()).unwrap();
    assert_eq!(event["type"], "created");
    assert_eq!(event["id"], "tt-001");
    assert_eq!(event["title"], "First");
}

#[rstest]
fn test_cli_create_text_output(temp_dir: TempDir) {
    let stdout = stdout_of(&run_logbook_in_dir(
        temp_dir.path(),
        &["issues", "create", "Text mode", "-p", "1"],
    ));
    assert!(stdout.contains("Created issue tt-001: Text mode"));
}

#[rstest]
fn test_cli_list_filters(chain_dir: TempDir) {
    let dir = chain_dir.path();
    stdout_of(&run_logbook_in_dir(dir, &["issues", "close", "tt-001", "done"]));

    let open = json_of(&run_logbook_in_dir(dir, &["--json", "issues", "list"]));
    assert_eq!(ids_in(&open), ["tt-002", "tt-003"]);

    let ready = json_of(&run_logbook_in_dir(dir, &["--json", "issues", "list", "--ready"]));
    assert_eq!(ids_in(&ready), ["tt-002"]);

    let closed = json_of(&run_logbook_in_dir(dir, &["--json", "issues", "list", "--closed"]));
    assert_eq!(ids_in(&closed), ["tt-001"]);

    let all = json_of(&run_logbook_in_dir(dir, &["--json", "issues", "list", "--all"]));
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[rstest]
fn test_cli_list_text(chain_dir: TempDir) {
    let stdout = stdout_of(&run_logbook_in_dir(chain_dir.path(), &["issues", "list"]));
    assert!(stdout.contains("Found 3 issue(s):"));
    assert!(stdout.contains("tt-001"));
    assert!(stdout.contains("Design schema"));
}

#[rstest]
fn test_cli_show_multiple(chain_dir: TempDir) {
    let shown = json_of(&run_logbook_in_dir(
        chain_dir.path(),
        &["--json", "issues", "show", "tt-001,tt-003"],
    ));
    assert_eq!(ids_in(&shown), ["tt-001", "tt-003"]);

    let single = json_of(&run_logbook_in_dir(
        chain_dir.path(),
        &["--json", "issues", "show", "tt-003"],
    ));
    assert_eq!(single["type"], "feature");
    assert_eq!(single["depends_on"][0], "tt-002");
}

#[rstest]
fn test_cli_show_unknown_issue(chain_dir: TempDir) {
    let output = run_logbook_in_dir(chain_dir.path(), &["issues", "show", "tt-404"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Issue not found: tt-404"));
}

#[rstest]
fn test_cli_create_with_missing_dependency_fails(temp_dir: TempDir) {
    let output = run_logbook_in_dir(temp_dir.path(), &["issues", "create", "x", "-b", "tt-009"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("tt-009"));
    assert!(!temp_dir.path().join(".issues/events-tt.jsonl").exists());
}

#[rstest]
fn test_cli_dependency_round_trip(chain_dir: TempDir) {
    let dir = chain_dir.path();

    let added = json_of(&run_logbook_in_dir(
        dir,
        &["--json", "issues", "add-dep", "tt-003", "tt-001, tt-002"],
    ));
    assert_eq!(added["added_deps"], serde_json::json!(["tt-001"]));

    let removed = json_of(&run_logbook_in_dir(
        dir,
        &["--json", "issues", "remove-dep", "tt-003", "tt-002"],
    ));
    assert_eq!(removed["removed_deps"], serde_json::json!(["tt-002"]));

    let issue = json_of(&run_logbook_in_dir(dir, &["--json", "issues", "show", "tt-003"]));
    assert_eq!(issue["depends_on"], serde_json::json!(["tt-001"]));

    let output = run_logbook_in_dir(dir, &["issues", "add-dep", "tt-003", "tt-001"]);
    assert_eq!(output.status.code(), Some(1));
}

#[rstest]
fn test_cli_closed_issue_rejects_dependency_change(chain_dir: TempDir) {
    let dir = chain_dir.path();
    stdout_of(&run_logbook_in_dir(dir, &["issues", "close", "tt-003", "dropped"]));
    let log = dir.join(".issues/events-tt.jsonl");
    let before = line_count(&log);

    let output = run_logbook_in_dir(dir, &["--json", "issues", "add-dep", "tt-003", "tt-001"]);
    assert_eq!(output.status.code(), Some(1));
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(err["error"].as_str().unwrap().contains("closed"));
    assert_eq!(line_count(&log), before);
}

#[rstest]
fn test_cli_note_and_close(chain_dir: TempDir) {
    let dir = chain_dir.path();
    stdout_of(&run_logbook_in_dir(dir, &["issues", "note", "tt-001", "Started on it"]));
    stdout_of(&run_logbook_in_dir(dir, &["issues", "close", "tt-001", "Merged"]));

    let issue = json_of(&run_logbook_in_dir(dir, &["--json", "issues", "show", "tt-001"]));
    assert_eq!(issue["status"], "closed");
    assert_eq!(issue["closed_reason"], "Merged");
    assert_eq!(issue["notes"][0]["content"], "Started on it");

    let again = run_logbook_in_dir(dir, &["issues", "close", "tt-001", "twice"]);
    assert_eq!(again.status.code(), Some(1));
}

#[rstest]
fn test_cli_diagram_formats(chain_dir: TempDir) {
    let mermaid = stdout_of(&run_logbook_in_dir(chain_dir.path(), &["issues", "diagram"]));
    assert!(mermaid.starts_with("flowchart LR\n"));
    assert!(mermaid.contains("    tt-001 --> tt-002"));

    let ascii = stdout_of(&run_logbook_in_dir(
        chain_dir.path(),
        &["issues", "diagram", "--format", "ascii"],
    ));
    assert!(ascii.contains("Root issues (no dependencies):"));
    assert!(ascii.contains("Depth 2:"));
    assert!(ascii.contains("(BLOCKED) tt-003: Ship it"));
}

// ============================================================================
// Multi-Writer Tests
// ============================================================================

#[rstest]
fn test_cli_writers_use_separate_logs(temp_dir: TempDir) {
    let dir = temp_dir.path();
    stdout_of(&run_logbook_as(dir, "ab", &["issues", "create", "From ab"]));
    stdout_of(&run_logbook_as(dir, "jb", &["issues", "create", "From jb"]));
    stdout_of(&run_logbook_as(dir, "ab", &["issues", "create", "ab again"]));

    assert_eq!(line_count(&dir.join(".issues/events-ab.jsonl")), 2);
    assert_eq!(line_count(&dir.join(".issues/events-jb.jsonl")), 1);

    let all = json_of(&run_logbook_as(dir, "jb", &["--json", "issues", "list", "--all"]));
    assert_eq!(ids_in(&all), ["ab-001", "ab-002", "jb-001"]);
}

#[rstest]
fn test_cli_reads_legacy_log(temp_dir: TempDir) {
    let dir = temp_dir.path();
    write_lines(
        &dir.join(".issues/events.jsonl"),
        &[r#"{"ts":"2024-06-01T00:00:00Z","type":"created","id":"001","title":"Old","priority":3}"#],
    );
    stdout_of(&run_logbook_in_dir(dir, &["issues", "create", "New", "-b", "001"]));

    let all = json_of(&run_logbook_in_dir(dir, &["--json", "issues", "list", "--all"]));
    assert_eq!(ids_in(&all), ["001", "tt-001"]);
}

#[rstest]
fn test_cli_malformed_log_fails_fast(temp_dir: TempDir) {
    let dir = temp_dir.path();
    write_lines(
        &dir.join(".issues/events-zz.jsonl"),
        &[
            r#"{"ts":"2025-01-01T00:00:00Z","type":"created","id":"zz-001","title":"ok"}"#,
            r#"{"ts":"2025-01-02T00:00:00Z","type":"#,
        ],
    );

    let output = run_logbook_in_dir(dir, &["issues", "list"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("events-zz.jsonl"));
    assert!(stderr.contains("line 2"));
}

#[rstest]
fn test_cli_invalid_prefix_is_config_error(temp_dir: TempDir) {
    let output = run_logbook_as(temp_dir.path(), "toolong", &["issues", "list"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid prefix"));
}

// ============================================================================
// Session Command Tests
// ============================================================================

#[rstest]
fn test_cli_sessions_empty(temp_dir: TempDir) {
    let shown = json_of(&run_logbook_in_dir(temp_dir.path(), &["sessions", "show"]));
    assert_eq!(shown, serde_json::json!([]));

    let timeline = stdout_of(&run_logbook_in_dir(temp_dir.path(), &["sessions", "timeline"]));
    assert_eq!(timeline.trim(), "No sessions recorded yet.");
}

#[rstest]
fn test_cli_session_create_and_query(temp_dir: TempDir) {
    let dir = temp_dir.path();
    let created = json_of(&run_logbook_in_dir(
        dir,
        &[
            "sessions", "create", "Auth work", "-l", "Tokens expire", "-q", "Refresh?", "-a",
            "Add refresh", "-i", "tt-001,tt-001",
        ],
    ));
    assert_eq!(created["id"], "tt-s001");
    assert_eq!(created["user"], "tt");
    assert_eq!(created["issues_worked"], serde_json::json!(["tt-001"]));

    stdout_of(&run_logbook_as(dir, "zz", &["sessions", "create", "Docs"]));

    // Same date: namespace files merge in name order, so zz's record is last.
    let latest = json_of(&run_logbook_in_dir(dir, &["sessions", "show"]));
    assert_eq!(latest["topic"], "Docs");

    let by_topic = json_of(&run_logbook_in_dir(dir, &["sessions", "show", "--topic", "auth"]));
    assert_eq!(by_topic.as_array().unwrap().len(), 1);

    let by_user = json_of(&run_logbook_in_dir(dir, &["sessions", "show", "--user", "zz"]));
    assert_eq!(by_user[0]["id"], "zz-s001");

    let questions = json_of(&run_logbook_in_dir(dir, &["sessions", "open-questions"]));
    assert_eq!(questions, serde_json::json!(["Refresh?"]));

    let actions = json_of(&run_logbook_in_dir(dir, &["sessions", "next-actions"]));
    assert_eq!(actions[0]["action"], "Add refresh");
    assert_eq!(actions[0]["session"], "tt-s001");

    let summary = stdout_of(&run_logbook_in_dir(dir, &["sessions", "summary"]));
    assert!(summary.contains("- **Sessions:** 2"));
    assert!(summary.contains("- **Auth work:** Tokens expire"));
}
