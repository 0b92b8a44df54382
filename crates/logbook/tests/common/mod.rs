//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use logbook::event::{Closed, Created, Event, EventPayload};
use logbook::domain::{IssueId, IssueType};
use std::path::Path;
use std::process::{Command, Output};

/// Run the logbook binary in `dir`, writing as `prefix`.
///
/// Colors are disabled and git is pointed away from user configuration so
/// output does not depend on the machine running the tests.
pub fn run_logbook_as(dir: &Path, prefix: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logbook"))
        .args(args)
        .current_dir(dir)
        .env("LOGBOOK_PREFIX", prefix)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("Failed to execute logbook binary")
}

/// Run the logbook binary in `dir` as the `tt` writer.
pub fn run_logbook_in_dir(dir: &Path, args: &[&str]) -> Output {
    run_logbook_as(dir, "tt", args)
}

/// Stdout of a successful run, panicking with stderr otherwise.
pub fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// A `created` event with default fields.
pub fn created(ts: &str, id: &str, title: &str, deps: &[&str]) -> Event {
    Event::new(
        ts,
        IssueId::new(id),
        EventPayload::Created(Created {
            title: title.to_string(),
            issue_type: IssueType::Task,
            priority: 2,
            description: String::new(),
            depends_on: deps.iter().map(|d| IssueId::new(*d)).collect(),
            labels: Vec::new(),
        }),
    )
}

/// A `closed` event.
pub fn closed(ts: &str, id: &str, reason: &str) -> Event {
    Event::new(
        ts,
        IssueId::new(id),
        EventPayload::Closed(Closed {
            reason: reason.to_string(),
        }),
    )
}

/// Write raw JSONL lines to `path`, creating parent directories.
pub fn write_lines(path: &Path, lines: &[&str]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content).unwrap();
}
