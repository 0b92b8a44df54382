//! Durable append for append-only JSONL logs.
//!
//! An event log is only ever extended, never rewritten. [`append_jsonl`]
//! guarantees that:
//!
//! 1. The file is opened in append mode and is never truncated.
//! 2. If the last byte of a non-empty file is not `\n` (a previous write was
//!    interrupted mid-line), a newline is written first so the new record
//!    starts on its own line.
//! 3. The record is flushed and `fsync`ed before the call returns.
//!
//! There is no cross-process locking. Concurrent appends to the same file
//! from two processes may interleave.

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

/// Appends one value as a JSONL line to the file at `path`.
///
/// Missing parent directories and the file itself are created.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, the value fails to
/// serialize, or any write or sync fails. Serialization happens before any
/// byte is written, so a value that cannot be serialized leaves the file
/// untouched.
///
/// # Examples
///
/// ```no_run
/// use logbook_jsonl::append_jsonl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// append_jsonl(".issues/events-dp.jsonl", &serde_json::json!({"id": "dp-001"})).await?;
/// # Ok(())
/// # }
/// ```
pub async fn append_jsonl<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    // Validate the record up front so a bad value never produces a partial line.
    serde_json::to_string(value)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .await?;

    let needs_newline = lacks_trailing_newline(&mut file).await?;

    let mut writer = JsonlWriter::new(file);
    if needs_newline {
        debug!(path = %path.display(), "repairing unterminated last line before append");
        writer.write_raw(b"\n").await?;
    }
    writer.write(value).await?;
    writer.flush().await?;

    let file = writer.into_inner().into_inner();
    file.sync_all().await?;

    Ok(())
}

/// Returns `true` if the file is non-empty and its last byte is not `\n`.
async fn lacks_trailing_newline(file: &mut File) -> Result<bool> {
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}
