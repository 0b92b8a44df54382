//! Line-oriented JSONL (JSON Lines) I/O for append-only event logs.
//!
//! This library provides the file-level building blocks used by logbook:
//! a line reader that reports line numbers, a buffered writer that keeps
//! every record on one line, a stream adapter, and a durable append that
//! repairs an unterminated last line.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod append;
pub mod error;
pub mod reader;
pub mod stream;
pub mod writer;

pub use append::append_jsonl;
pub use error::{Error, Result};
pub use reader::JsonlReader;
pub use writer::JsonlWriter;

use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads every record from a JSONL file, failing fast on the first bad line.
///
/// Blank lines are skipped. The returned records are in file order.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read (including when
/// it does not exist), or [`Error::Parse`] for the first malformed line.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let values: Vec<serde_json::Value> = logbook_jsonl::read_jsonl(".issues/events.jsonl").await?;
/// # Ok(())
/// # }
/// ```
pub async fn read_jsonl<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = tokio::fs::File::open(path.as_ref()).await?;
    stream::records(JsonlReader::new(file)).try_collect().await
}
