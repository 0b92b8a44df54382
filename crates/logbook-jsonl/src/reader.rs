//! JSONL reading operations.
//!
//! This module provides async functionality for reading JSONL files line-by-line
//! with line number tracking for error reporting. Blank lines are skipped and
//! surrounding whitespace is ignored; any other line must hold exactly one
//! JSON value. Lines are read as raw bytes, so invalid UTF-8 is reported as a
//! parse failure on that line rather than as an I/O error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for JSONL (JSON Lines) data.
///
/// `JsonlReader` wraps an async reader and provides buffered reading of JSONL
/// formatted data. It tracks line numbers so that parse failures can name the
/// offending line.
///
/// # Type Parameters
///
/// * `R` - The underlying async reader type. Must implement [`AsyncRead`] and [`Unpin`].
///
/// # Examples
///
/// ```no_run
/// use logbook_jsonl::reader::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("events.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_line::<serde_json::Value>().await? {
///     println!("{value}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// Current line number (1-based counting, 0 before any lines are read) for error reporting.
    line_number: usize,
    /// Scratch buffer reused across reads.
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    ///
    /// Line numbering uses 1-based indexing: the counter starts at 0 and increments
    /// after each line is read, so the first line read is numbered 1.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the current line number.
    ///
    /// Returns 0 before any lines have been read. After reading, returns the
    /// 1-based line number of the last line read, blank lines included.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub(crate) fn increment_line(&mut self) {
        self.line_number += 1;
    }

    /// Reads and deserializes the next non-blank line.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the line number if the line is not valid
    /// UTF-8 JSON of type `T`, or [`Error::Io`] if the underlying read fails.
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        loop {
            self.buf.clear();
            let bytes = self.reader.read_until(b'\n', &mut self.buf).await?;
            if bytes == 0 {
                return Ok(None);
            }
            self.increment_line();

            let trimmed = self.buf.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            let line_number = self.line_number;
            let text = std::str::from_utf8(trimmed).map_err(|e| Error::Parse {
                line_number,
                source: serde::de::Error::custom(e),
            })?;
            return serde_json::from_str(text)
                .map(Some)
                .map_err(|source| Error::Parse {
                    line_number,
                    source,
                });
        }
    }
}
