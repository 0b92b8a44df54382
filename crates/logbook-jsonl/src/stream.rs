//! Streaming access to JSONL records.
//!
//! Adapts a [`JsonlReader`] into a [`futures::Stream`] of decoded records so
//! callers can use the usual stream combinators (`try_collect`, `try_filter`,
//! and friends). The stream ends after the first error.

use crate::reader::JsonlReader;
use crate::{Error, Result};
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;

/// Turns a reader into a stream of records of type `T`.
///
/// # Examples
///
/// ```no_run
/// use futures::TryStreamExt;
/// use logbook_jsonl::{reader::JsonlReader, stream::records};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = tokio::fs::File::open("events.jsonl").await?;
/// let values: Vec<serde_json::Value> = records(JsonlReader::new(file)).try_collect().await?;
/// # Ok(())
/// # }
/// ```
pub fn records<R, T>(reader: JsonlReader<R>) -> impl Stream<Item = Result<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    stream::try_unfold(reader, |mut reader| async move {
        let next = reader.read_line::<T>().await?;
        Ok::<_, Error>(next.map(|record| (record, reader)))
    })
}
