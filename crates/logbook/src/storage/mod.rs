//! Storage abstraction layer for logbook.
//!
//! The store is append-only. Each writer appends to its own per-namespace log
//! file, and reads merge every file of a kind into one deterministic sequence.
//! Nothing is ever rewritten or deleted.
//!
//! Two backends implement [`LogStore`]:
//!
//! - **JSONL**: [`JsonlLogStore`], the on-disk layout under a project root
//! - **In-memory**: [`InMemoryLogStore`], for tests and embedding
//!
//! # On-disk layout
//!
//! ```text
//! <root>/.issues/events.jsonl          legacy, shared issue log
//! <root>/.issues/events-<prefix>.jsonl per-namespace issue log
//! <root>/.memory/sessions.jsonl        legacy, shared session log
//! <root>/.memory/sessions-<prefix>.jsonl
//! ```
//!
//! # Merge order
//!
//! Files are concatenated in discovery order (namespace files sorted by file
//! name, then the legacy file) and the combined sequence is stable-sorted by
//! timestamp. Records with equal timestamps therefore keep file order, then
//! line order, which makes the merge deterministic for a given set of files.

use crate::domain::Session;
use crate::error::Result;
use crate::event::Event;
use async_trait::async_trait;

pub mod in_memory;
pub mod jsonl;
pub mod layout;

pub use in_memory::InMemoryLogStore;
pub use jsonl::JsonlLogStore;
pub use layout::LogKind;

/// Append-only access to the issue and session logs.
///
/// Implementations must be `Send + Sync` so an [`App`](crate::app::App) can
/// hold one as `Box<dyn LogStore>`.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Every issue event across all namespaces, in merge order.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MalformedLog`](crate::error::Error::MalformedLog)
    /// naming the file and line of the first record that cannot be decoded.
    async fn read_events(&self) -> Result<Vec<Event>>;

    /// Append one event to the log owned by `namespace`.
    async fn append_event(&self, namespace: &str, event: &Event) -> Result<()>;

    /// Every session record across all namespaces, stable-sorted by date.
    async fn read_sessions(&self) -> Result<Vec<Session>>;

    /// Append one session record to the log owned by `namespace`.
    async fn append_session(&self, namespace: &str, session: &Session) -> Result<()>;
}

/// Records that carry a merge sort key.
pub trait Timestamped {
    /// Key compared lexically when merging logs.
    fn sort_key(&self) -> &str;
}

impl Timestamped for Event {
    fn sort_key(&self) -> &str {
        &self.ts
    }
}

impl Timestamped for Session {
    fn sort_key(&self) -> &str {
        &self.date
    }
}

/// Concatenate logs in the given order and stable-sort by [`Timestamped::sort_key`].
pub fn merge_logs<T, I>(logs: I) -> Vec<T>
where
    T: Timestamped,
    I: IntoIterator<Item = Vec<T>>,
{
    let mut merged: Vec<T> = logs.into_iter().flatten().collect();
    merged.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionId;

    fn session(id: &str, date: &str) -> Session {
        Session {
            id: SessionId::new(id),
            date: date.to_string(),
            ..Session::default()
        }
    }

    #[test]
    fn merge_sorts_by_key() {
        let merged = merge_logs(vec![
            vec![session("a", "2025-01-03")],
            vec![session("b", "2025-01-01"), session("c", "2025-01-02")],
        ]);
        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn merge_keeps_file_then_line_order_on_ties() {
        let merged = merge_logs(vec![
            vec![session("first-1", "2025-01-01"), session("first-2", "2025-01-01")],
            vec![session("second-1", "2025-01-01")],
        ]);
        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["first-1", "first-2", "second-1"]);
    }
}
