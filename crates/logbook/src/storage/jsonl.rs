//! File-backed log store.
//!
//! Reads discover every log file of a kind and decode each one fully before
//! merging; the first undecodable line aborts the read with its file and
//! line number. Appends go through [`logbook_jsonl::append_jsonl`], which
//! repairs a missing trailing newline left by an interrupted writer.

use super::layout::{LogKind, discover};
use super::{LogStore, Timestamped, merge_logs};
use crate::domain::Session;
use crate::error::{Error, Result};
use crate::event::Event;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Log store rooted at a project directory.
#[derive(Debug, Clone)]
pub struct JsonlLogStore {
    root: PathBuf,
}

impl JsonlLogStore {
    /// Store rooted at `root`. Nothing is touched until the first read or append.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_kind<T>(&self, kind: LogKind) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Timestamped,
    {
        let files = discover(&self.root, kind).await?;
        let mut logs = Vec::with_capacity(files.len());
        for path in files {
            logs.push(read_log_file(&path).await?);
        }
        Ok(merge_logs(logs))
    }

    async fn append<T: Serialize + Sync>(&self, kind: LogKind, namespace: &str, record: &T) -> Result<()> {
        let path = kind.namespace_file(&self.root, namespace);
        debug!("Appending to {}", path.display());
        logbook_jsonl::append_jsonl(&path, record)
            .await
            .map_err(|e| Error::from_jsonl(e, path))
    }
}

/// Decode one log file. A file that does not exist is an empty log.
pub async fn read_log_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match logbook_jsonl::read_jsonl(path).await {
        Ok(records) => {
            debug!("Read {} records from {}", records.len(), path.display());
            Ok(records)
        }
        Err(logbook_jsonl::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::from_jsonl(e, path.to_path_buf())),
    }
}

#[async_trait]
impl LogStore for JsonlLogStore {
    async fn read_events(&self) -> Result<Vec<Event>> {
        self.read_kind(LogKind::Issues).await
    }

    async fn append_event(&self, namespace: &str, event: &Event) -> Result<()> {
        self.append(LogKind::Issues, namespace, event).await
    }

    async fn read_sessions(&self) -> Result<Vec<Session>> {
        self.read_kind(LogKind::Sessions).await
    }

    async fn append_session(&self, namespace: &str, session: &Session) -> Result<()> {
        self.append(LogKind::Sessions, namespace, session).await
    }
}
