//! In-memory log store.
//!
//! Mirrors the file layout: one log per namespace plus a legacy log, merged
//! in the same order [`JsonlLogStore`](super::JsonlLogStore) uses. Data is
//! lost when the store is dropped.

use super::{LogStore, merge_logs};
use crate::domain::Session;
use crate::error::Result;
use crate::event::Event;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-namespace logs for one record kind.
#[derive(Debug)]
struct Logs<T> {
    namespaced: BTreeMap<String, Vec<T>>,
    legacy: Vec<T>,
}

impl<T> Default for Logs<T> {
    fn default() -> Self {
        Self {
            namespaced: BTreeMap::new(),
            legacy: Vec::new(),
        }
    }
}

impl<T: Clone> Logs<T> {
    /// Namespace logs in name order, then the legacy log.
    fn in_discovery_order(&self) -> Vec<Vec<T>> {
        self.namespaced
            .values()
            .cloned()
            .chain(std::iter::once(self.legacy.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.namespaced.values().map(Vec::len).sum::<usize>() + self.legacy.len()
    }
}

#[derive(Debug, Default)]
struct Inner {
    events: Logs<Event>,
    sessions: Logs<Session>,
}

/// Thread-safe in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryLogStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the legacy issue log, as if written before namespacing.
    pub async fn push_legacy_event(&self, event: Event) {
        self.inner.lock().await.events.legacy.push(event);
    }

    /// Seed the legacy session log.
    pub async fn push_legacy_session(&self, session: Session) {
        self.inner.lock().await.sessions.legacy.push(session);
    }

    /// Total number of issue events held, across all logs.
    pub async fn event_count(&self) -> usize {
        self.inner.lock().await.events.len()
    }

    /// Total number of session records held, across all logs.
    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn read_events(&self) -> Result<Vec<Event>> {
        let inner = self.inner.lock().await;
        Ok(merge_logs(inner.events.in_discovery_order()))
    }

    async fn append_event(&self, namespace: &str, event: &Event) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .events
            .namespaced
            .entry(namespace.to_string())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn read_sessions(&self) -> Result<Vec<Session>> {
        let inner = self.inner.lock().await;
        Ok(merge_logs(inner.sessions.in_discovery_order()))
    }

    async fn append_session(&self, namespace: &str, session: &Session) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .sessions
            .namespaced
            .entry(namespace.to_string())
            .or_default()
            .push(session.clone());
        Ok(())
    }
}
