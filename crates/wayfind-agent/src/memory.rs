//! Best-effort memory collaborator.
//!
//! Reads and writes never block the critical path: the orchestrator logs
//! failures and carries on. The trait is the DI seam; an external
//! preference store plugs in behind it, while [`InMemoryStore`] serves
//! tests and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use wayfind_core::TransportMode;

/// How many recent queries a context summary carries.
const SUMMARY_LIMIT: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct MemoryContextSummary {
    pub recent_queries: Vec<String>,
    pub preferred_transport: Option<TransportMode>,
}

#[derive(Debug, Clone)]
pub struct MemoryRecord {
    pub query: String,
    pub intent: String,
    pub summary: String,
    pub transport: Option<TransportMode>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
#[error("memory store error: {0}")]
pub struct MemoryError(pub String);

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Summarizes what is known about a user.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] on storage failure; callers log and continue.
    async fn get_context(&self, user_id: &str) -> Result<MemoryContextSummary, MemoryError>;

    /// Appends one interaction record.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] on storage failure; callers log and continue.
    async fn add_memory(&self, user_id: &str, record: MemoryRecord) -> Result<(), MemoryError>;
}

/// Store that remembers nothing and never fails.
pub struct NoopMemory;

#[async_trait]
impl MemoryStore for NoopMemory {
    async fn get_context(&self, _user_id: &str) -> Result<MemoryContextSummary, MemoryError> {
        Ok(MemoryContextSummary::default())
    }

    async fn add_memory(&self, _user_id: &str, _record: MemoryRecord) -> Result<(), MemoryError> {
        Ok(())
    }
}

/// Process-local memory store.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Vec<MemoryRecord>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn get_context(&self, user_id: &str) -> Result<MemoryContextSummary, MemoryError> {
        let entries = self.entries.lock().await;
        let records = entries.get(user_id).map(Vec::as_slice).unwrap_or_default();

        let recent_queries = records
            .iter()
            .rev()
            .take(SUMMARY_LIMIT)
            .map(|r| r.query.clone())
            .collect();

        // Most recent explicit transport wins as the preference.
        let preferred_transport = records.iter().rev().find_map(|r| r.transport);

        Ok(MemoryContextSummary {
            recent_queries,
            preferred_transport,
        })
    }

    async fn add_memory(&self, user_id: &str, record: MemoryRecord) -> Result<(), MemoryError> {
        let mut entries = self.entries.lock().await;
        entries.entry(user_id.to_string()).or_default().push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(query: &str, transport: Option<TransportMode>) -> MemoryRecord {
        MemoryRecord {
            query: query.to_string(),
            intent: "find-nearest".to_string(),
            summary: String::new(),
            transport,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_store_returns_default_summary() {
        let store = InMemoryStore::new();
        let ctx = store.get_context("u1").await.unwrap();
        assert!(ctx.recent_queries.is_empty());
        assert!(ctx.preferred_transport.is_none());
    }

    #[tokio::test]
    async fn recent_queries_are_newest_first_and_capped() {
        let store = InMemoryStore::new();
        for i in 0..7 {
            store
                .add_memory("u1", record(&format!("query {i}"), None))
                .await
                .unwrap();
        }
        let ctx = store.get_context("u1").await.unwrap();
        assert_eq!(ctx.recent_queries.len(), SUMMARY_LIMIT);
        assert_eq!(ctx.recent_queries[0], "query 6");
    }

    #[tokio::test]
    async fn latest_transport_wins_as_preference() {
        let store = InMemoryStore::new();
        store
            .add_memory("u1", record("a", Some(TransportMode::Driving)))
            .await
            .unwrap();
        store
            .add_memory("u1", record("b", Some(TransportMode::Cycling)))
            .await
            .unwrap();
        store.add_memory("u1", record("c", None)).await.unwrap();

        let ctx = store.get_context("u1").await.unwrap();
        assert_eq!(ctx.preferred_transport, Some(TransportMode::Cycling));
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = InMemoryStore::new();
        store.add_memory("u1", record("a", None)).await.unwrap();
        let ctx = store.get_context("u2").await.unwrap();
        assert!(ctx.recent_queries.is_empty());
    }
}
