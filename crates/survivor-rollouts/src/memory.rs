//! An in-process repository for tests and embedding.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use survivor_types::EventLog;

use crate::error::RepositoryError;

/// Rollouts held in memory, with optional per-rollout fetch latency.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    rollouts: BTreeMap<String, Arc<EventLog>>,
    latency: HashMap<String, Duration>,
    listing_unavailable: bool,
}

impl MemoryRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rollout.
    #[must_use]
    pub fn with_rollout(mut self, identifier: &str, log: EventLog) -> Self {
        self.rollouts.insert(identifier.to_owned(), Arc::new(log));
        self
    }

    /// Delay every fetch of `identifier` by `latency`.
    #[must_use]
    pub fn with_latency(mut self, identifier: &str, latency: Duration) -> Self {
        self.latency.insert(identifier.to_owned(), latency);
        self
    }

    /// Make [`list`](Self::list) fail, as an unreachable server would.
    #[must_use]
    pub fn with_listing_unavailable(mut self) -> Self {
        self.listing_unavailable = true;
        self
    }

    /// Identifiers in sorted order.
    #[allow(clippy::unused_async)]
    pub async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        if self.listing_unavailable {
            return Err(RepositoryError::Status {
                url: String::from("memory:/rollouts/"),
                status: 503,
            });
        }
        Ok(self.rollouts.keys().cloned().collect())
    }

    /// Look up one rollout, after its configured latency.
    pub async fn fetch(&self, identifier: &str) -> Result<Arc<EventLog>, RepositoryError> {
        if let Some(latency) = self.latency.get(identifier) {
            tokio::time::sleep(*latency).await;
        }
        self.rollouts
            .get(identifier)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(identifier.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_and_fetches() {
        let repo = MemoryRepository::new()
            .with_rollout("b", EventLog::default())
            .with_rollout("a", EventLog::default());
        assert_eq!(repo.list().await.unwrap(), vec!["a", "b"]);
        assert!(repo.fetch("a").await.unwrap().is_empty());
        assert!(matches!(
            repo.fetch("c").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_fetch() {
        let repo = MemoryRepository::new()
            .with_rollout("slow", EventLog::default())
            .with_latency("slow", Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        repo.fetch("slow").await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unavailable_listing_fails() {
        let repo = MemoryRepository::new().with_listing_unavailable();
        assert!(repo.list().await.is_err());
    }
}
