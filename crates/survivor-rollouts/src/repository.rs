//! The rollout repository front: one type over every backend.

use std::sync::Arc;
use std::time::Duration;

use survivor_core::config::{RepositoryConfig, RepositoryKind};
use survivor_types::EventLog;

use crate::directory::DirectoryRepository;
use crate::error::RepositoryError;
use crate::http::HttpRepository;
use crate::memory::MemoryRepository;

/// A source of rollouts.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
#[derive(Debug, Clone)]
pub enum RolloutRepository {
    /// `*.json` files in a local directory.
    Directory(DirectoryRepository),
    /// A remote server.
    Http(HttpRepository),
    /// Rollouts held in memory.
    Memory(MemoryRepository),
}

impl RolloutRepository {
    /// Build the backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Config`] when the HTTP backend is chosen
    /// without a base URL or its client cannot be built.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        match config.kind {
            RepositoryKind::Directory => Ok(Self::Directory(DirectoryRepository::new(
                config.rollouts_dir.clone(),
            ))),
            RepositoryKind::Http => {
                let base_url = config.base_url.as_deref().unwrap_or_default();
                let timeout = Duration::from_millis(config.request_timeout_ms);
                Ok(Self::Http(HttpRepository::new(base_url, timeout)?))
            }
        }
    }

    /// List rollout identifiers.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`RepositoryError`] when the listing cannot be
    /// read or decoded.
    pub async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        match self {
            Self::Directory(repo) => repo.list().await,
            Self::Http(repo) => repo.list().await,
            Self::Memory(repo) => repo.list().await,
        }
    }

    /// Fetch one rollout's event log.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for unknown identifiers,
    /// [`RepositoryError::InvalidIdentifier`] for unsafe ones, and a
    /// transport or decoding error otherwise.
    pub async fn fetch(&self, identifier: &str) -> Result<Arc<EventLog>, RepositoryError> {
        match self {
            Self::Directory(repo) => repo.fetch(identifier).await,
            Self::Http(repo) => repo.fetch(identifier).await,
            Self::Memory(repo) => repo.fetch(identifier).await,
        }
    }

    /// Human-readable backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::Http(_) => "http",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<MemoryRepository> for RolloutRepository {
    fn from(repo: MemoryRepository) -> Self {
        Self::Memory(repo)
    }
}
