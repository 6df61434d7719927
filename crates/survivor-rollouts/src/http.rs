//! Rollouts served by a remote repository over HTTP.
//!
//! The server exposes two endpoints under its base URL:
//!
//! - `GET {base}/rollouts/` -- JSON array of identifiers
//! - `GET {base}/rollouts/{identifier}` -- the rollout's event array

use std::sync::Arc;
use std::time::Duration;

use survivor_types::EventLog;
use tracing::debug;

use crate::directory::validate_identifier;
use crate::error::RepositoryError;

/// Client for a remote rollout repository.
#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRepository {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepositoryError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RepositoryError::Config(String::from(
                "repository.base_url is required for the http repository",
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.to_owned(),
        })
    }

    /// The base URL requests are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the identifier listing.
    pub async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        let url = format!("{}/rollouts/", self.base_url);
        let body = self.get(&url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch and decode one rollout.
    pub async fn fetch(&self, identifier: &str) -> Result<Arc<EventLog>, RepositoryError> {
        validate_identifier(identifier)?;
        let url = format!("{}/rollouts/{identifier}", self.base_url);
        let body = match self.get(&url).await {
            Err(RepositoryError::Status { status: 404, .. }) => {
                return Err(RepositoryError::NotFound(identifier.to_owned()));
            }
            other => other?,
        };
        let log = EventLog::from_json_slice(&body).map_err(|source| RepositoryError::Malformed {
            identifier: identifier.to_owned(),
            source,
        })?;
        debug!(identifier, events = log.len(), "rollout fetched");
        Ok(Arc::new(log))
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, RepositoryError> {
        let transport = |source| RepositoryError::Transport {
            url: url.to_owned(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}
