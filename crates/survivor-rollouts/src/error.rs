//! Error types for rollout repositories and the selection bridge.

use std::path::PathBuf;

use survivor_types::LogError;

/// Errors raised while listing or fetching rollouts.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The identifier is empty or could escape the repository.
    #[error("invalid rollout identifier: {0:?}")]
    InvalidIdentifier(String),

    /// No rollout has this identifier.
    #[error("rollout not found: {0}")]
    NotFound(String),

    /// Reading from the rollouts directory failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The HTTP request could not be completed.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// The underlying client error.
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The rollout listing is not a JSON array of strings.
    #[error("malformed rollout listing: {0}")]
    MalformedListing(#[from] serde_json::Error),

    /// The rollout document could not be decoded.
    #[error("malformed rollout {identifier}: {source}")]
    Malformed {
        /// Rollout being decoded.
        identifier: String,
        /// The decoding error.
        source: LogError,
    },

    /// The repository configuration is incomplete.
    #[error("repository config error: {0}")]
    Config(String),
}

/// Errors returned by [`SelectionBridge`](crate::bridge::SelectionBridge).
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The selected rollout could not be fetched; playback is unchanged.
    #[error("failed to load rollout {identifier}: {source}")]
    Fetch {
        /// Rollout that was requested.
        identifier: String,
        /// Why the fetch failed.
        #[source]
        source: RepositoryError,
    },
}
