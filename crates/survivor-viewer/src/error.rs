//! Error types for the viewer binary.
//!
//! [`ViewerError`] is the top-level error type that wraps every failure
//! mode during startup and shutdown.

/// Top-level error for the viewer binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: survivor_core::config::ConfigError,
    },

    /// The rollout repository could not be built.
    #[error("repository error: {source}")]
    Repository {
        /// The underlying repository error.
        #[from]
        source: survivor_rollouts::RepositoryError,
    },

    /// The playback controller could not be created.
    #[error("playback error: {source}")]
    Playback {
        /// The underlying playback error.
        #[from]
        source: survivor_core::playback::PlaybackError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: survivor_observer::StartupError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
