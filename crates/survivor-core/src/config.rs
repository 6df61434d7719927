//! Configuration loading and typed config structures for the replay viewer.
//!
//! The configuration lives in `survivor-config.yaml`. Every section and
//! field has a default, so an empty file (or no file at all) yields a
//! working setup that reads rollouts from `./rollouts`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming an alternative rollouts directory.
pub const ENV_ROLLOUTS_DIR: &str = "SURVIVOR_ROLLOUTS_DIR";
/// Environment variable naming a remote repository base URL.
pub const ENV_REPOSITORY_URL: &str = "SURVIVOR_REPOSITORY_URL";
/// Environment variable overriding the observer port.
pub const ENV_OBSERVER_PORT: &str = "SURVIVOR_OBSERVER_PORT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level replay configuration, mirroring `survivor-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplayConfig {
    /// Playback clock settings.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Where rollouts come from.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReplayConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse_yaml(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_yaml(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reports an empty document as a unit, not an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values from the process environment when set:
    /// - `SURVIVOR_ROLLOUTS_DIR` sets `repository.rollouts_dir` and
    ///   switches to a directory repository
    /// - `SURVIVOR_REPOSITORY_URL` sets `repository.base_url` and switches
    ///   to an HTTP repository
    /// - `SURVIVOR_OBSERVER_PORT` sets `observer.port`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// A URL override wins over a directory override when both are set.
    /// An unparseable port is ignored with a warning.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_ROLLOUTS_DIR) {
            self.repository.kind = RepositoryKind::Directory;
            self.repository.rollouts_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(ENV_REPOSITORY_URL) {
            self.repository.kind = RepositoryKind::Http;
            self.repository.base_url = Some(url);
        }
        if let Some(raw) = lookup(ENV_OBSERVER_PORT) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.observer.port = port,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {ENV_OBSERVER_PORT}"),
            }
        }
    }
}

/// Playback clock configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds between automatic steps while playing.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Smallest accepted tick interval.
    #[serde(default = "default_min_tick_interval_ms")]
    pub min_tick_interval_ms: u64,

    /// Rollout to load at startup.
    #[serde(default)]
    pub initial_rollout: Option<String>,

    /// Start playing as soon as the initial rollout is loaded.
    #[serde(default)]
    pub autoplay: bool,
}

impl PlaybackConfig {
    /// The tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The minimum tick interval as a [`Duration`].
    pub const fn min_tick_interval(&self) -> Duration {
        Duration::from_millis(self.min_tick_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            min_tick_interval_ms: default_min_tick_interval_ms(),
            initial_rollout: None,
            autoplay: false,
        }
    }
}

/// Which rollout repository backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// JSON files in a local directory.
    #[default]
    Directory,
    /// A remote server exposing `/rollouts/` endpoints.
    Http,
}

/// Rollout repository configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryConfig {
    /// Backend selection.
    #[serde(default)]
    pub kind: RepositoryKind,

    /// Directory scanned for `*.json` rollouts.
    #[serde(default = "default_rollouts_dir")]
    pub rollouts_dir: PathBuf,

    /// Base URL of a remote repository (required for `http`).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout for the HTTP backend.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            kind: RepositoryKind::default(),
            rollouts_dir: default_rollouts_dir(),
            base_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Observer HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to start the server at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_min_tick_interval_ms() -> u64 {
    100
}

fn default_rollouts_dir() -> PathBuf {
    PathBuf::from("rollouts")
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_observer_host() -> String {
    String::from("127.0.0.1")
}

const fn default_observer_port() -> u16 {
    8090
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}
