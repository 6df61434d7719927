//! Viewer binary for Survivor rollout replay.
//!
//! Wires the rollout repository, the playback controller, the selection
//! bridge, a terminal transcript surface, and the Observer API together,
//! then replays until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `survivor-config.yaml` (or `SURVIVOR_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the rollout repository selected by configuration
//! 4. Create the playback controller and selection bridge
//! 5. Attach the transcript surface to the frame stream
//! 6. Load the initial rollout, if configured, and optionally play it
//! 7. Start the Observer API server
//! 8. Wait for Ctrl-C, then shut down

mod error;
mod transcript;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use survivor_core::config::{LoggingConfig, ReplayConfig};
use survivor_core::playback::PlaybackController;
use survivor_core::render::spawn_render_loop;
use survivor_observer::AppState;
use survivor_rollouts::{RolloutRepository, SelectionBridge, SelectionOutcome};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ViewerError;
use crate::transcript::TranscriptSurface;

/// Environment variable naming an alternative config file.
const ENV_CONFIG_PATH: &str = "SURVIVOR_CONFIG";
/// Config file read when `SURVIVOR_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "survivor-config.yaml";

/// Application entry point for the viewer.
///
/// # Errors
///
/// Returns an error if configuration, startup, or signal handling fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so this comes first.
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("survivor-viewer starting");
    info!(
        path = %config_path.display(),
        repository = ?config.repository.kind,
        tick_interval_ms = config.playback.tick_interval_ms,
        observer_enabled = config.observer.enabled,
        "Configuration loaded"
    );

    run(&config).await?;
    Ok(())
}

/// Run the viewer until Ctrl-C.
async fn run(config: &ReplayConfig) -> Result<(), ViewerError> {
    // 3. Build the rollout repository.
    let repository = Arc::new(RolloutRepository::from_config(&config.repository)?);
    info!(backend = repository.name(), "Rollout repository ready");

    // 4. Create the controller and bridge.
    let controller = Arc::new(PlaybackController::new(&config.playback)?);
    let bridge = Arc::new(SelectionBridge::new(repository, Arc::clone(&controller)));

    // 5. Attach the transcript surface.
    let render_task = spawn_render_loop(
        controller.subscribe(),
        TranscriptSurface::new(std::io::stdout()),
    );

    // 6. Initial rollout.
    if let Some(identifier) = config.playback.initial_rollout.as_deref() {
        match bridge.select_rollout(Some(identifier)).await {
            Ok(SelectionOutcome::Loaded { total, .. }) => {
                info!(identifier, total, "Initial rollout loaded");
                if config.playback.autoplay {
                    controller.play();
                }
            }
            Ok(outcome) => info!(identifier, ?outcome, "Initial rollout not applied"),
            Err(e) => warn!(error = %e, "Initial rollout could not be loaded"),
        }
    } else {
        let available = bridge.available_rollouts().await;
        info!(count = available.len(), "No initial rollout configured");
    }

    // 7. Start Observer API server.
    let observer = if config.observer.enabled {
        let state = Arc::new(AppState::new(Arc::clone(&bridge)));
        let handle = survivor_observer::spawn_observer(&config.observer, state).await?;
        info!(addr = %handle.addr, "Observer API server started");
        Some(handle)
    } else {
        info!("Observer API server disabled");
        None
    };

    // 8. Wait for shutdown.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    if let Some(handle) = observer {
        handle.task.abort();
    }
    controller.unload();
    render_task.abort();

    info!("survivor-viewer shutdown complete");
    Ok(())
}

/// Config file location: `SURVIVOR_CONFIG` if set, else
/// `survivor-config.yaml` in the working directory.
fn config_path() -> PathBuf {
    std::env::var_os(ENV_CONFIG_PATH)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration, falling back to defaults (plus environment
/// overrides) when the file does not exist.
fn load_config(path: &Path) -> Result<ReplayConfig, ViewerError> {
    if path.exists() {
        Ok(ReplayConfig::from_file(path)?)
    } else {
        let mut config = ReplayConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so the
/// transcript on stdout stays clean.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
