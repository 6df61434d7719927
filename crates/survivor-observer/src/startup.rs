//! Observer server startup helper for embedding in the viewer.
//!
//! Provides [`spawn_observer`] which binds the Observer HTTP + `WebSocket`
//! server and runs it on a background Tokio task, so the API serves
//! requests while playback runs.

use std::net::SocketAddr;
use std::sync::Arc;

use survivor_core::config::ObserverConfig;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A running Observer server.
#[derive(Debug)]
pub struct ObserverHandle {
    /// Address actually bound (useful with port 0).
    pub addr: SocketAddr,
    /// The serving task; abort it to stop the server.
    pub task: JoinHandle<()>,
}

/// Bind the Observer server and serve it on a background task.
///
/// Binding happens before this returns, so an address already in use is
/// reported to the caller instead of only being logged by the task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// configured address.
pub async fn spawn_observer(
    config: &ObserverConfig,
    state: Arc<AppState>,
) -> Result<ObserverHandle, StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("failed to read bound address: {e}")))?;

    let task = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok(ObserverHandle { addr, task })
}
