//! Shared application state for the Observer API server.
//!
//! The observer holds no playback state of its own. Every handler reads
//! from or commands the [`SelectionBridge`] and the controller behind it,
//! which the viewer binary constructs and shares.

use std::sync::Arc;

use survivor_core::playback::PlaybackController;
use survivor_rollouts::{RolloutRepository, SelectionBridge};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    bridge: Arc<SelectionBridge>,
}

impl AppState {
    /// Serve the given bridge.
    pub const fn new(bridge: Arc<SelectionBridge>) -> Self {
        Self { bridge }
    }

    /// Rollout selection.
    pub fn bridge(&self) -> &SelectionBridge {
        &self.bridge
    }

    /// The playback controller behind the bridge.
    pub fn controller(&self) -> &PlaybackController {
        self.bridge.controller()
    }

    /// The rollout repository behind the bridge.
    pub fn repository(&self) -> &RolloutRepository {
        self.bridge.repository()
    }
}
