//! Observer API server for Survivor rollout replay.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/frames`) streaming every render frame
//!   the playback controller publishes
//! - **Playback REST endpoints** for selecting a rollout and driving the
//!   transport (play, pause, step, seek, speed)
//! - **Repository passthrough** (`/rollouts/`, `/rollouts/{id}`) in the
//!   same shape the HTTP repository backend consumes, so one viewer can
//!   serve rollouts to another
//! - **Minimal HTML status page** (`GET /`) with the stage drawn as SVG
//!
//! # Architecture
//!
//! The observer owns no playback state. [`AppState`] wraps the
//! [`SelectionBridge`](survivor_rollouts::SelectionBridge) the viewer
//! builds, and every handler either reads the controller's latest frame
//! or issues one of its transitions.

pub mod error;
pub mod handlers;
pub mod playback;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{ObserverHandle, StartupError, spawn_observer};
pub use state::AppState;
