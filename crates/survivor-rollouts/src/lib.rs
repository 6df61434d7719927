//! Rollout repositories and the selection bridge.
//!
//! # Modules
//!
//! - [`repository`] -- [`RolloutRepository`], enum dispatch over backends
//! - [`directory`] -- `*.json` files in a local directory
//! - [`http`] -- a remote server with `/rollouts/` endpoints
//! - [`memory`] -- in-process rollouts for tests and embedding
//! - [`bridge`] -- [`SelectionBridge`], which loads selections into a
//!   playback controller and discards stale fetches
//! - [`error`] -- [`RepositoryError`] and [`BridgeError`]

pub mod bridge;
pub mod directory;
pub mod error;
pub mod http;
pub mod memory;
pub mod repository;

pub use bridge::{CurrentSelection, SelectionBridge, SelectionOutcome};
pub use error::{BridgeError, RepositoryError};
pub use repository::RolloutRepository;
