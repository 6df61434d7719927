//! State derivation, playback clock, and configuration for Survivor
//! rollout replay.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `survivor-config.yaml` into
//!   strongly-typed structs.
//! - [`narrative`] -- One-line narration of the current event.
//! - [`reducer`] -- [`derive_state`] rebuilds the world from a log prefix.
//! - [`playback`] -- [`PlaybackController`], the position pointer and its
//!   timer.
//! - [`render`] -- [`RenderSurface`] trait and the frame pump.
//! - [`stage`] -- Ring layout of participants.
//! - [`summary`] -- Whole-rollout aggregates.
//!
//! [`derive_state`]: reducer::derive_state
//! [`PlaybackController`]: playback::PlaybackController
//! [`RenderSurface`]: render::RenderSurface

pub mod config;
pub mod narrative;
pub mod playback;
pub mod reducer;
pub mod render;
pub mod stage;
pub mod summary;
