//! Shared type definitions for Survivor rollout replay.
//!
//! This crate is the single source of truth for the rollout wire format
//! and for the frames handed to render surfaces. Frame types flow to
//! `TypeScript` via `ts-rs` for web front ends.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe player identifiers
//! - [`events`] -- Event tags, parameter payloads, and the wire codec
//! - [`log`] -- The validated, ordered [`EventLog`] of one rollout
//! - [`frame`] -- Derived snapshots, playback status, and render frames

pub mod events;
pub mod frame;
pub mod ids;
pub mod log;

// Re-export all public types at crate root for convenience.
pub use events::{
    EliminationParams, Event, EventKind, EventTag, FinalPleaParams, FinalRoundParams,
    FinalVoteParams, MessageParams, RoundEntryParams, StatementParams, VoteParams,
    VoteTallyParams, WinnerParams,
};
pub use frame::{
    Participant, PlaybackPosition, PlaybackStatus, RenderFrame, RolloutSummary, WorldSnapshot,
};
pub use ids::PlayerId;
pub use log::{EventLog, LogError, render_transcript};
