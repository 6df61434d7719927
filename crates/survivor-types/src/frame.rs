//! Derived world state and the frames handed to render surfaces.
//!
//! Nothing here is stored in a rollout file. Every value is recomputed from
//! an [`EventLog`](crate::EventLog) prefix and a playback position, then
//! sent to render surfaces as a full replacement of what they display.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::PlayerId;

/// A player as seen at one point of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// Player identifier.
    pub id: PlayerId,
    /// Whether an elimination for this player has been replayed.
    pub eliminated: bool,
}

impl Participant {
    /// A participant still in the game.
    pub const fn active(id: PlayerId) -> Self {
        Self {
            id,
            eliminated: false,
        }
    }
}

/// World state derived from a log prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Roster in seating order.
    pub participants: Vec<Participant>,
    /// Narration of the event at the current position.
    pub narrative_line: String,
    /// Fraction of the log replayed, in `[0, 1]`.
    pub progress: f64,
}

impl WorldSnapshot {
    /// The snapshot shown when nothing is loaded.
    pub const fn empty() -> Self {
        Self {
            participants: Vec::new(),
            narrative_line: String::new(),
            progress: 0.0,
        }
    }
}

/// Lifecycle state of a playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PlaybackStatus {
    /// No log loaded.
    Idle,
    /// The clock is running.
    Playing,
    /// A log is loaded and the clock is stopped.
    Paused,
}

/// Current position into the loaded log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlaybackPosition {
    /// Index of the event being shown; `None` when no events are loaded.
    pub current: Option<usize>,
    /// Number of events in the loaded log.
    pub total: usize,
}

impl PlaybackPosition {
    /// One-based step counter as shown under the timeline, e.g. `3 / 20`.
    pub fn step_label(&self) -> String {
        match self.current {
            Some(current) => format!("{} / {}", current.saturating_add(1), self.total),
            None => String::from("--/--"),
        }
    }
}

/// Everything a render surface needs to redraw, in one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RenderFrame {
    /// Roster with elimination flags.
    pub participants: Vec<Participant>,
    /// Narration of the current event.
    pub narrative_line: String,
    /// Index of the current event, if a log is loaded.
    pub position: Option<usize>,
    /// Number of events in the loaded log.
    pub total: usize,
    /// Controller state when the frame was produced.
    pub status: PlaybackStatus,
    /// Fraction of the log replayed, in `[0, 1]`.
    pub progress: f64,
}

impl RenderFrame {
    /// The frame shown while no log is loaded.
    pub const fn idle() -> Self {
        Self {
            participants: Vec::new(),
            narrative_line: String::new(),
            position: None,
            total: 0,
            status: PlaybackStatus::Idle,
            progress: 0.0,
        }
    }

    /// Combine a derived snapshot with the controller's position and status.
    pub fn from_snapshot(
        snapshot: WorldSnapshot,
        position: PlaybackPosition,
        status: PlaybackStatus,
    ) -> Self {
        Self {
            participants: snapshot.participants,
            narrative_line: snapshot.narrative_line,
            position: position.current,
            total: position.total,
            status,
            progress: snapshot.progress,
        }
    }

    /// Position and total as a [`PlaybackPosition`].
    pub const fn playback_position(&self) -> PlaybackPosition {
        PlaybackPosition {
            current: self.position,
            total: self.total,
        }
    }
}

/// Aggregate facts about a whole rollout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RolloutSummary {
    /// Number of events in the log.
    pub total_events: usize,
    /// Winner, if a winner event was recorded.
    pub winner_id: Option<PlayerId>,
    /// Distinct players referenced by rosters, messages, and statements.
    pub player_count: usize,
    /// Private messages plus public statements.
    pub message_count: usize,
    /// Eliminated players in the order they left.
    pub elimination_order: Vec<PlayerId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn step_label_is_one_based() {
        let position = PlaybackPosition {
            current: Some(2),
            total: 20,
        };
        assert_eq!(position.step_label(), "3 / 20");
        assert_eq!(PlaybackPosition::default().step_label(), "--/--");
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PlaybackStatus::Playing).unwrap();
        assert_eq!(json, r#""playing""#);
    }

    #[test]
    fn frame_carries_snapshot_and_position() {
        let snapshot = WorldSnapshot {
            participants: vec![Participant::active(PlayerId(1))],
            narrative_line: String::from("Player 1 wins!"),
            progress: 1.0,
        };
        let frame = RenderFrame::from_snapshot(
            snapshot,
            PlaybackPosition {
                current: Some(4),
                total: 5,
            },
            PlaybackStatus::Paused,
        );
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["position"], 4);
        assert_eq!(json["total"], 5);
        assert_eq!(json["status"], "paused");
        assert_eq!(json["participants"][0]["id"], 1);
        assert_eq!(json["participants"][0]["eliminated"], false);
    }

    #[test]
    fn idle_frame_has_no_position() {
        let frame = RenderFrame::idle();
        assert_eq!(frame.playback_position(), PlaybackPosition::default());
        assert_eq!(frame.status, PlaybackStatus::Idle);
    }
}
