//! Ring layout of participants on the stage.
//!
//! Seats are spread evenly on a circle in the ground plane whose radius
//! grows with the roster, so larger games do not crowd together.

use std::f64::consts::TAU;

use serde::Serialize;
use survivor_types::{Participant, PlayerId};

/// Radius added per participant.
pub const RADIUS_PER_PARTICIPANT: f64 = 0.8;

/// Seat color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatColor {
    /// Still in the game.
    Cyan,
    /// Eliminated.
    Red,
}

impl SeatColor {
    /// Hex code for web surfaces.
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Cyan => "#00ffff",
            Self::Red => "#ff0000",
        }
    }
}

/// Where and how one participant is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Seat {
    /// Participant drawn in this seat.
    pub id: PlayerId,
    /// Ground-plane x coordinate.
    pub x: f64,
    /// Ground-plane z coordinate.
    pub z: f64,
    /// Fill color.
    pub color: SeatColor,
}

/// Ring radius for `count` participants.
pub fn ring_radius(count: usize) -> f64 {
    RADIUS_PER_PARTICIPANT * as_f64(count)
}

/// Lay out participants on the ring, in roster order.
pub fn layout(participants: &[Participant]) -> Vec<Seat> {
    let count = participants.len();
    let radius = ring_radius(count);
    participants
        .iter()
        .enumerate()
        .map(|(i, participant)| {
            let angle = as_f64(i) / as_f64(count) * TAU;
            Seat {
                id: participant.id,
                x: radius * angle.cos(),
                z: radius * angle.sin(),
                color: if participant.eliminated {
                    SeatColor::Red
                } else {
                    SeatColor::Cyan
                },
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
const fn as_f64(n: usize) -> f64 {
    n as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn four_players_sit_on_the_axes() {
        let participants: Vec<Participant> =
            (1..=4).map(|id| Participant::active(PlayerId(id))).collect();
        let seats = layout(&participants);
        let radius = ring_radius(4);
        assert!(close(radius, 3.2));
        assert!(close(seats[0].x, radius) && close(seats[0].z, 0.0));
        assert!(close(seats[1].x, 0.0) && close(seats[1].z, radius));
        assert!(close(seats[2].x, -radius) && close(seats[2].z, 0.0));
        assert!(close(seats[3].x, 0.0) && close(seats[3].z, -radius));
    }

    #[test]
    fn eliminated_players_are_red() {
        let participants = [
            Participant::active(PlayerId(1)),
            Participant {
                id: PlayerId(2),
                eliminated: true,
            },
        ];
        let seats = layout(&participants);
        assert_eq!(seats[0].color, SeatColor::Cyan);
        assert_eq!(seats[1].color, SeatColor::Red);
        assert_eq!(seats[1].color.hex(), "#ff0000");
    }

    #[test]
    fn empty_roster_has_no_seats() {
        assert!(layout(&[]).is_empty());
    }
}
