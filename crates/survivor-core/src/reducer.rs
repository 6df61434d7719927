//! World state derivation from a log prefix.
//!
//! [`derive_state`] is the only way a [`WorldSnapshot`] comes into being.
//! It is recomputed from scratch on every position change; nothing is
//! patched incrementally, so any position can be reached by seeking.
//!
//! The roster is taken from the first round-entry event anywhere in the
//! log, even when it lies past the current position, so the stage shows
//! every seat from the first step. Only elimination events change a
//! participant's state.

use survivor_types::{EventKind, EventLog, Participant, WorldSnapshot};

use crate::narrative::narrate;

/// Derive the world state as of event `upto_inclusive`.
///
/// Positions past the end of the log are clamped for elimination replay.
/// The narrative line is empty when no event exists at that position.
pub fn derive_state(log: &EventLog, upto_inclusive: usize) -> WorldSnapshot {
    let mut participants: Vec<Participant> = log
        .initial_roster()
        .map(|roster| {
            roster
                .player_ids_in_round
                .iter()
                .copied()
                .map(Participant::active)
                .collect()
        })
        .unwrap_or_default();

    let replayed = upto_inclusive.saturating_add(1).min(log.len());
    for event in log.events().iter().take(replayed) {
        if let EventKind::Elimination(params) = &event.kind {
            // Unknown ids are tolerated: the log is still replayable.
            if let Some(participant) = participants
                .iter_mut()
                .find(|p| p.id == params.eliminated_player_id)
            {
                participant.eliminated = true;
            }
        }
    }

    let narrative_line = log.get(upto_inclusive).map(narrate).unwrap_or_default();

    WorldSnapshot {
        participants,
        narrative_line,
        progress: progress(upto_inclusive, log.len()),
    }
}

/// Fraction of the log replayed once `upto_inclusive` is shown.
pub fn progress(upto_inclusive: usize, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    let shown = upto_inclusive.saturating_add(1).min(len);
    ratio(shown, len)
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    // Log lengths are far below 2^52, so the conversion is exact.
    numerator as f64 / denominator as f64
}
