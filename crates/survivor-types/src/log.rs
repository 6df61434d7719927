//! The ordered, immutable event log of one rollout.

use serde::{Deserialize, Serialize};

use crate::events::{Event, EventKind, RoundEntryParams};
use crate::ids::PlayerId;

/// Errors raised while building or decoding an [`EventLog`].
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The document is not valid JSON or an event has the wrong shape.
    #[error("malformed rollout document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Sequence numbers must strictly increase along the log.
    #[error("event at index {index} has seq_number {found}, not greater than previous {previous}")]
    NonMonotonicSequence {
        /// Index of the offending event.
        index: usize,
        /// Sequence number of the event before it.
        previous: u64,
        /// Sequence number of the offending event.
        found: u64,
    },
}

/// Accepted top-level shapes of a rollout document.
#[derive(Deserialize)]
#[serde(untagged)]
enum RolloutDocument {
    Bare(Vec<Event>),
    Wrapped { events: Vec<Event> },
}

/// An ordered sequence of events; its length is the number of playback steps.
///
/// Construction validates that sequence numbers strictly increase, so any
/// `EventLog` in hand can be indexed by position without further checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Build a log from events in playback order.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::NonMonotonicSequence`] if a sequence number does
    /// not exceed its predecessor's.
    pub fn new(events: Vec<Event>) -> Result<Self, LogError> {
        for (index, pair) in events.windows(2).enumerate() {
            if let [prev, next] = pair {
                if next.seq_number <= prev.seq_number {
                    return Err(LogError::NonMonotonicSequence {
                        index: index.saturating_add(1),
                        previous: prev.seq_number,
                        found: next.seq_number,
                    });
                }
            }
        }
        Ok(Self { events })
    }

    /// Decode a rollout document: either a bare array of events or an
    /// object with an `events` array.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Malformed`] for invalid JSON or event shapes and
    /// [`LogError::NonMonotonicSequence`] for out-of-order events.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, LogError> {
        let events = match serde_json::from_slice::<RolloutDocument>(bytes)? {
            RolloutDocument::Bare(events) | RolloutDocument::Wrapped { events } => events,
        };
        Self::new(events)
    }

    /// Number of events (total playback steps).
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// All events in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Index of the final event, or `None` for an empty log.
    pub fn last_index(&self) -> Option<usize> {
        self.events.len().checked_sub(1)
    }

    /// The roster of the first round-entry event anywhere in the log.
    pub fn initial_roster(&self) -> Option<&RoundEntryParams> {
        self.events.iter().find_map(|event| match &event.kind {
            EventKind::EnterNormalRound(params) => Some(params),
            _ => None,
        })
    }

    /// Events `player` could see, up to and including sequence `as_of`.
    pub fn visible_to(&self, player: PlayerId, as_of: u64) -> Vec<&Event> {
        self.events
            .iter()
            .take_while(|event| event.seq_number <= as_of)
            .filter(|event| event.is_visible_to(player))
            .collect()
    }

    /// Sequence number the simulator would assign to the next event.
    pub fn next_seq_number(&self) -> u64 {
        self.events
            .last()
            .map_or(0, |event| event.seq_number.saturating_add(1))
    }

    /// The whole log as transcript lines, one event per line.
    pub fn transcript(&self) -> String {
        render_transcript(self.events.iter())
    }
}

/// Join transcript lines for an arbitrary selection of events.
pub fn render_transcript<'a>(events: impl IntoIterator<Item = &'a Event>) -> String {
    events
        .into_iter()
        .map(Event::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'de> Deserialize<'de> for EventLog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let events = match RolloutDocument::deserialize(deserializer)? {
            RolloutDocument::Bare(events) | RolloutDocument::Wrapped { events } => events,
        };
        Self::new(events).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::events::{MessageParams, StatementParams};

    const SAMPLE: &str = r#"[
        {"seq_number": 0, "event_type": "ENTER_NORMAL_ROUND",
         "event_params": {"player_ids_in_round": [1, 2, 3]}},
        {"seq_number": 1, "event_type": "PRIVATE_MESSAGE",
         "event_params": {"send_player_id": 1, "recv_player_id": 2, "message": "ally?"}},
        {"seq_number": 2, "event_type": "PUBLIC_STATEMENT",
         "event_params": {"speaking_player_id": 3, "statement": "hello all"}},
        {"seq_number": 3, "event_type": "ELIMINATION",
         "event_params": {"eliminated_player_id": 3, "reason": "votes"}}
    ]"#;

    #[test]
    fn decodes_bare_array() {
        let log = EventLog::from_json_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log.last_index(), Some(3));
        assert_eq!(log.next_seq_number(), 4);
    }

    #[test]
    fn decodes_wrapped_document() {
        let doc = format!(r#"{{"events": {SAMPLE}}}"#);
        let log = EventLog::from_json_slice(doc.as_bytes()).unwrap();
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn empty_log() {
        let log = EventLog::from_json_slice(b"[]").unwrap();
        assert!(log.is_empty());
        assert_eq!(log.last_index(), None);
        assert_eq!(log.next_seq_number(), 0);
        assert!(log.initial_roster().is_none());
    }

    #[test]
    fn rejects_out_of_order_sequence_numbers() {
        let events = vec![
            Event::new(
                4,
                EventKind::PublicStatement(StatementParams {
                    speaking_player_id: PlayerId(1),
                    statement: String::from("a"),
                }),
            ),
            Event::new(
                4,
                EventKind::PublicStatement(StatementParams {
                    speaking_player_id: PlayerId(1),
                    statement: String::from("b"),
                }),
            ),
        ];
        let err = EventLog::new(events).unwrap_err();
        assert!(matches!(
            err,
            LogError::NonMonotonicSequence {
                index: 1,
                previous: 4,
                found: 4
            }
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = EventLog::from_json_slice(b"{not json").unwrap_err();
        assert!(matches!(err, LogError::Malformed(_)));
    }

    #[test]
    fn visibility_filter_respects_player_and_horizon() {
        let log = EventLog::from_json_slice(SAMPLE.as_bytes()).unwrap();

        let seen_by_three: Vec<u64> = log
            .visible_to(PlayerId(3), 3)
            .iter()
            .map(|e| e.seq_number)
            .collect();
        assert_eq!(seen_by_three, vec![0, 2, 3]);

        let seen_by_two_early: Vec<u64> = log
            .visible_to(PlayerId(2), 1)
            .iter()
            .map(|e| e.seq_number)
            .collect();
        assert_eq!(seen_by_two_early, vec![0, 1]);
    }

    #[test]
    fn initial_roster_is_first_round_entry() {
        let log = EventLog::from_json_slice(SAMPLE.as_bytes()).unwrap();
        let roster = log.initial_roster().unwrap();
        assert_eq!(
            roster.player_ids_in_round,
            vec![PlayerId(1), PlayerId(2), PlayerId(3)]
        );
    }

    #[test]
    fn transcript_has_one_line_per_event() {
        let log = EventLog::new(vec![Event::new(
            0,
            EventKind::PrivateMessage(MessageParams {
                send_player_id: PlayerId(1),
                recv_player_id: PlayerId(2),
                message: String::from("ally?"),
            }),
        )])
        .unwrap();
        assert_eq!(
            log.transcript(),
            "PRIVATE_MESSAGE: P1 sent P2 a message: 'ally?' (event_sequence=0)"
        );

        let full = EventLog::from_json_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(full.transcript().lines().count(), 4);
    }

    #[test]
    fn deserializes_through_serde() {
        let log: EventLog = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(log.len(), 4);
        let back = serde_json::to_value(&log).unwrap();
        assert!(back.is_array());
    }
}
