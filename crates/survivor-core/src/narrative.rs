//! Narrative lines shown over the stage for the current event.
//!
//! The mapping is total: variants without a dedicated template fall back
//! to `Event: {TAG}`, so a render surface always has something to show.

use survivor_types::{Event, EventKind};

/// Narrate a single event.
pub fn narrate(event: &Event) -> String {
    match &event.kind {
        EventKind::PrivateMessage(p) => format!(
            "{} \u{2192} {}: \"{}\"",
            p.send_player_id, p.recv_player_id, p.message
        ),
        EventKind::PublicStatement(p) => {
            format!("{}: \"{}\"", p.speaking_player_id, p.statement)
        }
        EventKind::PrivateVote(p) => format!(
            "{} votes for {}",
            p.voting_player_id, p.target_elimination_player_id
        ),
        EventKind::Elimination(p) => format!("Player {} eliminated", p.eliminated_player_id),
        EventKind::Winner(p) => format!("Player {} wins!", p.winner_player_id),
        other => format!("Event: {}", other.wire_tag()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use survivor_types::{
        EliminationParams, FinalRoundParams, MessageParams, PlayerId, StatementParams,
        VoteParams, WinnerParams,
    };

    use super::*;

    fn event(kind: EventKind) -> Event {
        Event::new(0, kind)
    }

    #[test]
    fn message_line() {
        let line = narrate(&event(EventKind::PrivateMessage(MessageParams {
            send_player_id: PlayerId(1),
            recv_player_id: PlayerId(4),
            message: String::from("vote 2 with me"),
        })));
        assert_eq!(line, "1 → 4: \"vote 2 with me\"");
    }

    #[test]
    fn speech_line() {
        let line = narrate(&event(EventKind::PublicStatement(StatementParams {
            speaking_player_id: PlayerId(3),
            statement: String::from("I have nothing to hide"),
        })));
        assert_eq!(line, "3: \"I have nothing to hide\"");
    }

    #[test]
    fn vote_line() {
        let line = narrate(&event(EventKind::PrivateVote(VoteParams {
            voting_player_id: PlayerId(2),
            target_elimination_player_id: PlayerId(5),
        })));
        assert_eq!(line, "2 votes for 5");
    }

    #[test]
    fn elimination_line_ignores_reason() {
        let line = narrate(&event(EventKind::Elimination(EliminationParams {
            eliminated_player_id: PlayerId(6),
            reason: Some(String::from("most votes")),
        })));
        assert_eq!(line, "Player 6 eliminated");
    }

    #[test]
    fn winner_line_from_wire_json() {
        let event: Event = serde_json::from_str(
            r#"{"seq_number": 12, "event_type": "winner", "event_params": {"winner_player_id": 7}}"#,
        )
        .unwrap();
        assert_eq!(narrate(&event), "Player 7 wins!");

        let event: Event = serde_json::from_str(
            r#"{"seq_number": 12, "event_type": "WINNER", "event_params": {"winner_player_id": 7}}"#,
        )
        .unwrap();
        assert_eq!(narrate(&event), "Player 7 wins!");

        let direct = narrate(&super::Event::new(
            12,
            EventKind::Winner(WinnerParams {
                winner_player_id: PlayerId(7),
                message: None,
            }),
        ));
        assert_eq!(direct, "Player 7 wins!");
    }

    #[test]
    fn untemplated_variants_fall_back_to_tag() {
        let line = narrate(&event(EventKind::EnterFinalRound(FinalRoundParams {
            final_two_player_ids: [PlayerId(1), PlayerId(2)],
        })));
        assert_eq!(line, "Event: ENTER_FINAL_ROUND");

        let unknown = narrate(&event(EventKind::Unknown {
            event_type: String::from("ALLIANCE_FORMED"),
            params: serde_json::Value::Null,
        }));
        assert_eq!(unknown, "Event: ALLIANCE_FORMED");
    }
}
