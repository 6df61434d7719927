//! Whole-rollout aggregates for listings and the observer API.

use std::collections::BTreeSet;

use survivor_types::{EventKind, EventLog, RolloutSummary};

/// Summarize an entire log.
///
/// Player counts include every id named by a roster, a private message,
/// or a public statement. Votes alone do not add players.
pub fn summarize(log: &EventLog) -> RolloutSummary {
    let mut players = BTreeSet::new();
    let mut message_count: usize = 0;
    let mut winner_id = None;
    let mut elimination_order = Vec::new();

    for event in log.events() {
        match &event.kind {
            EventKind::EnterNormalRound(p) => {
                players.extend(p.player_ids_in_round.iter().copied());
            }
            EventKind::PrivateMessage(p) => {
                players.insert(p.send_player_id);
                players.insert(p.recv_player_id);
                message_count = message_count.saturating_add(1);
            }
            EventKind::PublicStatement(p) => {
                players.insert(p.speaking_player_id);
                message_count = message_count.saturating_add(1);
            }
            EventKind::Elimination(p) => elimination_order.push(p.eliminated_player_id),
            EventKind::Winner(p) => winner_id = Some(p.winner_player_id),
            _ => {}
        }
    }

    RolloutSummary {
        total_events: log.len(),
        winner_id,
        player_count: players.len(),
        message_count,
        elimination_order,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use survivor_types::PlayerId;

    use super::*;

    const GAME: &str = r#"[
        {"seq_number": 0, "event_type": "ENTER_NORMAL_ROUND",
         "event_params": {"player_ids_in_round": [1, 2, 3]}},
        {"seq_number": 1, "event_type": "PRIVATE_MESSAGE",
         "event_params": {"send_player_id": 1, "recv_player_id": 5, "message": "psst"}},
        {"seq_number": 2, "event_type": "PUBLIC_STATEMENT",
         "event_params": {"speaking_player_id": 2, "statement": "hello"}},
        {"seq_number": 3, "event_type": "PRIVATE_VOTE",
         "event_params": {"voting_player_id": 8, "target_elimination_player_id": 3}},
        {"seq_number": 4, "event_type": "ELIMINATION",
         "event_params": {"eliminated_player_id": 3}},
        {"seq_number": 5, "event_type": "ELIMINATION",
         "event_params": {"eliminated_player_id": 2}},
        {"seq_number": 6, "event_type": "WINNER",
         "event_params": {"winner_player_id": 1}}
    ]"#;

    #[test]
    fn summarizes_a_game() {
        let log = EventLog::from_json_slice(GAME.as_bytes()).unwrap();
        let summary = summarize(&log);
        assert_eq!(summary.total_events, 7);
        assert_eq!(summary.winner_id, Some(PlayerId(1)));
        // 1, 2, 3 from the roster plus 5 from the message; voter 8 is not counted.
        assert_eq!(summary.player_count, 4);
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.elimination_order, vec![PlayerId(3), PlayerId(2)]);
    }

    #[test]
    fn empty_log_summary() {
        let summary = summarize(&EventLog::default());
        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.winner_id, None);
        assert_eq!(summary.player_count, 0);
        assert!(summary.elimination_order.is_empty());
    }
}
