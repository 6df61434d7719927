//! Rollout events and their variant-specific parameter payloads.
//!
//! On the wire an event is a flat record with a string `event_type` tag and
//! a loose `event_params` object whose keys depend on the tag. In memory
//! the tag and payload are folded into a single [`EventKind`] so each
//! variant carries only its own fields. Tags this crate does not recognize
//! are kept verbatim in [`EventKind::Unknown`] rather than rejected, so
//! logs written by newer simulators still load.
//!
//! A recognized tag whose payload does not fit its parameter shape is a
//! malformed log and fails deserialization.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Recognized event variant tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    /// A normal round starts; carries the roster.
    EnterNormalRound,
    /// One player privately messages another.
    PrivateMessage,
    /// A player speaks to everyone.
    PublicStatement,
    /// A player privately votes to eliminate another.
    PrivateVote,
    /// Votes for the round are counted.
    VoteTally,
    /// A player leaves the game.
    Elimination,
    /// The final two players are announced.
    EnterFinalRound,
    /// A finalist addresses the jury.
    FinalPublicPlea,
    /// An eliminated player votes for a finalist to win.
    FinalVote,
    /// The game is decided.
    Winner,
}

impl EventTag {
    /// All recognized tags in game order.
    pub const ALL: [Self; 10] = [
        Self::EnterNormalRound,
        Self::PrivateMessage,
        Self::PublicStatement,
        Self::PrivateVote,
        Self::VoteTally,
        Self::Elimination,
        Self::EnterFinalRound,
        Self::FinalPublicPlea,
        Self::FinalVote,
        Self::Winner,
    ];

    /// The canonical tag written to rollout files.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::EnterNormalRound => "ENTER_NORMAL_ROUND",
            Self::PrivateMessage => "PRIVATE_MESSAGE",
            Self::PublicStatement => "PUBLIC_STATEMENT",
            Self::PrivateVote => "PRIVATE_VOTE",
            Self::VoteTally => "VOTE_TALLY",
            Self::Elimination => "ELIMINATION",
            Self::EnterFinalRound => "ENTER_FINAL_ROUND",
            Self::FinalPublicPlea => "FINAL_PUBLIC_PLEA",
            Self::FinalVote => "FINAL_VOTE",
            Self::Winner => "WINNER",
        }
    }

    /// Parse a wire tag.
    ///
    /// Accepts the canonical names, their lowercase forms, the short
    /// variant names (`message`, `speech`, `vote`, `winner`, ...) with `_`
    /// or `-` separators, and the `*Event` spellings used by the older
    /// web front end.
    pub fn from_wire(tag: &str) -> Option<Self> {
        let parsed = match tag {
            "ENTER_NORMAL_ROUND" | "EnterNormalRoundEvent" | "enter_normal_round"
            | "round_entry" | "round-entry" => Self::EnterNormalRound,
            "PRIVATE_MESSAGE" | "MessageEvent" | "private_message" | "message" => {
                Self::PrivateMessage
            }
            "PUBLIC_STATEMENT" | "SpeechEvent" | "public_statement" | "speech" => {
                Self::PublicStatement
            }
            "PRIVATE_VOTE" | "VotingEvent" | "private_vote" | "vote" => Self::PrivateVote,
            "VOTE_TALLY" | "vote_tally" | "vote-tally" => Self::VoteTally,
            "ELIMINATION" | "EliminationEvent" | "elimination" => Self::Elimination,
            "ENTER_FINAL_ROUND" | "enter_final_round" | "final_pair" | "final-pair" => {
                Self::EnterFinalRound
            }
            "FINAL_PUBLIC_PLEA" | "final_public_plea" | "final_plea" | "final-plea" => {
                Self::FinalPublicPlea
            }
            "FINAL_VOTE" | "final_vote" | "final-vote" => Self::FinalVote,
            "WINNER" | "WinnerEvent" | "winner" => Self::Winner,
            _ => return None,
        };
        Some(parsed)
    }
}

// ---------------------------------------------------------------------------
// Parameter payloads
// ---------------------------------------------------------------------------

/// Parameters of [`EventTag::EnterNormalRound`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEntryParams {
    /// Players still in the game, in seating order.
    pub player_ids_in_round: Vec<PlayerId>,
}

/// Parameters of [`EventTag::PrivateMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParams {
    /// Sender.
    pub send_player_id: PlayerId,
    /// Recipient.
    pub recv_player_id: PlayerId,
    /// Message body.
    pub message: String,
}

/// Parameters of [`EventTag::PublicStatement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementParams {
    /// Speaker.
    pub speaking_player_id: PlayerId,
    /// What was said.
    pub statement: String,
}

/// Parameters of [`EventTag::PrivateVote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteParams {
    /// Player casting the vote.
    pub voting_player_id: PlayerId,
    /// Player the vote is against.
    pub target_elimination_player_id: PlayerId,
}

/// Parameters of [`EventTag::VoteTally`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTallyParams {
    /// Votes received per player.
    pub player_id_to_vote_count: BTreeMap<PlayerId, u32>,
}

/// Parameters of [`EventTag::Elimination`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationParams {
    /// Player leaving the game.
    pub eliminated_player_id: PlayerId,
    /// Free-form explanation, when the simulator recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Parameters of [`EventTag::EnterFinalRound`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRoundParams {
    /// The two surviving players.
    pub final_two_player_ids: [PlayerId; 2],
}

/// Parameters of [`EventTag::FinalPublicPlea`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPleaParams {
    /// Finalist speaking.
    pub speaking_player_id: PlayerId,
    /// The plea.
    pub speech_text: String,
}

/// Parameters of [`EventTag::FinalVote`].
///
/// The field names follow the simulator: `eliminated_player_id` is the
/// juror casting the vote, not a player being removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalVoteParams {
    /// Juror casting the vote.
    pub eliminated_player_id: PlayerId,
    /// Finalist the juror wants to win.
    pub voted_to_win_player_id: PlayerId,
}

/// Parameters of [`EventTag::Winner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerParams {
    /// The winning player.
    pub winner_player_id: PlayerId,
    /// Closing message, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// An event variant together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// See [`EventTag::EnterNormalRound`].
    EnterNormalRound(RoundEntryParams),
    /// See [`EventTag::PrivateMessage`].
    PrivateMessage(MessageParams),
    /// See [`EventTag::PublicStatement`].
    PublicStatement(StatementParams),
    /// See [`EventTag::PrivateVote`].
    PrivateVote(VoteParams),
    /// See [`EventTag::VoteTally`].
    VoteTally(VoteTallyParams),
    /// See [`EventTag::Elimination`].
    Elimination(EliminationParams),
    /// See [`EventTag::EnterFinalRound`].
    EnterFinalRound(FinalRoundParams),
    /// See [`EventTag::FinalPublicPlea`].
    FinalPublicPlea(FinalPleaParams),
    /// See [`EventTag::FinalVote`].
    FinalVote(FinalVoteParams),
    /// See [`EventTag::Winner`].
    Winner(WinnerParams),
    /// A tag this crate does not recognize, kept verbatim.
    Unknown {
        /// The tag as it appeared on the wire.
        event_type: String,
        /// The untouched parameter object.
        params: serde_json::Value,
    },
}

impl EventKind {
    /// The recognized tag, or `None` for [`EventKind::Unknown`].
    pub const fn tag(&self) -> Option<EventTag> {
        let tag = match self {
            Self::EnterNormalRound(_) => EventTag::EnterNormalRound,
            Self::PrivateMessage(_) => EventTag::PrivateMessage,
            Self::PublicStatement(_) => EventTag::PublicStatement,
            Self::PrivateVote(_) => EventTag::PrivateVote,
            Self::VoteTally(_) => EventTag::VoteTally,
            Self::Elimination(_) => EventTag::Elimination,
            Self::EnterFinalRound(_) => EventTag::EnterFinalRound,
            Self::FinalPublicPlea(_) => EventTag::FinalPublicPlea,
            Self::FinalVote(_) => EventTag::FinalVote,
            Self::Winner(_) => EventTag::Winner,
            Self::Unknown { .. } => return None,
        };
        Some(tag)
    }

    /// The tag string: canonical for recognized variants, verbatim otherwise.
    pub fn wire_tag(&self) -> &str {
        match self {
            Self::Unknown { event_type, .. } => event_type,
            known => known.tag().map_or("", EventTag::wire_name),
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A single entry of a rollout log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub struct Event {
    /// Position of the event in the simulator's global ordering.
    pub seq_number: u64,
    /// Variant and parameters.
    pub kind: EventKind,
    /// The simulator's parameter class name, preserved for round trips.
    pub params_type: Option<String>,
}

impl Event {
    /// Build an event without a parameter class name.
    pub const fn new(seq_number: u64, kind: EventKind) -> Self {
        Self {
            seq_number,
            kind,
            params_type: None,
        }
    }

    /// Whether `player` could have observed this event during the game.
    ///
    /// Private messages are seen by their two parties and private votes
    /// by the voter alone. Everything else is public.
    pub fn is_visible_to(&self, player: PlayerId) -> bool {
        match &self.kind {
            EventKind::PrivateMessage(p) => {
                player == p.send_player_id || player == p.recv_player_id
            }
            EventKind::PrivateVote(p) => player == p.voting_player_id,
            _ => true,
        }
    }

    /// Human-readable description of what happened.
    pub fn description(&self) -> String {
        match &self.kind {
            EventKind::EnterNormalRound(p) => {
                let mut ids = p.player_ids_in_round.clone();
                ids.sort_unstable();
                let names: Vec<String> = ids.iter().map(|id| format!("P{id}")).collect();
                format!("New round begins with players: {}", names.join(", "))
            }
            EventKind::PrivateMessage(p) => format!(
                "P{} sent P{} a message: '{}'",
                p.send_player_id, p.recv_player_id, p.message
            ),
            EventKind::PublicStatement(p) => format!(
                "P{} made public statement: '{}'",
                p.speaking_player_id, p.statement
            ),
            EventKind::PrivateVote(p) => format!(
                "P{} voted to eliminate P{}",
                p.voting_player_id, p.target_elimination_player_id
            ),
            EventKind::VoteTally(p) => {
                let mut out = String::from("Votes are tallied. Results show: ");
                for (i, (id, count)) in p.player_id_to_vote_count.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "P{id}={count}");
                }
                out
            }
            EventKind::Elimination(p) => format!(
                "P{} was eliminated. Reason: '{}'",
                p.eliminated_player_id,
                p.reason.as_deref().unwrap_or_default()
            ),
            EventKind::EnterFinalRound(p) => {
                let [a, b] = p.final_two_player_ids;
                format!("Final round begins with P{a} and P{b}")
            }
            EventKind::FinalPublicPlea(p) => format!(
                "P{} made a final plea: '{}'",
                p.speaking_player_id, p.speech_text
            ),
            EventKind::FinalVote(p) => format!(
                "P{} voted for P{} to win",
                p.eliminated_player_id, p.voted_to_win_player_id
            ),
            EventKind::Winner(p) => format!(
                "P{} is the winner! ({})",
                p.winner_player_id,
                p.message.as_deref().unwrap_or_default()
            ),
            EventKind::Unknown { .. } => String::from("unrecognized event"),
        }
    }

    /// One transcript line: tag, description, and sequence number.
    pub fn as_text(&self) -> String {
        format!(
            "{}: {} (event_sequence={})",
            self.kind.wire_tag(),
            self.description(),
            self.seq_number
        )
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

/// Flat on-the-wire shape of an [`Event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEvent {
    #[serde(alias = "sequence_number")]
    seq_number: u64,
    event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_params_type: Option<String>,
    #[serde(default)]
    event_params: serde_json::Value,
}

fn decode<T: DeserializeOwned>(params: serde_json::Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(params)
}

fn encode<T: Serialize>(params: &T) -> serde_json::Value {
    let value = serde_json::to_value(params);
    debug_assert!(value.is_ok(), "event params failed to serialize: {value:?}");
    value.unwrap_or_default()
}

impl TryFrom<RawEvent> for Event {
    type Error = serde_json::Error;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let params = raw.event_params;
        let kind = match EventTag::from_wire(&raw.event_type) {
            None => EventKind::Unknown {
                event_type: raw.event_type,
                params,
            },
            Some(EventTag::EnterNormalRound) => EventKind::EnterNormalRound(decode(params)?),
            Some(EventTag::PrivateMessage) => EventKind::PrivateMessage(decode(params)?),
            Some(EventTag::PublicStatement) => EventKind::PublicStatement(decode(params)?),
            Some(EventTag::PrivateVote) => EventKind::PrivateVote(decode(params)?),
            Some(EventTag::VoteTally) => EventKind::VoteTally(decode(params)?),
            Some(EventTag::Elimination) => EventKind::Elimination(decode(params)?),
            Some(EventTag::EnterFinalRound) => EventKind::EnterFinalRound(decode(params)?),
            Some(EventTag::FinalPublicPlea) => EventKind::FinalPublicPlea(decode(params)?),
            Some(EventTag::FinalVote) => EventKind::FinalVote(decode(params)?),
            Some(EventTag::Winner) => EventKind::Winner(decode(params)?),
        };
        Ok(Self {
            seq_number: raw.seq_number,
            kind,
            params_type: raw.event_params_type,
        })
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        let event_type = event.kind.wire_tag().to_owned();
        let event_params = match event.kind {
            EventKind::EnterNormalRound(p) => encode(&p),
            EventKind::PrivateMessage(p) => encode(&p),
            EventKind::PublicStatement(p) => encode(&p),
            EventKind::PrivateVote(p) => encode(&p),
            EventKind::VoteTally(p) => encode(&p),
            EventKind::Elimination(p) => encode(&p),
            EventKind::EnterFinalRound(p) => encode(&p),
            EventKind::FinalPublicPlea(p) => encode(&p),
            EventKind::FinalVote(p) => encode(&p),
            EventKind::Winner(p) => encode(&p),
            EventKind::Unknown { params, .. } => params,
        };
        Self {
            seq_number: event.seq_number,
            event_type,
            event_params_type: event.params_type,
            event_params,
        }
    }
}
