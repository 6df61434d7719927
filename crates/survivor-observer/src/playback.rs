//! Playback control REST handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/playback` | Current frame, speed, and selection |
//! | `POST` | `/api/playback/select` | Select a rollout (or `null` to clear) |
//! | `POST` | `/api/playback/play` | Start the clock |
//! | `POST` | `/api/playback/pause` | Stop the clock |
//! | `POST` | `/api/playback/step-forward` | One event forward |
//! | `POST` | `/api/playback/step-backward` | One event back |
//! | `POST` | `/api/playback/seek` | Jump to a position |
//! | `POST` | `/api/playback/speed` | Set the tick interval (ms) |
//! | `GET` | `/api/playback/summary` | Summary of the loaded rollout |
//! | `GET` | `/api/playback/transcript` | Text transcript |
//!
//! Transport endpoints never fail: a transition that does not apply in
//! the current state is a no-op, and the response shows the unchanged
//! state.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use survivor_core::stage::{self, Seat};
use survivor_core::summary::summarize;
use survivor_rollouts::{CurrentSelection, SelectionOutcome};
use survivor_types::{PlayerId, RenderFrame, RolloutSummary, render_transcript};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/playback/select`.
#[derive(Debug, serde::Deserialize)]
pub struct SelectRequest {
    /// Rollout identifier; `null`, missing, or blank clears playback.
    #[serde(default)]
    pub rollout: Option<String>,
}

/// Request body for `POST /api/playback/seek`.
#[derive(Debug, serde::Deserialize)]
pub struct SeekRequest {
    /// Target event index; clamped to the last event.
    pub position: usize,
}

/// Request body for `POST /api/playback/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds.
    pub tick_interval_ms: u64,
}

/// Query parameters for `GET /api/playback/transcript`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct TranscriptQuery {
    /// Restrict to events this player could see.
    pub player: Option<u32>,
    /// Only events with `seq_number` at or below this value.
    pub as_of: Option<u64>,
}

/// Playback state as served by the API.
#[derive(Debug, serde::Serialize)]
pub struct PlaybackView {
    /// The current render frame.
    pub frame: RenderFrame,
    /// One-based step counter, e.g. `3 / 20`.
    pub step_label: String,
    /// Seat positions for the current roster.
    pub stage: Vec<Seat>,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Smallest accepted tick interval in milliseconds.
    pub min_tick_interval_ms: u64,
    /// The loaded rollout, if any.
    pub selection: Option<CurrentSelection>,
}

impl PlaybackView {
    fn capture(state: &AppState) -> Self {
        let controller = state.controller();
        let frame = controller.frame();
        Self {
            step_label: frame.playback_position().step_label(),
            stage: stage::layout(&frame.participants),
            frame,
            tick_interval_ms: millis(controller.tick_interval()),
            min_tick_interval_ms: millis(controller.min_tick_interval()),
            selection: state.bridge().current_selection(),
        }
    }
}

/// Response body for `POST /api/playback/select`.
#[derive(Debug, serde::Serialize)]
pub struct SelectResponse {
    /// What the selection did.
    #[serde(flatten)]
    pub outcome: SelectionOutcome,
    /// Playback state afterwards.
    pub playback: PlaybackView,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// GET /api/playback
// ---------------------------------------------------------------------------

/// Current playback state.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<PlaybackView> {
    Json(PlaybackView::capture(&state))
}

// ---------------------------------------------------------------------------
// POST /api/playback/select
// ---------------------------------------------------------------------------

/// Select a rollout and load it, or clear the selection.
///
/// A selection overtaken by a newer one answers `superseded` with the
/// newer state.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, ObserverError> {
    let outcome = state.bridge().select_rollout(body.rollout.as_deref()).await?;
    Ok(Json(SelectResponse {
        outcome,
        playback: PlaybackView::capture(&state),
    }))
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Start the clock.
pub async fn play(State(state): State<Arc<AppState>>) -> Json<PlaybackView> {
    state.controller().play();
    Json(PlaybackView::capture(&state))
}

/// Stop the clock.
pub async fn pause(State(state): State<Arc<AppState>>) -> Json<PlaybackView> {
    state.controller().pause();
    Json(PlaybackView::capture(&state))
}

/// Step one event forward.
pub async fn step_forward(State(state): State<Arc<AppState>>) -> Json<PlaybackView> {
    state.controller().step_forward();
    Json(PlaybackView::capture(&state))
}

/// Step one event back.
pub async fn step_backward(State(state): State<Arc<AppState>>) -> Json<PlaybackView> {
    state.controller().step_backward();
    Json(PlaybackView::capture(&state))
}

/// Jump to a position.
pub async fn seek(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SeekRequest>,
) -> Json<PlaybackView> {
    state.controller().seek(body.position);
    Json(PlaybackView::capture(&state))
}

// ---------------------------------------------------------------------------
// POST /api/playback/speed
// ---------------------------------------------------------------------------

/// Change the tick interval at runtime.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let previous = state
        .controller()
        .set_tick_interval(Duration::from_millis(body.tick_interval_ms))?;
    let previous_ms = millis(previous);
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Tick interval changed from {previous_ms}ms to {}ms", body.tick_interval_ms),
        "previous_interval_ms": previous_ms,
        "new_interval_ms": body.tick_interval_ms,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/playback/summary
// ---------------------------------------------------------------------------

/// Summary of the loaded rollout.
pub async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RolloutSummary>, ObserverError> {
    let log = state.controller().log().ok_or(ObserverError::NoRolloutLoaded)?;
    Ok(Json(summarize(&log)))
}

// ---------------------------------------------------------------------------
// GET /api/playback/transcript
// ---------------------------------------------------------------------------

/// Plain-text transcript of the loaded rollout, one event per line.
///
/// With `player`, only events that player could see are included.
/// With `as_of`, events after that sequence number are left out.
pub async fn transcript(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscriptQuery>,
) -> Result<String, ObserverError> {
    let log = state.controller().log().ok_or(ObserverError::NoRolloutLoaded)?;
    let as_of = query.as_of.unwrap_or(u64::MAX);
    let text = match query.player {
        Some(player) => render_transcript(log.visible_to(PlayerId(player), as_of)),
        None => render_transcript(
            log.events()
                .iter()
                .take_while(|event| event.seq_number <= as_of),
        ),
    };
    Ok(text)
}
