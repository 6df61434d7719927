//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin front ends.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::playback;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- HTML status page with the stage drawn as SVG
/// - `GET /rollouts/` -- rollout identifiers
/// - `GET /rollouts/{id}` -- one rollout's event log
/// - `GET /api/playback` -- current frame, speed, and selection
/// - `POST /api/playback/{select,play,pause,step-forward,step-backward,seek,speed}`
/// - `GET /api/playback/summary` -- summary of the loaded rollout
/// - `GET /api/playback/transcript` -- text transcript
/// - `GET /ws/frames` -- `WebSocket` render frame stream
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Repository passthrough
        .route("/rollouts/", get(handlers::list_rollouts))
        .route("/rollouts/{id}", get(handlers::get_rollout))
        // Playback control
        .route("/api/playback", get(playback::status))
        .route("/api/playback/select", post(playback::select))
        .route("/api/playback/play", post(playback::play))
        .route("/api/playback/pause", post(playback::pause))
        .route("/api/playback/step-forward", post(playback::step_forward))
        .route("/api/playback/step-backward", post(playback::step_backward))
        .route("/api/playback/seek", post(playback::seek))
        .route("/api/playback/speed", post(playback::set_speed))
        .route("/api/playback/summary", get(playback::summary))
        .route("/api/playback/transcript", get(playback::transcript))
        // WebSocket
        .route("/ws/frames", get(ws::ws_frames))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
