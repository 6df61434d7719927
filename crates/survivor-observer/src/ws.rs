//! `WebSocket` handler for live render frames.
//!
//! Clients connect to `GET /ws/frames` and receive the current
//! [`RenderFrame`] as JSON right away, then one message per change. The
//! frames come from a [`watch`] channel, so a slow client skips straight
//! to the newest frame instead of queueing stale ones.
//!
//! [`RenderFrame`]: survivor_types::RenderFrame
//! [`watch`]: tokio::sync::watch

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use survivor_types::RenderFrame;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming frames.
///
/// # Route
///
/// `GET /ws/frames`
pub async fn ws_frames(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Send one frame. Returns `false` once the client is gone.
async fn send_frame(sink: &mut SplitSink<WebSocket, Message>, frame: &RenderFrame) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize render frame: {e}");
            return true;
        }
    };
    if sink.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket client disconnected (send failed)");
        return false;
    }
    true
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut frames = state.controller().subscribe();
    let (mut sink, mut stream) = socket.split();

    let initial = frames.borrow_and_update().clone();
    if !send_frame(&mut sink, &initial).await {
        return;
    }

    loop {
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    debug!("Playback controller dropped, closing WebSocket");
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
                let frame = frames.borrow_and_update().clone();
                if !send_frame(&mut sink, &frame).await {
                    return;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Clients have nothing to say on this channel.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
