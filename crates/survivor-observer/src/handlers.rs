//! REST handlers for the status page and the rollout repository.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML status page with the stage |
//! | `GET` | `/rollouts/` | Rollout identifiers |
//! | `GET` | `/rollouts/{id}` | One rollout's events |

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use survivor_core::stage::{self, Seat};
use survivor_types::{Event, RenderFrame};

use crate::error::ObserverError;
use crate::state::AppState;

/// Margin around the ring in stage units.
const STAGE_MARGIN: f64 = 1.5;
/// Seat radius in stage units.
const SEAT_RADIUS: f64 = 0.35;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Minimal HTML status page: playback state, the stage, and the rollouts.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frame = state.controller().frame();
    let rollouts = state.bridge().available_rollouts().await;
    let selection = state
        .bridge()
        .current_selection()
        .map_or_else(|| String::from("none"), |s| escape_html(&s.identifier));

    let status = format!("{:?}", frame.status).to_uppercase();
    let step = frame.playback_position().step_label();
    let narrative = escape_html(&frame.narrative_line);
    let progress_pct = frame.progress * 100.0;
    let svg = stage_svg(&frame);
    let rollout_items: String = rollouts
        .iter()
        .map(|id| {
            let id = escape_html(id);
            format!(r#"<li><a href="/rollouts/{id}">{id}</a></li>"#)
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Survivor Replay</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        .narrative {{ font-size: 1.2rem; min-height: 1.5rem; }}
        progress {{ width: 100%; }}
        svg {{ background: #161b22; border: 1px solid #30363d; border-radius: 6px; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Survivor Replay</h1>
    <p class="subtitle">Rollout playback server</p>

    <div>
        <div class="metric">
            <div class="label">Status</div>
            <div class="value">{status}</div>
        </div>
        <div class="metric">
            <div class="label">Step</div>
            <div class="value">{step}</div>
        </div>
        <div class="metric">
            <div class="label">Rollout</div>
            <div class="value">{selection}</div>
        </div>
    </div>

    <p class="narrative">{narrative}</p>
    <progress max="100" value="{progress_pct:.1}"></progress>

    {svg}

    <hr>

    <h2>Rollouts</h2>
    <ul>{rollout_items}</ul>

    <hr>

    <h2>API</h2>
    <ul>
        <li>GET <a href="/api/playback">/api/playback</a></li>
        <li>GET <a href="/api/playback/summary">/api/playback/summary</a></li>
        <li>GET <a href="/api/playback/transcript">/api/playback/transcript</a> (?player=N&amp;as_of=SEQ)</li>
        <li>POST /api/playback/select, play, pause, step-forward, step-backward, seek, speed</li>
        <li>WS /ws/frames</li>
    </ul>
</body>
</html>"#
    ))
}

/// Draw the stage of `frame` as an SVG ring, viewed from above.
fn stage_svg(frame: &RenderFrame) -> String {
    let seats: Vec<Seat> = stage::layout(&frame.participants);
    let extent = stage::ring_radius(seats.len()).max(1.0) + STAGE_MARGIN;
    let size = extent * 2.0;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400" viewBox="{:.2} {:.2} {size:.2} {size:.2}">"#,
        -extent, -extent
    );
    for seat in &seats {
        let _ = write!(
            svg,
            r##"<circle cx="{x:.3}" cy="{z:.3}" r="{SEAT_RADIUS}" fill="{fill}"><title>Player {id}</title></circle><text x="{x:.3}" y="{ty:.3}" font-size="0.3" fill="#c9d1d9" text-anchor="middle">{id}</text>"##,
            x = seat.x,
            z = seat.z,
            ty = seat.z + SEAT_RADIUS * 2.0,
            fill = seat.color.hex(),
            id = seat.id,
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Escape text for inclusion in HTML.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// GET /rollouts/
// ---------------------------------------------------------------------------

/// List rollout identifiers from the repository.
///
/// Unlike the bridge's listing, failures surface as `502` so remote
/// clients can tell an empty repository from an unreachable one.
pub async fn list_rollouts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ObserverError> {
    Ok(Json(state.repository().list().await?))
}

// ---------------------------------------------------------------------------
// GET /rollouts/{id}
// ---------------------------------------------------------------------------

/// Return one rollout's events as a JSON array.
pub async fn get_rollout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Event>>, ObserverError> {
    let log = state.repository().fetch(&id).await?;
    Ok(Json(log.events().to_vec()))
}

#[cfg(test)]
mod tests {
    use survivor_types::{Participant, PlaybackStatus, PlayerId};

    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"hi" & 'bye'</b>"#),
            "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn svg_draws_one_circle_per_participant() {
        let frame = RenderFrame {
            participants: vec![
                Participant::active(PlayerId(1)),
                Participant {
                    id: PlayerId(2),
                    eliminated: true,
                },
            ],
            narrative_line: String::new(),
            position: Some(0),
            total: 1,
            status: PlaybackStatus::Paused,
            progress: 1.0,
        };
        let svg = stage_svg(&frame);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("#00ffff"));
        assert!(svg.contains("#ff0000"));
    }

    #[test]
    fn empty_stage_is_still_valid_svg() {
        let svg = stage_svg(&RenderFrame::idle());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }
}
