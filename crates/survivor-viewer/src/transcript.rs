//! A render surface that prints frames as transcript lines.
//!
//! Each line shows the step counter, the controller status, the roster
//! (eliminated players in brackets), and the narrative line. Frames that
//! would print the same line as the previous one are skipped, so a
//! play/pause toggle on the same step prints once per status.

use std::fmt::Write as _;
use std::io::Write;

use survivor_core::render::{RenderError, RenderSurface};
use survivor_types::{PlaybackStatus, RenderFrame};

/// Writes one line per distinct frame to `W`.
pub struct TranscriptSurface<W> {
    out: W,
    last_line: Option<String>,
}

impl<W: Write + Send> TranscriptSurface<W> {
    /// Print frames to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            last_line: None,
        }
    }

    /// Consume the surface and return its writer.
    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Format one frame as a transcript line.
fn format_frame(frame: &RenderFrame) -> String {
    if frame.status == PlaybackStatus::Idle && frame.total == 0 {
        return String::from("[--/--] idle      no rollout loaded");
    }

    let mut roster = String::new();
    for (i, participant) in frame.participants.iter().enumerate() {
        if i > 0 {
            roster.push(' ');
        }
        if participant.eliminated {
            let _ = write!(roster, "[{}]", participant.id);
        } else {
            let _ = write!(roster, "{}", participant.id);
        }
    }

    let status = match frame.status {
        PlaybackStatus::Idle => "idle",
        PlaybackStatus::Paused => "paused",
        PlaybackStatus::Playing => "playing",
    };

    format!(
        "[{}] {status:<9} {roster} | {}",
        frame.playback_position().step_label(),
        frame.narrative_line
    )
}

impl<W: Write + Send> RenderSurface for TranscriptSurface<W> {
    fn render(&mut self, frame: &RenderFrame) -> Result<(), RenderError> {
        let line = format_frame(frame);
        if self.last_line.as_ref() == Some(&line) {
            return Ok(());
        }
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        self.last_line = Some(line);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use survivor_types::{Participant, PlayerId};

    use super::*;

    fn frame(position: usize, status: PlaybackStatus) -> RenderFrame {
        RenderFrame {
            participants: vec![
                Participant::active(PlayerId(1)),
                Participant {
                    id: PlayerId(2),
                    eliminated: true,
                },
            ],
            narrative_line: String::from("Player 2 eliminated"),
            position: Some(position),
            total: 4,
            status,
            progress: 0.5,
        }
    }

    #[test]
    fn line_shows_step_status_roster_and_narrative() {
        assert_eq!(
            format_frame(&frame(1, PlaybackStatus::Paused)),
            "[2 / 4] paused    1 [2] | Player 2 eliminated"
        );
    }

    #[test]
    fn idle_frame_has_its_own_line() {
        assert_eq!(
            format_frame(&RenderFrame::idle()),
            "[--/--] idle      no rollout loaded"
        );
    }

    #[test]
    fn repeated_frames_print_once() {
        let mut surface = TranscriptSurface::new(Vec::new());
        surface.render(&frame(1, PlaybackStatus::Paused)).unwrap();
        surface.render(&frame(1, PlaybackStatus::Paused)).unwrap();
        surface.render(&frame(1, PlaybackStatus::Playing)).unwrap();
        surface.render(&frame(2, PlaybackStatus::Playing)).unwrap();

        let text = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().last().unwrap().starts_with("[3 / 4] playing"));
    }

    #[test]
    fn write_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut surface = TranscriptSurface::new(Broken);
        let err = surface.render(&RenderFrame::idle()).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
