//! Render surfaces and the frame pump that feeds them.
//!
//! A surface only ever sees finished [`RenderFrame`]s. It has no access to
//! the log or the controller and cannot influence playback.

use survivor_types::RenderFrame;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Errors a render surface can report.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing to the output failed.
    #[error("render output failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The surface cannot accept more frames.
    #[error("render surface closed: {0}")]
    Closed(String),
}

/// Something that draws frames.
///
/// Each call replaces whatever the surface showed before.
pub trait RenderSurface: Send {
    /// Draw one frame.
    fn render(&mut self, frame: &RenderFrame) -> Result<(), RenderError>;
}

/// A surface that discards every frame.
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn render(&mut self, _frame: &RenderFrame) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Feed frames from `frames` into `surface` until the controller goes away
/// or the surface fails.
///
/// The current frame is drawn immediately. Frames published faster than
/// the surface draws are coalesced to the latest one. A surface error is
/// logged and ends this pump only; playback is unaffected.
pub fn spawn_render_loop<S>(mut frames: watch::Receiver<RenderFrame>, mut surface: S) -> JoinHandle<()>
where
    S: RenderSurface + 'static,
{
    tokio::spawn(async move {
        loop {
            let frame = frames.borrow_and_update().clone();
            if let Err(e) = surface.render(&frame) {
                error!(error = %e, "render surface failed, stopping frame pump");
                return;
            }
            if frames.changed().await.is_err() {
                debug!("frame source closed, stopping frame pump");
                return;
            }
        }
    })
}
