//! Timeline playback: the position pointer and the clock that advances it.
//!
//! A [`PlaybackController`] owns the loaded [`EventLog`], the current
//! position, and at most one running timer. All operations are synchronous
//! and take a short lock, so they can be called from Axum handlers, the
//! selection bridge, or tests alike.
//!
//! # Timer
//!
//! Playing spawns a Tokio task driving [`tokio::time::interval`]. Each
//! timer is tagged with a generation number and the controller remembers
//! the generation of the one it considers active. Any transition that
//! stops or restarts the clock aborts the old task and clears or replaces
//! that generation, so a tick already in flight from a superseded timer
//! finds a mismatch and is dropped. The task holds only a [`Weak`]
//! reference to the controller's state and exits once the controller is
//! gone.
//!
//! # Frames
//!
//! Every visible state change publishes a fresh [`RenderFrame`] on a
//! [`watch`] channel. Frames are full replacements; subscribers never need
//! to reconcile partial updates.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use survivor_types::{EventLog, PlaybackPosition, PlaybackStatus, RenderFrame};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::PlaybackConfig;
use crate::reducer::derive_state;

/// Floor applied to configured periods; a zero-length interval is invalid.
const SHORTEST_PERIOD: Duration = Duration::from_millis(1);

/// Errors raised by playback operations.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The requested tick interval is below the configured minimum.
    #[error("tick interval {requested:?} is below the minimum of {minimum:?}")]
    IntervalTooShort {
        /// Interval that was asked for.
        requested: Duration,
        /// Smallest interval the controller accepts.
        minimum: Duration,
    },

    /// The controller was created outside a Tokio runtime.
    #[error("playback requires a Tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Identifies the timer the controller currently trusts.
#[derive(Debug)]
struct ActiveTimer {
    generation: u64,
    handle: AbortHandle,
}

#[derive(Debug)]
struct Inner {
    log: Option<Arc<EventLog>>,
    position: Option<usize>,
    status: PlaybackStatus,
    period: Duration,
    min_period: Duration,
    timer: Option<ActiveTimer>,
    next_generation: u64,
}

impl Inner {
    fn last_index(&self) -> Option<usize> {
        self.log.as_ref().and_then(|log| log.last_index())
    }

    fn at_end(&self) -> bool {
        self.position.is_some() && self.position == self.last_index()
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
            debug!(generation = timer.generation, "playback timer stopped");
        }
    }

    /// Stop the clock and leave a loaded log paused.
    fn halt(&mut self) {
        self.stop_timer();
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
        }
    }

    fn frame(&self) -> RenderFrame {
        match (&self.log, self.position) {
            (Some(log), Some(position)) => RenderFrame::from_snapshot(
                derive_state(log, position),
                PlaybackPosition {
                    current: Some(position),
                    total: log.len(),
                },
                self.status,
            ),
            _ => RenderFrame::idle(),
        }
    }
}

#[derive(Debug)]
struct Shared {
    runtime: Handle,
    inner: Mutex<Inner>,
    frames: watch::Sender<RenderFrame>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner holds no invariants a panicking holder could break halfway.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        let frame = inner.frame();
        self.frames.send_if_modified(|current| {
            if *current == frame {
                false
            } else {
                *current = frame;
                true
            }
        });
    }

    fn start_timer(self: &Arc<Self>, inner: &mut Inner) {
        inner.stop_timer();
        let generation = inner.next_generation;
        inner.next_generation = generation.wrapping_add(1);
        let period = inner.period;
        let task = self
            .runtime
            .spawn(run_timer(Arc::downgrade(self), generation, period));
        inner.timer = Some(ActiveTimer {
            generation,
            handle: task.abort_handle(),
        });
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        debug!(generation, period_ms, "playback timer started");
    }

    /// Handle one timer tick. Returns `false` when the timer should exit.
    fn on_tick(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        if inner.timer.as_ref().map(|t| t.generation) != Some(generation) {
            return false;
        }
        let (Some(position), Some(last)) = (inner.position, inner.last_index()) else {
            inner.timer = None;
            return false;
        };
        if position >= last {
            // This task is the one exiting, so there is nothing to abort.
            inner.timer = None;
            inner.status = PlaybackStatus::Paused;
            self.publish(&inner);
            info!(position, "playback reached end of log");
            return false;
        }
        inner.position = Some(position.saturating_add(1));
        self.publish(&inner);
        true
    }
}

async fn run_timer(shared: Weak<Shared>, generation: u64, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.on_tick(generation) {
            break;
        }
    }
}

/// Drives playback of one event log.
///
/// Share it as `Arc<PlaybackController>`; dropping the last handle aborts
/// any running timer.
#[derive(Debug)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

impl PlaybackController {
    /// Create an idle controller on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::NoRuntime`] when called outside a runtime.
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        Ok(Self::with_runtime(Handle::try_current()?, config))
    }

    /// Create an idle controller whose timers run on `runtime`.
    pub fn with_runtime(runtime: Handle, config: &PlaybackConfig) -> Self {
        let min_period = config.min_tick_interval().max(SHORTEST_PERIOD);
        let period = config.tick_interval().max(min_period);
        let (frames, _) = watch::channel(RenderFrame::idle());
        Self {
            shared: Arc::new(Shared {
                runtime,
                inner: Mutex::new(Inner {
                    log: None,
                    position: None,
                    status: PlaybackStatus::Idle,
                    period,
                    min_period,
                    timer: None,
                    next_generation: 0,
                }),
                frames,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Replace the loaded log, stopping any running clock.
    ///
    /// A non-empty log starts paused at position 0; an empty log leaves
    /// the controller idle.
    pub fn load(&self, log: Arc<EventLog>) {
        let mut inner = self.shared.lock();
        inner.stop_timer();
        if log.is_empty() {
            inner.log = None;
            inner.position = None;
            inner.status = PlaybackStatus::Idle;
        } else {
            inner.position = Some(0);
            inner.status = PlaybackStatus::Paused;
            inner.log = Some(log);
        }
        self.shared.publish(&inner);
    }

    /// Drop the loaded log and return to idle.
    pub fn unload(&self) {
        let mut inner = self.shared.lock();
        inner.stop_timer();
        inner.log = None;
        inner.position = None;
        inner.status = PlaybackStatus::Idle;
        self.shared.publish(&inner);
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Start the clock. Only acts when paused before the last event.
    pub fn play(&self) {
        let mut inner = self.shared.lock();
        if inner.status != PlaybackStatus::Paused || inner.at_end() {
            return;
        }
        inner.status = PlaybackStatus::Playing;
        self.shared.start_timer(&mut inner);
        self.shared.publish(&inner);
    }

    /// Stop the clock. Idempotent; does nothing while idle.
    pub fn pause(&self) {
        let mut inner = self.shared.lock();
        inner.halt();
        self.shared.publish(&inner);
    }

    /// Stop the clock and move one event forward, clamped to the end.
    pub fn step_forward(&self) {
        self.step_to(|position, last| position.saturating_add(1).min(last));
    }

    /// Stop the clock and move one event back, clamped to the start.
    pub fn step_backward(&self) {
        self.step_to(|position, _| position.saturating_sub(1));
    }

    /// Stop the clock and jump to `index`, clamped to the last event.
    pub fn seek(&self, index: usize) {
        self.step_to(|_, last| index.min(last));
    }

    fn step_to(&self, target: impl FnOnce(usize, usize) -> usize) {
        let mut inner = self.shared.lock();
        let (Some(position), Some(last)) = (inner.position, inner.last_index()) else {
            return;
        };
        inner.halt();
        inner.position = Some(target(position, last));
        self.shared.publish(&inner);
    }

    // -----------------------------------------------------------------------
    // Speed
    // -----------------------------------------------------------------------

    /// Current period between automatic steps.
    pub fn tick_interval(&self) -> Duration {
        self.shared.lock().period
    }

    /// Smallest period [`set_tick_interval`](Self::set_tick_interval) accepts.
    pub fn min_tick_interval(&self) -> Duration {
        self.shared.lock().min_period
    }

    /// Change the period between automatic steps, restarting a running
    /// clock at the new rate.
    ///
    /// Returns the previous period.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::IntervalTooShort`] when `period` is below
    /// the configured minimum; the current period is kept.
    pub fn set_tick_interval(&self, period: Duration) -> Result<Duration, PlaybackError> {
        let mut inner = self.shared.lock();
        if period < inner.min_period {
            return Err(PlaybackError::IntervalTooShort {
                requested: period,
                minimum: inner.min_period,
            });
        }
        let previous = std::mem::replace(&mut inner.period, period);
        if inner.status == PlaybackStatus::Playing {
            self.shared.start_timer(&mut inner);
        }
        Ok(previous)
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn status(&self) -> PlaybackStatus {
        self.shared.lock().status
    }

    /// Current position and total.
    pub fn position(&self) -> PlaybackPosition {
        let inner = self.shared.lock();
        PlaybackPosition {
            current: inner.position,
            total: inner.log.as_ref().map_or(0, |log| log.len()),
        }
    }

    /// The loaded log, if any.
    pub fn log(&self) -> Option<Arc<EventLog>> {
        self.shared.lock().log.clone()
    }

    /// The most recently published frame.
    pub fn frame(&self) -> RenderFrame {
        self.shared.frames.borrow().clone()
    }

    /// Receive every frame published from now on.
    pub fn subscribe(&self) -> watch::Receiver<RenderFrame> {
        self.shared.frames.subscribe()
    }

    /// Whether a timer task is currently considered active.
    pub fn has_active_timer(&self) -> bool {
        self.shared.lock().timer.is_some()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shared.lock().stop_timer();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::float_cmp
)]
mod tests {
    use survivor_types::{Event, EventKind, PlayerId, RoundEntryParams, StatementParams};
    use tokio::time::sleep;

    use super::*;

    const PERIOD: Duration = Duration::from_millis(1000);

    fn config() -> PlaybackConfig {
        PlaybackConfig::default()
    }

    fn log_of(len: u64) -> Arc<EventLog> {
        let mut events = vec![Event::new(
            0,
            EventKind::EnterNormalRound(RoundEntryParams {
                player_ids_in_round: vec![PlayerId(1), PlayerId(2)],
            }),
        )];
        events.extend((1..len).map(|seq| {
            Event::new(
                seq,
                EventKind::PublicStatement(StatementParams {
                    speaking_player_id: PlayerId(1),
                    statement: format!("line {seq}"),
                }),
            )
        }));
        Arc::new(EventLog::new(events).unwrap())
    }

    /// Sleep `n` full periods plus half a period so tick boundaries are
    /// never ambiguous.
    async fn periods(n: u32) {
        sleep(PERIOD * n + PERIOD / 2).await;
    }

    fn current(controller: &PlaybackController) -> Option<usize> {
        controller.position().current
    }

    #[tokio::test]
    async fn starts_idle() {
        let controller = PlaybackController::new(&config()).unwrap();
        assert_eq!(controller.status(), PlaybackStatus::Idle);
        assert_eq!(controller.position(), PlaybackPosition::default());
        assert_eq!(controller.frame(), RenderFrame::idle());
    }

    #[test]
    fn new_outside_runtime_is_an_error() {
        let result = PlaybackController::new(&config());
        assert!(matches!(result, Err(PlaybackError::NoRuntime(_))));
    }

    #[tokio::test]
    async fn load_pauses_at_start() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(5));
        assert_eq!(controller.status(), PlaybackStatus::Paused);
        assert_eq!(
            controller.position(),
            PlaybackPosition {
                current: Some(0),
                total: 5
            }
        );
        assert_eq!(controller.frame().participants.len(), 2);
    }

    #[tokio::test]
    async fn empty_log_loads_as_idle() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(Arc::new(EventLog::default()));
        assert_eq!(controller.status(), PlaybackStatus::Idle);
        assert_eq!(current(&controller), None);
        controller.play();
        assert_eq!(controller.status(), PlaybackStatus::Idle);
        assert!(!controller.has_active_timer());
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let controller = PlaybackController::new(&config()).unwrap();
        let log = log_of(4);
        controller.load(Arc::clone(&log));
        let first = controller.frame();
        controller.load(log);
        assert_eq!(controller.frame(), first);
        assert_eq!(controller.status(), PlaybackStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn load_while_playing_stops_the_clock() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(10));
        controller.play();
        periods(2).await;
        assert_eq!(current(&controller), Some(2));

        controller.load(log_of(10));
        assert_eq!(controller.status(), PlaybackStatus::Paused);
        assert!(!controller.has_active_timer());
        periods(3).await;
        assert_eq!(current(&controller), Some(0));
    }

    #[tokio::test]
    async fn unload_returns_to_idle() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(3));
        controller.play();
        controller.unload();
        assert_eq!(controller.status(), PlaybackStatus::Idle);
        assert!(!controller.has_active_timer());
        assert!(controller.log().is_none());
        assert_eq!(controller.frame(), RenderFrame::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn play_advances_once_per_period() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(10));
        controller.play();
        assert_eq!(controller.status(), PlaybackStatus::Playing);
        periods(4).await;
        assert_eq!(current(&controller), Some(4));
        assert_eq!(controller.status(), PlaybackStatus::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn at_most_one_timer() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(20));
        controller.play();
        controller.pause();
        controller.play();
        controller.step_forward();
        controller.play();
        controller.play();
        assert_eq!(current(&controller), Some(1));

        periods(5).await;
        assert_eq!(current(&controller), Some(6));
    }

    #[tokio::test(start_paused = true)]
    async fn autopauses_at_end_of_log() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(3));
        controller.play();
        periods(3).await;
        assert_eq!(current(&controller), Some(2));
        assert_eq!(controller.status(), PlaybackStatus::Paused);
        assert!(!controller.has_active_timer());

        periods(1).await;
        assert_eq!(current(&controller), Some(2));
    }

    #[tokio::test]
    async fn play_at_last_index_is_a_no_op() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(3));
        controller.seek(2);
        controller.play();
        assert_eq!(controller.status(), PlaybackStatus::Paused);
        assert!(!controller.has_active_timer());
    }

    #[tokio::test]
    async fn stepping_clamps_at_both_ends() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(3));
        controller.step_backward();
        assert_eq!(current(&controller), Some(0));

        controller.step_forward();
        controller.step_forward();
        controller.step_forward();
        assert_eq!(current(&controller), Some(2));
        assert_eq!(controller.status(), PlaybackStatus::Paused);
        assert!(!controller.has_active_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn stepping_while_playing_pauses() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(10));
        controller.play();
        periods(2).await;
        controller.step_backward();
        assert_eq!(current(&controller), Some(1));
        assert_eq!(controller.status(), PlaybackStatus::Paused);

        periods(3).await;
        assert_eq!(current(&controller), Some(1));
    }

    #[tokio::test]
    async fn transport_on_idle_is_a_no_op() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.play();
        controller.pause();
        controller.step_forward();
        controller.step_backward();
        controller.seek(3);
        assert_eq!(controller.status(), PlaybackStatus::Idle);
        assert_eq!(current(&controller), None);
    }

    #[tokio::test]
    async fn pause_is_idempotent() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(3));
        controller.play();
        controller.pause();
        controller.pause();
        assert_eq!(controller.status(), PlaybackStatus::Paused);
        assert_eq!(current(&controller), Some(0));
    }

    #[tokio::test]
    async fn seek_clamps_to_last_event() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(5));
        controller.seek(3);
        assert_eq!(current(&controller), Some(3));
        controller.seek(99);
        assert_eq!(current(&controller), Some(4));
        assert_eq!(controller.frame().progress, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_keeps_a_single_timer() {
        let controller = PlaybackController::new(&config()).unwrap();
        controller.load(log_of(30));
        controller.play();
        let previous = controller.set_tick_interval(PERIOD * 2).unwrap();
        assert_eq!(previous, PERIOD);
        assert_eq!(controller.tick_interval(), PERIOD * 2);

        // Two slow periods: exactly two steps.
        sleep(PERIOD * 4 + PERIOD / 2).await;
        assert_eq!(current(&controller), Some(2));
        assert_eq!(controller.status(), PlaybackStatus::Playing);
    }

    #[tokio::test]
    async fn rejects_interval_below_minimum() {
        let controller = PlaybackController::new(&config()).unwrap();
        let err = controller
            .set_tick_interval(Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, PlaybackError::IntervalTooShort { .. }));
        assert_eq!(controller.tick_interval(), PERIOD);
        assert_eq!(controller.min_tick_interval(), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn zero_minimum_is_floored() {
        let config = PlaybackConfig {
            tick_interval_ms: 0,
            min_tick_interval_ms: 0,
            ..PlaybackConfig::default()
        };
        let controller = PlaybackController::new(&config).unwrap();
        assert_eq!(controller.tick_interval(), SHORTEST_PERIOD);
        assert!(controller.set_tick_interval(Duration::ZERO).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_published_on_change() {
        let controller = PlaybackController::new(&config()).unwrap();
        let mut frames = controller.subscribe();
        controller.load(log_of(3));
        assert!(frames.has_changed().unwrap());
        let frame = frames.borrow_and_update().clone();
        assert_eq!(frame.position, Some(0));
        assert_eq!(frame.status, PlaybackStatus::Paused);

        controller.play();
        frames.changed().await.unwrap();
        assert_eq!(frames.borrow_and_update().status, PlaybackStatus::Playing);

        frames.changed().await.unwrap();
        let frame = frames.borrow_and_update().clone();
        assert_eq!(frame.position, Some(1));
        assert_eq!(frame.narrative_line, "1: \"line 1\"");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_controller_stops_its_timer() {
        let controller = PlaybackController::new(&config()).unwrap();
        let mut frames = controller.subscribe();
        controller.load(log_of(10));
        controller.play();
        periods(1).await;
        assert_eq!(frames.borrow_and_update().position, Some(1));

        drop(controller);
        periods(3).await;
        // The sender went away with the controller; no further frames.
        assert!(frames.has_changed().is_err());
        assert_eq!(frames.borrow().position, Some(1));
    }
}
