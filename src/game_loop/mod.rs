//! Fixed-rate game loop
//!
//! A [`GameLoop`] runs a [`Simulation`] on its own thread at a fixed number of
//! updates per second. Each iteration performs one update and one render, then
//! sleeps off whatever remains of the frame period. When frames run long, the
//! accumulated deficit is paid back with extra updates that skip rendering, at
//! most `MAX_FRAME_SKIP` per iteration, so game speed stays constant while the
//! frame rate drops.
//!
//! Cross-thread signals (stop, pause) are plain atomic flags in
//! [`LoopControl`]; the loop observes them at the top of each iteration.

mod runner;
pub mod stats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle, Thread};
use std::time::Duration;

use thiserror::Error;

use crate::clock::{Clock, MonotonicClock, NANOS_PER_SEC};
use crate::renderer::RenderError;

pub(crate) use runner::LoopRunner;
pub use stats::{FrameStats, StatsSnapshot};

/// Errors that end (or prevent) a loop run
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("target rate must be positive, got {0}")]
    InvalidRate(u32),

    #[error("failed to spawn loop thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Rendering failed; the loop stopped instead of drawing further frames
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("loop thread panicked")]
    Panicked,

    #[error("loop was never started")]
    NotStarted,

    #[error("loop already started")]
    AlreadyStarted,
}

/// Per-callback view of the loop handed to the simulation
pub struct FrameContext<'a> {
    pub control: &'a LoopControl,
    pub stats: &'a FrameStats,
}

/// The four lifecycle hooks the loop drives
///
/// Pausing is the simulation's business: the loop keeps calling `on_update`
/// and `on_render` while paused, and the simulation checks
/// `ctx.control.is_paused()` itself.
pub trait Simulation {
    fn on_start(&mut self, _ctx: &FrameContext<'_>) {}

    fn on_update(&mut self, ctx: &FrameContext<'_>);

    /// Draw and present one frame. An error stops the loop.
    fn on_render(&mut self, ctx: &FrameContext<'_>) -> Result<(), RenderError>;

    fn on_finish(&mut self, _ctx: &FrameContext<'_>) {}
}

#[derive(Debug, Default)]
struct ControlState {
    running: AtomicBool,
    stop_requested: AtomicBool,
    paused: AtomicBool,
    finished_off: AtomicBool,
    loop_thread: OnceLock<Thread>,
    /// Stats as of the last per-second sample
    latest: Mutex<StatsSnapshot>,
}

/// Cloneable handle for steering a running loop from any thread
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    state: Arc<ControlState>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to exit at its next iteration. Never blocks.
    ///
    /// Hosts map platform shutdown notifications onto this call. A stop issued
    /// before `start` is kept, so the loop exits right after starting.
    pub fn stop(&self) {
        self.state.stop_requested.store(true, Ordering::SeqCst);
        if let Some(thread) = self.state.loop_thread.get() {
            thread.unpark();
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.stop_requested.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.state.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.state.paused.store(false, Ordering::SeqCst);
    }

    pub fn toggle_pause(&self) {
        self.state.paused.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    /// Most recently published statistics
    pub fn snapshot(&self) -> StatsSnapshot {
        *self
            .state
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn time_spent_secs(&self) -> u64 {
        self.snapshot().time_spent_secs
    }

    /// Emit the session summary. Only the first call does anything; returns
    /// whether this call was the one that emitted it.
    pub fn finish_off(&self) -> bool {
        if self.state.finished_off.swap(true, Ordering::SeqCst) {
            return false;
        }
        for line in self.snapshot().summary().lines() {
            log::info!("{line}");
        }
        true
    }

    pub fn is_finished_off(&self) -> bool {
        self.state.finished_off.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.state.running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn register_loop_thread(&self, thread: Thread) {
        let _ = self.state.loop_thread.set(thread);
    }

    pub(crate) fn publish(&self, snapshot: StatsSnapshot) {
        *self
            .state
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

type LoopResult = Result<StatsSnapshot, LoopError>;

/// Owner of a simulation and the thread that drives it
pub struct GameLoop<S, C = MonotonicClock> {
    target_rate: u32,
    control: LoopControl,
    /// Simulation and clock until the loop takes them over
    pending: Option<(S, C)>,
    worker: Option<JoinHandle<LoopResult>>,
}

impl<S: Simulation> GameLoop<S, MonotonicClock> {
    /// Create a loop running `simulation` at `target_rate` updates per second
    pub fn new(target_rate: u32, simulation: S) -> Result<Self, LoopError> {
        Self::with_clock(target_rate, simulation, MonotonicClock::new())
    }
}

impl<S: Simulation, C: Clock> GameLoop<S, C> {
    pub fn with_clock(target_rate: u32, simulation: S, clock: C) -> Result<Self, LoopError> {
        if target_rate == 0 {
            return Err(LoopError::InvalidRate(target_rate));
        }
        Ok(Self {
            target_rate,
            control: LoopControl::new(),
            pending: Some((simulation, clock)),
            worker: None,
        })
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Length of one logical frame
    pub fn period(&self) -> Duration {
        Duration::from_nanos((NANOS_PER_SEC / i64::from(self.target_rate)) as u64)
    }

    pub fn control(&self) -> LoopControl {
        self.control.clone()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn toggle_pause(&self) {
        self.control.toggle_pause();
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Run the loop on the calling thread until it is stopped
    pub fn run_blocking(mut self) -> LoopResult {
        let (mut simulation, clock) = self.pending.take().ok_or(LoopError::AlreadyStarted)?;
        self.control.register_loop_thread(thread::current());
        LoopRunner::new(self.target_rate, clock, self.control.clone()).run(&mut simulation)
    }
}

impl<S: Simulation + Send + 'static, C: Clock> GameLoop<S, C> {
    /// Spawn the loop thread and return immediately. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<(), LoopError> {
        if self.worker.is_some() || self.control.is_running() {
            log::debug!("Game loop already started");
            return Ok(());
        }
        let Some((mut simulation, clock)) = self.pending.take() else {
            return Ok(());
        };

        let control = self.control.clone();
        let target_rate = self.target_rate;
        let handle = thread::Builder::new()
            .name("game-loop".into())
            .spawn(move || {
                control.register_loop_thread(thread::current());
                LoopRunner::new(target_rate, clock, control).run(&mut simulation)
            })
            .map_err(LoopError::Spawn)?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Wait for the loop thread to exit and return how the run ended
    pub fn join(&mut self) -> LoopResult {
        let handle = self.worker.take().ok_or(LoopError::NotStarted)?;
        handle.join().map_err(|_| LoopError::Panicked)?
    }
}

impl<S, C> Drop for GameLoop<S, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.control.stop();
            let _ = handle.join();
        }
    }
}
