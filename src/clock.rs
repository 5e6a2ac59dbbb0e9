//! Time sources for the game loop
//!
//! Timestamps are monotonic nanoseconds. The loop only talks to the [`Clock`]
//! trait, so a [`ManualClock`] can replace wall time for deterministic runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic timestamp in nanoseconds
pub type ClockSample = i64;

pub const MILLIS_PER_SEC: i64 = 1_000;
pub const MICROS_PER_SEC: i64 = MILLIS_PER_SEC * 1_000;
pub const NANOS_PER_SEC: i64 = MICROS_PER_SEC * 1_000;

#[inline]
pub fn secs_to_millis(secs: i64) -> i64 {
    secs * MILLIS_PER_SEC
}

#[inline]
pub fn millis_to_secs(millis: i64) -> i64 {
    millis / MILLIS_PER_SEC
}

#[inline]
pub fn millis_to_nanos(millis: i64) -> i64 {
    millis * MICROS_PER_SEC
}

#[inline]
pub fn nanos_to_millis(nanos: i64) -> i64 {
    nanos / MICROS_PER_SEC
}

/// Convert a (positive) nanosecond span into a `Duration`
#[inline]
pub fn nanos_to_duration(nanos: i64) -> Duration {
    Duration::from_nanos(nanos.max(0) as u64)
}

/// How a sleep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// Slept at least the requested time
    Completed,
    /// Woken early (stop request or spurious wakeup)
    Interrupted,
}

/// A monotonic time source the game loop can sleep against
pub trait Clock: Send + 'static {
    /// Current time in nanoseconds since an arbitrary fixed origin
    fn now(&self) -> ClockSample;

    /// Block the calling thread for roughly `duration`
    fn sleep(&self, duration: Duration) -> SleepOutcome;

    /// Give other threads a chance to run
    fn yield_now(&self) {
        thread::yield_now();
    }
}

/// Wall-clock time backed by `Instant`
///
/// Sleeps park the thread, so an `unpark` (sent by `LoopControl::stop`)
/// wakes the loop early.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> ClockSample {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    fn sleep(&self, duration: Duration) -> SleepOutcome {
        let start = Instant::now();
        thread::park_timeout(duration);
        if start.elapsed() >= duration {
            SleepOutcome::Completed
        } else {
            SleepOutcome::Interrupted
        }
    }
}

/// Virtual clock that only moves when told to
///
/// Sleeping advances the clock by exactly the requested amount and returns
/// immediately, which makes loop timing fully reproducible.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        self.advance_nanos(nanos);
    }

    pub fn advance_nanos(&self, nanos: i64) {
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, sample: ClockSample) {
        self.now.store(sample, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> ClockSample {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) -> SleepOutcome {
        self.advance(duration);
        SleepOutcome::Completed
    }

    fn yield_now(&self) {}
}
