//! Loop body: timing, sleep compensation and frame skipping

use super::{FrameContext, FrameStats, LoopControl, LoopError, Simulation, StatsSnapshot};
use crate::clock::{Clock, ClockSample, NANOS_PER_SEC, SleepOutcome, nanos_to_duration};
use crate::consts::{MAX_FRAME_SKIP, NO_DELAYS_PER_YIELD};

/// State of one loop run, owned by the loop thread
pub(crate) struct LoopRunner<C: Clock> {
    clock: C,
    control: LoopControl,
    /// Nanoseconds per logical frame
    period: i64,
    stats: FrameStats,
    /// Start of the current frame's timed section
    before: ClockSample,
    /// How far the last sleep overshot (negative: undershot)
    over_sleep: i64,
    /// Frame time owed to the simulation, paid back with skipped renders
    excess: i64,
    /// Consecutive frames that had no time left to sleep
    no_delays: u32,
}

impl<C: Clock> LoopRunner<C> {
    pub(crate) fn new(target_rate: u32, clock: C, control: LoopControl) -> Self {
        let now = clock.now();
        let stats = FrameStats::new(target_rate, now);
        Self {
            period: NANOS_PER_SEC / i64::from(target_rate.max(1)),
            clock,
            control,
            stats,
            before: now,
            over_sleep: 0,
            excess: 0,
            no_delays: 0,
        }
    }

    fn context(&self) -> FrameContext<'_> {
        FrameContext {
            control: &self.control,
            stats: &self.stats,
        }
    }

    /// Drive `simulation` until a stop is requested or a render fails
    pub(crate) fn run<S: Simulation + ?Sized>(
        mut self,
        simulation: &mut S,
    ) -> Result<StatsSnapshot, LoopError> {
        self.control.set_running(true);
        log::info!(
            "Game loop running ({} ns period, {} samples window)",
            self.period,
            self.stats.window()
        );
        simulation.on_start(&self.context());
        self.before = self.clock.now();

        let mut outcome = Ok(());
        while !self.control.is_stop_requested() {
            if let Err(err) = self.iterate(simulation) {
                log::error!("Stopping game loop: {err}");
                self.control.stop();
                outcome = Err(err);
                break;
            }
        }

        self.control.set_running(false);
        let snapshot = self.stats.snapshot();
        self.control.publish(snapshot);
        self.control.finish_off();
        simulation.on_finish(&self.context());
        log::info!("Game loop stopped");

        outcome.map(|()| snapshot)
    }

    /// One update/render pair plus timing, catch-up and stats.
    /// Returns the number of catch-up updates performed.
    pub(crate) fn iterate<S: Simulation + ?Sized>(
        &mut self,
        simulation: &mut S,
    ) -> Result<u32, LoopError> {
        {
            let ctx = self.context();
            simulation.on_update(&ctx);
            simulation.on_render(&ctx)?;
        }

        let after = self.clock.now();
        let elapsed = after - self.before;
        let sleep_time = (self.period - elapsed) - self.over_sleep;

        if sleep_time > 0 {
            self.no_delays = 0;
            self.over_sleep = match self.clock.sleep(nanos_to_duration(sleep_time)) {
                SleepOutcome::Completed => (self.clock.now() - after) - sleep_time,
                SleepOutcome::Interrupted => 0,
            };
        } else {
            self.excess -= sleep_time;
            self.over_sleep = 0;
            self.no_delays += 1;
            if self.no_delays >= NO_DELAYS_PER_YIELD {
                self.clock.yield_now();
                self.no_delays = 0;
            }
        }

        self.before = self.clock.now();

        let mut skips = 0;
        while self.excess > self.period && skips < MAX_FRAME_SKIP {
            self.excess -= self.period;
            simulation.on_update(&self.context());
            skips += 1;
        }

        if self.stats.record_frame(skips, &self.clock) {
            self.control.publish(self.stats.snapshot());
        }
        Ok(skips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::renderer::RenderError;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Simulation whose renders take scripted amounts of virtual time
    struct Scripted {
        clock: ManualClock,
        /// Cost of each render in nanoseconds; `default_cost` once exhausted
        costs: VecDeque<i64>,
        default_cost: i64,
        updates: u64,
        renders: u64,
        fail_on_render: Option<u64>,
        finished: bool,
    }

    impl Scripted {
        fn new(clock: &ManualClock, default_cost: i64) -> Self {
            Self {
                clock: clock.clone(),
                costs: VecDeque::new(),
                default_cost,
                updates: 0,
                renders: 0,
                fail_on_render: None,
                finished: false,
            }
        }
    }

    impl Simulation for Scripted {
        fn on_update(&mut self, _ctx: &FrameContext<'_>) {
            self.updates += 1;
        }

        fn on_render(&mut self, _ctx: &FrameContext<'_>) -> Result<(), RenderError> {
            self.renders += 1;
            if Some(self.renders) == self.fail_on_render {
                return Err(RenderError::SurfaceLost);
            }
            let cost = self.costs.pop_front().unwrap_or(self.default_cost);
            self.clock.advance_nanos(cost);
            Ok(())
        }

        fn on_finish(&mut self, _ctx: &FrameContext<'_>) {
            self.finished = true;
        }
    }

    /// Manual clock that counts yields
    #[derive(Clone)]
    struct YieldCounting {
        inner: ManualClock,
        yields: Arc<AtomicU32>,
    }

    impl Clock for YieldCounting {
        fn now(&self) -> ClockSample {
            self.inner.now()
        }

        fn sleep(&self, duration: Duration) -> SleepOutcome {
            self.inner.sleep(duration)
        }

        fn yield_now(&self) {
            self.yields.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Clock whose sleeps always end early without time passing
    struct Interrupting(ManualClock);

    impl Clock for Interrupting {
        fn now(&self) -> ClockSample {
            self.0.now()
        }

        fn sleep(&self, _duration: Duration) -> SleepOutcome {
            SleepOutcome::Interrupted
        }
    }

    fn runner(rate: u32, clock: &ManualClock) -> LoopRunner<ManualClock> {
        LoopRunner::new(rate, clock.clone(), LoopControl::new())
    }

    #[test]
    fn test_on_time_frames_never_skip() {
        let clock = ManualClock::new();
        let mut runner = runner(60, &clock);
        let period = runner.period;
        let mut sim = Scripted::new(&clock, period);

        for _ in 0..10 {
            assert_eq!(runner.iterate(&mut sim).unwrap(), 0);
        }

        assert_eq!(runner.stats.frame_count(), 10);
        assert_eq!(runner.stats.total_frames_skipped(), 0);
        assert_eq!(sim.updates, 10);
        assert_eq!(sim.renders, 10);
        assert_eq!(runner.excess, 0);
    }

    #[test]
    fn test_short_frames_sleep_off_the_remainder() {
        let clock = ManualClock::new();
        let mut runner = runner(50, &clock);
        let period = runner.period;
        let mut sim = Scripted::new(&clock, period / 4);

        runner.iterate(&mut sim).unwrap();
        assert_eq!(clock.now(), period);
        assert_eq!(runner.over_sleep, 0);
        assert_eq!(runner.excess, 0);

        runner.iterate(&mut sim).unwrap();
        assert_eq!(clock.now(), 2 * period);
    }

    #[test]
    fn test_large_overrun_is_capped_at_max_frame_skip() {
        let clock = ManualClock::new();
        let mut runner = runner(60, &clock);
        let period = runner.period;
        let mut sim = Scripted::new(&clock, period);
        sim.costs.push_back(7 * period);

        // Six periods owed: five are paid back, the rest carries over
        assert_eq!(runner.iterate(&mut sim).unwrap(), MAX_FRAME_SKIP);
        assert_eq!(sim.updates, 1 + u64::from(MAX_FRAME_SKIP));
        assert_eq!(sim.renders, 1);
        assert_eq!(runner.excess, period);
        assert_eq!(runner.stats.total_frames_skipped(), u64::from(MAX_FRAME_SKIP));

        // An on-time frame owes nothing more than the carried period
        assert_eq!(runner.iterate(&mut sim).unwrap(), 0);
    }

    #[test]
    fn test_five_period_frame_pays_back_three_updates() {
        let clock = ManualClock::new();
        let mut runner = runner(60, &clock);
        let period = runner.period;
        let mut sim = Scripted::new(&clock, period);
        sim.costs.push_back(5 * period);

        // Four periods owed; catch-up stops once no more than one remains
        assert_eq!(runner.iterate(&mut sim).unwrap(), 3);
        assert_eq!(sim.updates, 4);
        assert_eq!(sim.renders, 1);
        assert_eq!(runner.excess, period);
        assert_eq!(runner.stats.total_frames_skipped(), 3);
    }

    #[test]
    fn test_moderate_overrun_skips_whole_periods_only() {
        let clock = ManualClock::new();
        let mut runner = runner(60, &clock);
        let period = runner.period;
        let mut sim = Scripted::new(&clock, period);
        // Three and a half periods owed
        sim.costs.push_back(period * 9 / 2);

        assert_eq!(runner.iterate(&mut sim).unwrap(), 3);
        assert_eq!(runner.excess, period * 9 / 2 - 4 * period);
    }

    #[test]
    fn test_yields_every_sixteen_busy_frames() {
        let inner = ManualClock::new();
        let clock = YieldCounting {
            inner: inner.clone(),
            yields: Arc::default(),
        };
        let mut runner = LoopRunner::new(60, clock.clone(), LoopControl::new());
        let period = runner.period;
        let mut sim = Scripted::new(&inner, period);

        for _ in 0..32 {
            runner.iterate(&mut sim).unwrap();
        }
        assert_eq!(clock.yields.load(Ordering::SeqCst), 2);
        assert_eq!(runner.no_delays, 0);
    }

    #[test]
    fn test_interrupted_sleep_counts_as_no_sleep() {
        let inner = ManualClock::new();
        let mut runner = LoopRunner::new(60, Interrupting(inner.clone()), LoopControl::new());
        let mut sim = Scripted::new(&inner, 0);

        assert_eq!(runner.iterate(&mut sim).unwrap(), 0);
        assert_eq!(runner.over_sleep, 0);
        assert_eq!(runner.excess, 0);
    }

    #[test]
    fn test_render_error_stops_loop_and_finishes() {
        let clock = ManualClock::new();
        let runner = runner(60, &clock);
        let control = runner.control.clone();
        let mut sim = Scripted::new(&clock, 0);
        sim.fail_on_render = Some(3);

        let result = runner.run(&mut sim);

        assert!(matches!(result, Err(LoopError::Render(RenderError::SurfaceLost))));
        assert_eq!(sim.renders, 3);
        assert!(sim.finished);
        assert!(control.is_stop_requested());
        assert!(!control.is_running());
        assert!(control.is_finished_off());
    }

    proptest! {
        #[test]
        fn prop_catch_up_never_exceeds_cap(overrun in 0i64..1_000, frames in 1usize..8) {
            let clock = ManualClock::new();
            let mut runner = runner(60, &clock);
            let period = runner.period;
            let mut sim = Scripted::new(&clock, period);
            for _ in 0..frames {
                sim.costs.push_back(period + overrun * period / 3);
            }

            for _ in 0..frames {
                let updates_before = sim.updates;
                let skips = runner.iterate(&mut sim).unwrap();
                prop_assert!(skips <= MAX_FRAME_SKIP);
                prop_assert_eq!(sim.updates - updates_before, 1 + u64::from(skips));
            }
        }
    }
}
