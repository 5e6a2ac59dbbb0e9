//! Frame statistics
//!
//! Once per simulated second the aggregator samples the effective frames per
//! second (renders) and updates per second (renders + skipped frames) and keeps
//! a rolling window of the last `N` samples, where `N` is the target rate.
//!
//! A frame skip is an update without a matching render. The interval between
//! samples is measured in *simulated* time (one period per loop iteration), so
//! sampling cadence is independent of how long individual frames really took.

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, ClockSample, NANOS_PER_SEC};

/// Read-only view of the statistics at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Loop iterations (update + render pairs) so far
    pub frame_count: u64,
    /// Catch-up updates that had no render
    pub total_frames_skipped: u64,
    pub average_fps: f64,
    pub average_ups: f64,
    /// Whole seconds since the loop started, as of the last sample
    pub time_spent_secs: u64,
}

impl StatsSnapshot {
    pub fn frame_count_label(&self) -> String {
        format!("Frame Count {}", self.frame_count)
    }

    pub fn average_label(&self) -> String {
        format!(
            "Average FPS/UPS: {:.2} / {:.2}",
            self.average_fps, self.average_ups
        )
    }

    pub fn time_spent_label(&self) -> String {
        format!("Time Spent: {} secs", self.time_spent_secs)
    }

    /// Session totals, one item per line
    pub fn summary(&self) -> String {
        format!(
            "Frame Count/Loss: {} / {}\nAverage FPS: {:.2}\nAverage UPS: {:.2}\nTime Spent: {} secs",
            self.frame_count,
            self.total_frames_skipped,
            self.average_fps,
            self.average_ups,
            self.time_spent_secs
        )
    }
}

/// Rolling FPS/UPS aggregator owned by the loop thread
#[derive(Debug, Clone)]
pub struct FrameStats {
    /// Nanoseconds per logical frame
    period: i64,
    /// Simulated time accumulated since the last sample
    stats_interval: i64,
    start_time: ClockSample,
    prev_stats_time: ClockSample,
    time_spent_secs: u64,

    frame_count: u64,
    frames_skipped: u64,
    total_frames_skipped: u64,

    fps_store: Vec<f64>,
    ups_store: Vec<f64>,
    /// Samples written so far; the write cursor is this modulo the window
    sample_count: u64,
    average_fps: f64,
    average_ups: f64,
}

impl FrameStats {
    /// Create an aggregator for `target_rate` updates per second, starting the
    /// session clock at `start_time`
    pub fn new(target_rate: u32, start_time: ClockSample) -> Self {
        let window = target_rate.max(1) as usize;
        Self {
            period: NANOS_PER_SEC / window as i64,
            stats_interval: 0,
            start_time,
            prev_stats_time: start_time,
            time_spent_secs: 0,
            frame_count: 0,
            frames_skipped: 0,
            total_frames_skipped: 0,
            fps_store: vec![0.0; window],
            ups_store: vec![0.0; window],
            sample_count: 0,
            average_fps: 0.0,
            average_ups: 0.0,
        }
    }

    pub fn period_nanos(&self) -> i64 {
        self.period
    }

    /// Size of the rolling window
    pub fn window(&self) -> usize {
        self.fps_store.len()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn total_frames_skipped(&self) -> u64 {
        self.total_frames_skipped
    }

    pub fn average_fps(&self) -> f64 {
        self.average_fps
    }

    pub fn average_ups(&self) -> f64 {
        self.average_ups
    }

    pub fn time_spent_secs(&self) -> u64 {
        self.time_spent_secs
    }

    /// Number of per-second samples recorded so far
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frame_count: self.frame_count,
            total_frames_skipped: self.total_frames_skipped,
            average_fps: self.average_fps,
            average_ups: self.average_ups,
            time_spent_secs: self.time_spent_secs,
        }
    }

    pub fn summary(&self) -> String {
        self.snapshot().summary()
    }

    /// Account for one loop iteration that performed `skips` catch-up updates.
    ///
    /// Returns true when a full simulated second has accumulated and a new
    /// sample was taken (the clock is only read in that case).
    pub fn record_frame<C: Clock + ?Sized>(&mut self, skips: u32, clock: &C) -> bool {
        self.frame_count += 1;
        self.frames_skipped += u64::from(skips);
        self.total_frames_skipped += u64::from(skips);
        self.stats_interval += self.period;

        if self.stats_interval < NANOS_PER_SEC {
            return false;
        }

        self.sample(clock.now());
        true
    }

    fn sample(&mut self, now: ClockSample) {
        let real_elapsed = now - self.prev_stats_time;
        let timing_error =
            (real_elapsed - self.stats_interval) as f64 / self.stats_interval as f64 * 100.0;

        let since_start = now - self.start_time;
        self.time_spent_secs = (since_start.max(0) / NANOS_PER_SEC) as u64;

        if since_start > 0 {
            let secs = since_start as f64 / NANOS_PER_SEC as f64;
            let actual_fps = self.frame_count as f64 / secs;
            let actual_ups = (self.frame_count + self.total_frames_skipped) as f64 / secs;

            let window = self.window();
            let slot = (self.sample_count % window as u64) as usize;
            self.fps_store[slot] = actual_fps;
            self.ups_store[slot] = actual_ups;
            self.sample_count += 1;

            // Only slots that have been written take part in the average
            let valid = (self.sample_count as usize).min(window);
            self.average_fps = self.fps_store[..valid].iter().sum::<f64>() / valid as f64;
            self.average_ups = self.ups_store[..valid].iter().sum::<f64>() / valid as f64;

            log::trace!(
                "{:.4}s {:.4}s {:.2}% {}c {}/{} skip; {:.2} {:.2} afps; {:.2} {:.2} aups",
                self.stats_interval as f64 / NANOS_PER_SEC as f64,
                real_elapsed as f64 / NANOS_PER_SEC as f64,
                timing_error,
                self.frame_count,
                self.frames_skipped,
                self.total_frames_skipped,
                actual_fps,
                self.average_fps,
                actual_ups,
                self.average_ups
            );
        }

        self.frames_skipped = 0;
        self.prev_stats_time = now;
        self.stats_interval = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const RATE: u32 = 10;
    const PERIOD: i64 = NANOS_PER_SEC / RATE as i64;

    fn run_frames(stats: &mut FrameStats, clock: &ManualClock, frames: u32, nanos_per_frame: i64) {
        for _ in 0..frames {
            clock.advance_nanos(nanos_per_frame);
            stats.record_frame(0, clock);
        }
    }

    #[test]
    fn test_no_sample_before_a_simulated_second() {
        let clock = ManualClock::new();
        let mut stats = FrameStats::new(RATE, clock.now());

        run_frames(&mut stats, &clock, 9, PERIOD);
        assert_eq!(stats.frame_count(), 9);
        assert_eq!(stats.sample_count(), 0);
        assert_eq!(stats.average_fps(), 0.0);

        clock.advance_nanos(PERIOD);
        assert!(stats.record_frame(0, &clock));
        assert_eq!(stats.sample_count(), 1);
        assert!((stats.average_fps() - 10.0).abs() < 1e-9);
        assert_eq!(stats.time_spent_secs(), 1);
    }

    #[test]
    fn test_partial_window_averages_only_recorded_samples() {
        let clock = ManualClock::new();
        let mut stats = FrameStats::new(RATE, clock.now());

        // First second on time: 10 frames in 1s
        run_frames(&mut stats, &clock, 10, PERIOD);
        // Second simulated second takes 3s of wall time: 20 frames in 4s total
        run_frames(&mut stats, &clock, 10, 3 * PERIOD);

        assert_eq!(stats.sample_count(), 2);
        // Mean of 10.0 and 5.0, not divided by the full window of 10
        assert!((stats.average_fps() - 7.5).abs() < 1e-9);
        assert!((stats.average_ups() - 7.5).abs() < 1e-9);
        assert_eq!(stats.time_spent_secs(), 4);
    }

    #[test]
    fn test_window_wraps_after_n_samples() {
        let clock = ManualClock::new();
        let mut stats = FrameStats::new(2, clock.now());
        let period = stats.period_nanos();

        // Three samples through a window of two
        run_frames(&mut stats, &clock, 2, period); // 2 frames / 1s = 2
        run_frames(&mut stats, &clock, 2, period); // 4 / 2s = 2
        run_frames(&mut stats, &clock, 2, 2 * period); // 6 / 4s = 1.5

        assert_eq!(stats.sample_count(), 3);
        // Slot 0 now holds 1.5, slot 1 holds 2.0
        assert!((stats.average_fps() - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_skips_count_towards_ups() {
        let clock = ManualClock::new();
        let mut stats = FrameStats::new(RATE, clock.now());

        for i in 0..10 {
            clock.advance_nanos(PERIOD);
            stats.record_frame(if i == 0 { 5 } else { 0 }, &clock);
        }

        assert_eq!(stats.total_frames_skipped(), 5);
        assert!((stats.average_fps() - 10.0).abs() < 1e-9);
        assert!((stats.average_ups() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_records_no_sample() {
        let clock = ManualClock::new();
        let mut stats = FrameStats::new(RATE, clock.now());

        // Clock never moves: the interval completes but there is no elapsed time
        run_frames(&mut stats, &clock, 10, 0);

        assert_eq!(stats.sample_count(), 0);
        assert!(stats.average_fps().is_finite());
        assert_eq!(stats.average_fps(), 0.0);
        assert_eq!(stats.frame_count(), 10);

        // Next second samples normally
        run_frames(&mut stats, &clock, 10, PERIOD);
        assert_eq!(stats.sample_count(), 1);
        assert!((stats.average_fps() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels_and_summary() {
        let snapshot = StatsSnapshot {
            frame_count: 120,
            total_frames_skipped: 3,
            average_fps: 59.876,
            average_ups: 61.5,
            time_spent_secs: 2,
        };
        assert_eq!(snapshot.frame_count_label(), "Frame Count 120");
        assert_eq!(snapshot.average_label(), "Average FPS/UPS: 59.88 / 61.50");
        assert_eq!(snapshot.time_spent_label(), "Time Spent: 2 secs");
        assert_eq!(
            snapshot.summary(),
            "Frame Count/Loss: 120 / 3\nAverage FPS: 59.88\nAverage UPS: 61.50\nTime Spent: 2 secs"
        );
    }
}
