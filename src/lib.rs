//! Worm Chase - a fixed-timestep game loop driving a wandering worm
//!
//! Core modules:
//! - `clock`: Monotonic and virtual time sources
//! - `game_loop`: Fixed-rate scheduler with frame skipping and FPS/UPS statistics
//! - `sim`: Worm motion, obstacle field and the chase game built on them
//! - `renderer`: Drawing surface contract and a headless vertex batch
//! - `settings`: JSON configuration

pub mod clock;
pub mod game_loop;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use clock::{Clock, ClockSample, ManualClock, MonotonicClock};
pub use game_loop::{FrameContext, GameLoop, LoopControl, LoopError, Simulation, StatsSnapshot};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Consecutive frames without a sleep before the loop thread yields
    pub const NO_DELAYS_PER_YIELD: u32 = 16;
    /// Maximum catch-up updates (update without render) per loop iteration
    pub const MAX_FRAME_SKIP: u32 = 5;

    /// Default logical update rate
    pub const DEFAULT_TARGET_RATE: u32 = 60;

    /// Worm cell diameter; also the step length and collision size
    pub const DOT_SIZE: i32 = 12;
    pub const RADIUS: i32 = DOT_SIZE / 2;
    /// Longest visible trail
    pub const MAX_POINTS: usize = 40;

    /// Obstacle side length
    pub const BOX_LENGTH: i32 = 12;

    /// Score baseline for both the time and the box components
    pub const SCORE_BASELINE: i64 = 40;
}
