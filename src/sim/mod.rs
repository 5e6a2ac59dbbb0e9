//! Simulation module
//!
//! Gameplay state and rules. Nothing here depends on a window or a clock:
//! - Seeded RNG only
//! - Drawing goes through the `Surface` trait
//! - Timing comes from the game loop's `FrameContext`

pub mod chase;
pub mod input;
pub mod obstacles;
pub mod rect;
pub mod session;
pub mod worm;

pub use chase::{ChaseGame, ChaseInput, ChaseShared, ChaseStatus, InputOutcome, score};
pub use input::{InputEvent, Key, Modifiers};
pub use obstacles::Obstacles;
pub use rect::Rect;
pub use session::{ScriptedEvent, ScriptedSession, random_presses};
pub use worm::{Bearing, RandomSteering, Steering, Worm, WormCell, wrap_coordinate};
