//! Scripted sessions
//!
//! Replays input at fixed frame numbers from inside the loop thread and stops
//! the loop after a set number of frames. With a virtual clock this makes a
//! whole session reproducible from its seed.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::chase::{ChaseInput, ChaseShared, InputOutcome};
use super::input::InputEvent;
use crate::game_loop::{FrameContext, Simulation};
use crate::renderer::RenderError;

/// An input event due once `frame` iterations have completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedEvent {
    pub frame: u64,
    pub event: InputEvent,
}

/// `count` pointer presses at random spots, spread over `frames` frames and
/// sorted by frame
pub fn random_presses(
    seed: u64,
    count: usize,
    frames: u64,
    width: i32,
    height: i32,
) -> Vec<ScriptedEvent> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut events: Vec<ScriptedEvent> = (0..count)
        .map(|_| ScriptedEvent {
            frame: rng.random_range(0..frames.max(1)),
            event: InputEvent::PointerPressed {
                x: rng.random_range(0..width.max(1)),
                y: rng.random_range(0..height.max(1)),
            },
        })
        .collect();
    events.sort_by_key(|e| e.frame);
    events
}

/// Wraps a simulation with an input script and a frame limit
pub struct ScriptedSession<S> {
    inner: S,
    shared: Arc<ChaseShared>,
    input: Option<ChaseInput>,
    script: VecDeque<ScriptedEvent>,
    stop_after: u64,
    outcomes: Vec<InputOutcome>,
}

impl<S: Simulation> ScriptedSession<S> {
    pub fn new(
        inner: S,
        shared: Arc<ChaseShared>,
        mut script: Vec<ScriptedEvent>,
        stop_after: u64,
    ) -> Self {
        script.sort_by_key(|e| e.frame);
        Self {
            inner,
            shared,
            input: None,
            script: script.into(),
            stop_after,
            outcomes: Vec::new(),
        }
    }

    /// Results of the events replayed so far
    pub fn outcomes(&self) -> &[InputOutcome] {
        &self.outcomes
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Simulation> Simulation for ScriptedSession<S> {
    fn on_start(&mut self, ctx: &FrameContext<'_>) {
        self.input = Some(ChaseInput::new(
            Arc::clone(&self.shared),
            ctx.control.clone(),
        ));
        self.inner.on_start(ctx);
    }

    fn on_update(&mut self, ctx: &FrameContext<'_>) {
        let frame = ctx.stats.frame_count();
        if let Some(input) = &self.input {
            while self.script.front().is_some_and(|e| e.frame <= frame) {
                if let Some(scripted) = self.script.pop_front() {
                    self.outcomes.push(input.handle(scripted.event));
                }
            }
        }
        if frame >= self.stop_after {
            ctx.control.stop();
        }
        self.inner.on_update(ctx);
    }

    fn on_render(&mut self, ctx: &FrameContext<'_>) -> Result<(), RenderError> {
        self.inner.on_render(ctx)
    }

    fn on_finish(&mut self, ctx: &FrameContext<'_>) {
        log::debug!(
            "Replayed {} scripted events, {} left unplayed",
            self.outcomes.len(),
            self.script.len()
        );
        self.inner.on_finish(ctx);
    }
}
