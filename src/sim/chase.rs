//! Worm chase
//!
//! The player tries to click the worm's head while it wanders. Clicks that
//! miss drop obstacles in its path; the fewer boxes and seconds it takes, the
//! higher the score. Two on-screen "buttons" pause and quit.
//!
//! [`ChaseGame`] is the [`Simulation`] driven by the loop thread.
//! [`ChaseInput`] handles host events on whatever thread delivers them; both
//! share one [`ChaseShared`].

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::input::InputEvent;
use super::obstacles::Obstacles;
use super::rect::Rect;
use super::worm::Worm;
use crate::consts::SCORE_BASELINE;
use crate::game_loop::{FrameContext, LoopControl, Simulation, StatsSnapshot};
use crate::renderer::{Color, PresentStatus, Presenter, RenderError, Surface, colors};
use crate::settings::Settings;

/// Nominal height of a line of HUD text
const LINE_HEIGHT: i32 = 24;

/// Points for catching the worm after `time_spent_secs` using `boxes_used` obstacles.
/// Goes negative for slow or box-heavy games.
pub fn score(time_spent_secs: u64, boxes_used: usize) -> i64 {
    let secs = i64::try_from(time_spent_secs).unwrap_or(i64::MAX);
    let boxes = i64::try_from(boxes_used).unwrap_or(i64::MAX);
    SCORE_BASELINE
        .saturating_sub(secs)
        .saturating_add(SCORE_BASELINE.saturating_sub(boxes))
}

/// State touched by both the loop thread and the input thread
#[derive(Debug)]
pub struct ChaseShared {
    worm: RwLock<Worm>,
    obstacles: Obstacles,
    boxes_used: Arc<AtomicUsize>,
    caught: AtomicBool,
    game_over: AtomicBool,
    score: AtomicI64,
    over_pause: AtomicBool,
    over_quit: AtomicBool,
    pause_area: Rect,
    quit_area: Rect,
    width: i32,
    height: i32,
}

impl ChaseShared {
    fn new(width: i32, height: i32, seed: u64) -> Self {
        let boxes_used = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&boxes_used);
        Self {
            worm: RwLock::new(Worm::new(width, height, seed)),
            obstacles: Obstacles::with_observer(move |n| counter.store(n, Ordering::SeqCst)),
            boxes_used,
            caught: AtomicBool::new(false),
            game_over: AtomicBool::new(false),
            score: AtomicI64::new(0),
            over_pause: AtomicBool::new(false),
            over_quit: AtomicBool::new(false),
            pause_area: Rect::new(width - 100, height - 45, 70, 15),
            quit_area: Rect::new(width - 100, height - 20, 70, 15),
            width,
            height,
        }
    }

    pub fn worm(&self) -> RwLockReadGuard<'_, Worm> {
        self.worm.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn worm_mut(&self) -> RwLockWriteGuard<'_, Worm> {
        self.worm.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn obstacles(&self) -> &Obstacles {
        &self.obstacles
    }

    pub fn boxes_used(&self) -> usize {
        self.boxes_used.load(Ordering::SeqCst)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.load(Ordering::SeqCst)
    }

    /// Final score, once the game is over
    pub fn score(&self) -> Option<i64> {
        self.is_game_over()
            .then(|| self.score.load(Ordering::SeqCst))
    }

    pub fn pause_area(&self) -> Rect {
        self.pause_area
    }

    pub fn quit_area(&self) -> Rect {
        self.quit_area
    }

    pub fn is_over_pause(&self) -> bool {
        self.over_pause.load(Ordering::SeqCst)
    }

    pub fn is_over_quit(&self) -> bool {
        self.over_quit.load(Ordering::SeqCst)
    }

    /// End the game with `score`. Only the first call counts; the score is
    /// written before `game_over` is published.
    fn end_game(&self, score: i64) -> bool {
        if self
            .caught
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.score.store(score, Ordering::SeqCst);
        self.game_over.store(true, Ordering::SeqCst);
        true
    }

    fn draw(&self, surface: &mut dyn Surface, stats: Option<StatsSnapshot>, paused: bool) {
        surface.clear(colors::BACKGROUND);

        if let Some(stats) = stats {
            surface.draw_text(&stats.frame_count_label(), 10, 25, colors::HUD_TEXT);
            surface.draw_text(&stats.average_label(), 250, 25, colors::HUD_TEXT);
            surface.draw_text(&stats.time_spent_label(), 10, self.height - 15, colors::HUD_TEXT);
        }

        self.draw_buttons(surface, paused);
        self.obstacles.draw(surface);
        self.worm().draw(surface);

        if let Some(score) = self.score() {
            let msg = format!("Game Over. Your Score: {score}");
            let x = (self.width - surface.text_width(&msg)) / 2;
            let y = (self.height - LINE_HEIGHT) / 2;
            surface.draw_text(&msg, x, y, colors::GAME_OVER);
        }
    }

    fn draw_buttons(&self, surface: &mut dyn Surface, paused: bool) {
        let button_color = |hover: bool| -> Color {
            if hover {
                colors::BUTTON_HOVER
            } else {
                colors::BUTTON
            }
        };

        let area = self.pause_area;
        let color = button_color(self.is_over_pause());
        surface.stroke_oval(area.x, area.y, area.width, area.height, color);
        if paused {
            surface.draw_text("Paused", area.x, area.y + 10, color);
        } else {
            surface.draw_text("Pause", area.x + 5, area.y + 10, color);
        }

        let area = self.quit_area;
        let color = button_color(self.is_over_quit());
        surface.stroke_oval(area.x, area.y, area.width, area.height, color);
        surface.draw_text("Quit", area.x + 15, area.y + 10, color);
    }
}

/// The worm chase simulation, rendering through `P`
pub struct ChaseGame<P> {
    shared: Arc<ChaseShared>,
    presenter: P,
    seed: u64,
    show_stats: bool,
}

impl<P: Presenter> ChaseGame<P> {
    /// New game sized to the settings' viewport. Without a configured seed one
    /// is drawn at random.
    pub fn new(settings: &Settings, presenter: P) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Game initialized with seed: {seed}");
        Self {
            shared: Arc::new(ChaseShared::new(settings.width, settings.height, seed)),
            presenter,
            seed,
            show_stats: settings.show_stats,
        }
    }

    pub fn shared(&self) -> Arc<ChaseShared> {
        Arc::clone(&self.shared)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }
}

impl<P: Presenter> Simulation for ChaseGame<P> {
    fn on_start(&mut self, _ctx: &FrameContext<'_>) {
        log::info!(
            "Worm chase started ({}x{})",
            self.shared.width,
            self.shared.height
        );
    }

    fn on_update(&mut self, ctx: &FrameContext<'_>) {
        if !ctx.control.is_paused() && !self.shared.is_game_over() {
            self.shared.worm_mut().advance(&self.shared.obstacles);
        }
    }

    fn on_render(&mut self, ctx: &FrameContext<'_>) -> Result<(), RenderError> {
        let stats = self.show_stats.then(|| ctx.stats.snapshot());
        let shared = &self.shared;
        shared.draw(self.presenter.surface(), stats, ctx.control.is_paused());

        if self.presenter.present_frame()? == PresentStatus::ContentsLost {
            log::warn!("Frame contents lost during presentation");
        }
        Ok(())
    }

    fn on_finish(&mut self, _ctx: &FrameContext<'_>) {
        match self.shared.score() {
            Some(score) => log::info!("Worm chase finished with score {score}"),
            None => log::info!(
                "Worm chase finished without a catch ({} boxes used)",
                self.shared.boxes_used()
            ),
        }
    }
}

/// What an input event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    PauseToggled { paused: bool },
    QuitRequested,
    GameOver { score: i64 },
    ObstacleAdded { count: usize },
    HoverUpdated,
    Ignored,
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaseStatus {
    pub paused: bool,
    pub game_over: bool,
    pub score: Option<i64>,
    pub boxes_used: usize,
    pub worm_length: usize,
    pub stats: StatsSnapshot,
}

/// Applies host input to a running chase
#[derive(Debug, Clone)]
pub struct ChaseInput {
    shared: Arc<ChaseShared>,
    control: LoopControl,
}

impl ChaseInput {
    pub fn new(shared: Arc<ChaseShared>, control: LoopControl) -> Self {
        Self { shared, control }
    }

    fn in_play(&self) -> bool {
        !self.control.is_paused() && !self.shared.is_game_over()
    }

    pub fn handle(&self, event: InputEvent) -> InputOutcome {
        if event.is_quit() {
            log::info!("Quit key pressed");
            self.control.stop();
            return InputOutcome::QuitRequested;
        }

        match event {
            InputEvent::PointerPressed { x, y } => self.press(x, y),
            InputEvent::PointerMoved { x, y } => {
                // A move right after quitting must not light up a button
                if !self.control.is_running() {
                    return InputOutcome::Ignored;
                }
                let shared = &self.shared;
                shared
                    .over_pause
                    .store(shared.pause_area.contains(x, y), Ordering::SeqCst);
                shared
                    .over_quit
                    .store(shared.quit_area.contains(x, y), Ordering::SeqCst);
                InputOutcome::HoverUpdated
            }
            InputEvent::PointerDragged { x, y } => {
                if !self.in_play() {
                    return InputOutcome::Ignored;
                }
                InputOutcome::ObstacleAdded {
                    count: self.shared.obstacles.add(x, y),
                }
            }
            InputEvent::KeyPressed { .. } => InputOutcome::Ignored,
        }
    }

    fn press(&self, x: i32, y: i32) -> InputOutcome {
        let shared = &self.shared;
        if shared.pause_area.contains(x, y) {
            self.control.toggle_pause();
            let paused = self.control.is_paused();
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
            return InputOutcome::PauseToggled { paused };
        }
        if shared.quit_area.contains(x, y) {
            log::info!("Quit button pressed");
            self.control.stop();
            return InputOutcome::QuitRequested;
        }
        if !self.in_play() {
            return InputOutcome::Ignored;
        }

        let (near_head, touched) = {
            let worm = shared.worm();
            (worm.is_near_head(x, y), worm.touched_at(x, y))
        };
        if near_head {
            let score = score(self.control.time_spent_secs(), shared.boxes_used());
            if shared.end_game(score) {
                log::info!("Game over, score {score}");
            }
            return InputOutcome::GameOver {
                score: shared.score().unwrap_or(score),
            };
        }
        if touched {
            return InputOutcome::Ignored;
        }
        InputOutcome::ObstacleAdded {
            count: shared.obstacles.add(x, y),
        }
    }

    pub fn status(&self) -> ChaseStatus {
        ChaseStatus {
            paused: self.control.is_paused(),
            game_over: self.shared.is_game_over(),
            score: self.shared.score(),
            boxes_used: self.shared.boxes_used(),
            worm_length: self.shared.worm().point_count(),
            stats: self.control.snapshot(),
        }
    }
}
