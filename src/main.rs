//! Worm Chase entry point
//!
//! Headless host: runs a session against a vertex-batch surface, optionally
//! feeding it random clicks, then prints the session summary.

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

use worm_chase::renderer::HeadlessPresenter;
use worm_chase::sim::{ChaseGame, ChaseInput, ScriptedSession, random_presses};
use worm_chase::{GameLoop, ManualClock, Settings, StatsSnapshot};

#[derive(Parser, Debug)]
#[command(name = "worm-chase", about = "Fixed-timestep worm chase, run headless")]
struct Cli {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Logical updates per second
    #[arg(long)]
    rate: Option<u32>,

    /// Session length in seconds
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Worm steering seed
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Random clicks to inject during the session
    #[arg(long, default_value_t = 0)]
    drops: usize,

    /// Run on a virtual clock as fast as possible (deterministic for a seed)
    #[arg(long)]
    virtual_clock: bool,

    /// Print the final status as JSON instead of the text summary
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(rate) = self.rate {
            settings.target_rate = rate;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        settings.validate().context("invalid settings")?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = cli.settings()?;
    log::info!(
        "Worm Chase (headless) starting at {} updates/s",
        settings.target_rate
    );

    let (input, snapshot) = if cli.virtual_clock {
        run_virtual(&cli, &settings)?
    } else {
        run_threaded(&cli, &settings)?
    };

    if cli.json {
        let status = input.status();
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("serializing status")?
        );
    } else {
        println!("{}", snapshot.summary());
        let status = input.status();
        match status.score {
            Some(score) => println!("Score: {score}"),
            None => println!("Boxes used: {}", status.boxes_used),
        }
    }
    Ok(())
}

fn session_frames(cli: &Cli, settings: &Settings) -> u64 {
    (cli.seconds.max(0.0) * f64::from(settings.target_rate)) as u64
}

/// Real time: the loop runs on its own thread while this one plays the user
fn run_threaded(cli: &Cli, settings: &Settings) -> Result<(ChaseInput, StatsSnapshot)> {
    let presenter = HeadlessPresenter::new(settings.width, settings.height);
    let game = ChaseGame::new(settings, presenter);
    let shared = game.shared();
    let clicks = random_presses(
        game.seed(),
        cli.drops,
        session_frames(cli, settings),
        settings.width,
        settings.height,
    );

    let mut game_loop =
        GameLoop::new(settings.target_rate, game).context("creating game loop")?;
    let input = ChaseInput::new(shared, game_loop.control());
    game_loop.start().context("starting game loop")?;

    let period = game_loop.period();
    let mut elapsed_frames = 0;
    for click in clicks {
        let wait = click.frame.saturating_sub(elapsed_frames);
        thread::sleep(period * u32::try_from(wait).unwrap_or(u32::MAX));
        elapsed_frames = click.frame;
        if game_loop.control().is_stop_requested() {
            break;
        }
        let outcome = input.handle(click.event);
        log::debug!("Injected {:?}: {outcome:?}", click.event);
    }
    let remaining = session_frames(cli, settings).saturating_sub(elapsed_frames);
    thread::sleep(period * u32::try_from(remaining).unwrap_or(u32::MAX));

    game_loop.stop();
    let snapshot = game_loop.join().context("game loop failed")?;
    Ok((input, snapshot))
}

/// Virtual time: the loop runs here, clicks fire from inside it
fn run_virtual(cli: &Cli, settings: &Settings) -> Result<(ChaseInput, StatsSnapshot)> {
    let presenter = HeadlessPresenter::new(settings.width, settings.height);
    let game = ChaseGame::new(settings, presenter);
    let shared = game.shared();
    let frames = session_frames(cli, settings);
    let script = random_presses(
        game.seed(),
        cli.drops,
        frames,
        settings.width,
        settings.height,
    );

    let session = ScriptedSession::new(game, shared.clone(), script, frames);
    let game_loop = GameLoop::with_clock(settings.target_rate, session, ManualClock::new())
        .context("creating game loop")?;
    let input = ChaseInput::new(shared, game_loop.control());
    let snapshot = game_loop.run_blocking().context("game loop failed")?;
    Ok((input, snapshot))
}
