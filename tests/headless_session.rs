use std::thread;
use std::time::Duration;

use worm_chase::renderer::HeadlessPresenter;
use worm_chase::sim::{ChaseGame, ChaseInput, InputEvent, InputOutcome, Key, Modifiers};
use worm_chase::{GameLoop, Settings};

fn settings() -> Settings {
    Settings {
        target_rate: 100,
        seed: Some(21),
        ..Settings::default()
    }
}

fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..2_000 {
        if done() {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("condition not reached within 2s");
}

#[test]
fn threaded_session_runs_and_stops_on_quit_key() {
    let settings = settings();
    let game = ChaseGame::new(&settings, HeadlessPresenter::new(settings.width, settings.height));
    let shared = game.shared();

    let mut game_loop = GameLoop::new(settings.target_rate, game).unwrap();
    let input = ChaseInput::new(shared.clone(), game_loop.control());
    game_loop.start().unwrap();

    wait_until(|| shared.worm().point_count() >= 5);
    assert!(game_loop.is_running());

    // A miss far from the worm drops an obstacle while the loop keeps going
    assert_eq!(
        input.handle(InputEvent::PointerPressed { x: 5, y: 5 }),
        InputOutcome::ObstacleAdded { count: 1 }
    );

    let outcome = input.handle(InputEvent::KeyPressed {
        key: Key::Escape,
        modifiers: Modifiers::NONE,
    });
    assert_eq!(outcome, InputOutcome::QuitRequested);

    let snapshot = game_loop.join().unwrap();
    assert!(snapshot.frame_count >= 5);
    assert!(!game_loop.is_running());
    assert!(game_loop.control().is_finished_off());
    assert_eq!(input.status().boxes_used, 1);
}

#[test]
fn paused_session_keeps_rendering_but_worm_stays_put() {
    let settings = settings();
    let game = ChaseGame::new(&settings, HeadlessPresenter::new(settings.width, settings.height));
    let shared = game.shared();

    let mut game_loop = GameLoop::new(settings.target_rate, game).unwrap();
    let control = game_loop.control();
    game_loop.start().unwrap();

    wait_until(|| shared.worm().point_count() >= 2);
    control.pause();
    // Let any update already in flight finish
    thread::sleep(Duration::from_millis(30));
    let length = shared.worm().point_count();
    let head = shared.worm().head_position();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(shared.worm().head_position(), head);
    assert_eq!(shared.worm().point_count(), length);
    assert!(game_loop.is_running());

    control.resume();
    wait_until(|| shared.worm().head_position() != head);

    game_loop.stop();
    game_loop.join().unwrap();
}
