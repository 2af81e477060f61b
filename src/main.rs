//! Block Breaker entry point
//!
//! On wasm32 the game runs on `<canvas id="canvas">`. Natively it plays a
//! short scripted session on a headless surface, optionally with a settings
//! JSON file given as the first argument.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;

    use blockbreaker::platform::web::{CanvasSurface, HtmlImageFetcher, WebRunner};
    use blockbreaker::resources::ResourceLoader;
    use blockbreaker::{BlockBreaker, GameError, GameLoop, Settings};

    type Runner = WebRunner<BlockBreaker<CanvasSurface>>;

    thread_local! {
        static RUNNER: RefCell<Option<Runner>> = const { RefCell::new(None) };
    }

    pub fn run() -> Result<(), GameError> {
        console_error_panic_hook::set_once();
        // already set if the game was stopped and started again
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Block Breaker starting...");

        let settings = Settings {
            seed: js_sys::Date::now() as u64,
            ..Settings::default()
        };
        log::info!("Launch jitter seed: {}", settings.seed);

        let surface = CanvasSurface::from_element_id("canvas")?;
        let game = BlockBreaker::new(settings.clone(), ResourceLoader::new(HtmlImageFetcher));
        let runner = WebRunner::start(GameLoop::from_settings(game, &settings), surface)?;

        RUNNER.with(|slot| *slot.borrow_mut() = Some(runner));
        Ok(())
    }

    pub fn stop() {
        let runner = RUNNER.with(|slot| slot.borrow_mut().take());
        if runner.is_none() {
            log::warn!("Block Breaker is not running");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().map_err(|err| {
        log::error!("Start-up failed: {}", err);
        JsValue::from_str(&err.to_string())
    })
}

/// Stop the game, detaching its listeners
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop_game() {
    wasm_game::stop();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Block Breaker (native, headless) starting...");

    if let Err(err) = run_headless() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

/// Play a scripted session: launch, then sweep the paddle back and forth
#[cfg(not(target_arch = "wasm32"))]
fn run_headless() -> Result<(), blockbreaker::GameError> {
    use blockbreaker::input::Key;
    use blockbreaker::platform::headless::{ImmediateFetcher, RecordingSurface};
    use blockbreaker::resources::ResourceLoader;
    use blockbreaker::{BlockBreaker, GameLoop, Settings};

    const FRAMES: u32 = 60 * 30;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Reading settings from {}", path);
            Settings::from_json(&std::fs::read_to_string(&path)?)?
        }
        None => Settings::default(),
    };

    let game = BlockBreaker::new(settings.clone(), ResourceLoader::new(ImmediateFetcher::echo()));
    let mut game_loop = GameLoop::from_settings(game, &settings);
    let mut surface = RecordingSurface::new(
        settings.render_width * 1.5,
        settings.render_height,
        1.0,
    );

    for frame in 0..FRAMES {
        match frame % 240 {
            0 => {
                game_loop.key_down(Key::Launch);
                game_loop.key_up(Key::Launch);
                game_loop.key_down(Key::MoveLeft);
            }
            120 => {
                game_loop.key_up(Key::MoveLeft);
                game_loop.key_down(Key::MoveRight);
            }
            239 => game_loop.key_up(Key::MoveRight),
            _ => {}
        }

        game_loop.frame(frame as f64 * FRAME_MS, &mut surface);
        surface.clear_commands();
    }

    let game = game_loop.game();
    let blocks_left = game.level().map(|l| l.remaining_breakable()).unwrap_or(0);
    println!(
        "{} steps ({:.1} s simulated), phase {}, level {}, score {}, {} blocks left",
        game_loop.steps(),
        game_loop.sim_time_ms() / 1000.0,
        game.phase().as_str(),
        game.level_index() + 1,
        game.score(),
        blocks_left
    );
    Ok(())
}
