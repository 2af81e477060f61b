//! The block breaker game
//!
//! Phases: `Loading` until the block atlas settles, then `Playing`, or
//! `LoadError` if it failed. Losing the ball either rebuilds the level or
//! moves to `GameOver` depending on `Settings::on_ball_lost`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_ATLAS, POINTS_PER_BLOCK};
use crate::game_loop::Game;
use crate::input::{InputState, Key};
use crate::renderer::{self, Surface, palette};
use crate::resources::ResourceLoader;
use crate::settings::{BallLostPolicy, Settings};
use crate::sim::{GameEvent, Level, TickInput, tick};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for startup resources
    Loading,
    /// A startup resource failed; nothing is simulated
    LoadError,
    Playing,
    /// Ball lost under `BallLostPolicy::GameOver`; launch restarts
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Loading => "loading",
            GamePhase::LoadError => "load_error",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game_over",
        }
    }
}

pub struct BlockBreaker<S: Surface> {
    settings: Settings,
    resources: ResourceLoader<S::Image>,
    level: Option<Level>,
    input: InputState,
    phase: GamePhase,
    level_index: usize,
    score: u32,
    rng: Pcg32,
}

impl<S: Surface> BlockBreaker<S>
where
    S::Image: 'static,
{
    pub fn new(settings: Settings, resources: ResourceLoader<S::Image>) -> Self {
        let rng = Pcg32::seed_from_u64(settings.seed);
        Self {
            settings,
            resources,
            level: None,
            input: InputState::default(),
            phase: GamePhase::Loading,
            level_index: 0,
            score: 0,
            rng,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Index into the built-in layouts, not wrapped
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resources(&self) -> &ResourceLoader<S::Image> {
        &self.resources
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {} -> {}", self.phase.as_str(), phase.as_str());
            self.phase = phase;
        }
    }

    /// Build the built-in level `index` and start playing it
    fn start_level(&mut self, index: usize) {
        self.level_index = index;
        self.level = Some(Level::builtin(index, &self.settings));
        // a launch pressed before the level existed doesn't count
        self.input.launch = false;
        self.set_phase(GamePhase::Playing);
    }

    fn poll_loading(&mut self) {
        let errors = self.resources.error_count();
        if errors > 0 {
            log::error!("{} startup resource(s) failed to load", errors);
            self.set_phase(GamePhase::LoadError);
        } else if self.resources.pending_count() == 0 {
            self.start_level(0);
        }
    }

    fn step(&mut self, dt: f32) {
        let Some(level) = self.level.as_mut() else {
            return;
        };

        let input = TickInput::take_from(&mut self.input);
        let events = tick(level, &input, &self.settings, &mut self.rng, dt);

        for event in events {
            match event {
                GameEvent::BlockHit { destroyed: true, .. } => {
                    self.score += POINTS_PER_BLOCK;
                }
                GameEvent::BallLost => {
                    self.on_ball_lost();
                    return;
                }
                GameEvent::LevelCleared => {
                    log::info!("Level {} cleared, score {}", self.level_index + 1, self.score);
                    self.start_level(self.level_index + 1);
                    return;
                }
                _ => {}
            }
        }
    }

    fn on_ball_lost(&mut self) {
        match self.settings.on_ball_lost {
            BallLostPolicy::ReloadLevel => {
                log::info!("Ball lost, reloading level {}", self.level_index + 1);
                self.score = 0;
                self.start_level(self.level_index);
            }
            BallLostPolicy::GameOver => {
                log::info!("Ball lost, game over with score {}", self.score);
                self.set_phase(GamePhase::GameOver);
            }
        }
    }
}

impl<S: Surface> Game for BlockBreaker<S>
where
    S::Image: 'static,
{
    type Surface = S;

    fn on_start(&mut self, _viewport: &Viewport) {
        let url = self.settings.block_atlas_url.clone();
        self.resources
            .request_load(BLOCK_ATLAS, &self.settings.block_atlas_url, move |_| {
                log::info!("Block atlas ready ({})", url);
            });
        self.poll_loading();
    }

    fn on_update(&mut self, _sim_time_ms: f64, dt: f32) {
        match self.phase {
            GamePhase::Loading => self.poll_loading(),
            GamePhase::LoadError => {}
            GamePhase::Playing => self.step(dt),
            GamePhase::GameOver => {
                if self.input.take_launch() {
                    log::info!("Restarting after game over");
                    self.score = 0;
                    self.start_level(0);
                }
            }
        }
    }

    fn on_draw(&mut self, surface: &mut S, viewport: &Viewport, alpha: f32) {
        renderer::clear(surface, viewport);
        if self.settings.debug_overlay {
            renderer::draw_debug_overlay(surface, viewport);
        } else {
            renderer::fill_output(surface, viewport, palette::BACKGROUND);
        }

        match self.phase {
            GamePhase::Loading => renderer::fill_output(surface, viewport, palette::LOADING),
            GamePhase::LoadError => renderer::fill_output(surface, viewport, palette::LOAD_ERROR),
            GamePhase::Playing | GamePhase::GameOver => {
                let Some(level) = self.level.as_ref() else {
                    return;
                };
                let atlas = self.resources.find(BLOCK_ATLAS);
                // nothing moves while the game is over
                let alpha = if self.phase == GamePhase::GameOver { 1.0 } else { alpha };
                renderer::draw_level(surface, viewport, level, atlas.as_deref(), alpha);

                if self.phase == GamePhase::GameOver {
                    renderer::fill_output(surface, viewport, palette::GAME_OVER_SHADE);
                }
            }
        }
    }

    fn on_key_down(&mut self, key: Key) {
        self.input.key_down(key);
    }

    fn on_key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_loop::GameLoop;
    use crate::platform::headless::{DrawCommand, ImmediateFetcher, RecordingSurface};
    use crate::renderer::Color;
    use crate::resources::{Completion, Fetch};
    use crate::sim::LEVELS;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    type TestGame = BlockBreaker<RecordingSurface>;

    fn started(settings: Settings) -> TestGame {
        let mut game = TestGame::new(settings, ResourceLoader::new(ImmediateFetcher::echo()));
        game.on_start(&Viewport::new(800.0, 600.0));
        game
    }

    fn level_mut(game: &mut TestGame) -> &mut Level {
        game.level.as_mut().expect("level loaded")
    }

    /// Keeps completions without finishing them
    #[derive(Clone, Default)]
    struct HeldFetcher {
        held: Rc<RefCell<Vec<Completion<String>>>>,
    }

    impl Fetch<String> for HeldFetcher {
        fn fetch(&self, _url: &str, completion: Completion<String>) {
            self.held.borrow_mut().push(completion);
        }
    }

    #[test]
    fn test_plays_once_atlas_loads() {
        let game = started(Settings::default());
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.resources().is_loaded(BLOCK_ATLAS));
        assert_eq!(game.level_index(), 0);
        let expected: usize = LEVELS[0].iter().flat_map(|r| r.iter()).filter(|&&k| k != 0).count();
        assert_eq!(game.level().unwrap().blocks.len(), expected);
    }

    #[test]
    fn test_atlas_loaded_from_configured_url() {
        let settings = Settings {
            block_atlas_url: "sprites/custom.png".to_string(),
            ..Settings::default()
        };
        let game = started(settings);
        assert_eq!(game.phase(), GamePhase::Playing);
        let atlas = game.resources().find(BLOCK_ATLAS).expect("atlas loaded");
        assert_eq!(atlas.as_str(), "sprites/custom.png");
    }

    #[test]
    fn test_held_launch_does_not_leave_game_over() {
        let settings = Settings {
            on_ball_lost: BallLostPolicy::GameOver,
            ..Settings::default()
        };
        let mut game = started(settings);
        game.on_key_down(Key::Launch);
        game.on_update(0.0, DT);

        let ball = &mut level_mut(&mut game).balls[0];
        ball.body.set_pos(Vec2::new(20.0, 595.0));
        ball.body.vel = Vec2::new(0.0, 100.0);
        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::GameOver);

        // auto-repeat while the key is still held
        game.on_key_down(Key::Launch);
        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.on_key_up(Key::Launch);
        game.on_key_down(Key::Launch);
        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_waits_while_loading() {
        let fetcher = HeldFetcher::default();
        let mut game = TestGame::new(Settings::default(), ResourceLoader::new(fetcher.clone()));
        game.on_start(&Viewport::new(800.0, 600.0));
        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::Loading);
        assert!(game.level().is_none());

        let completion = fetcher.held.borrow_mut().pop().unwrap();
        completion.resolve("atlas".to_string());
        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_failed_atlas_blocks_play() {
        let loader = ResourceLoader::new(ImmediateFetcher::new(|_| Err("404".to_string())));
        let mut game = TestGame::new(Settings::default(), loader);
        game.on_start(&Viewport::new(800.0, 600.0));
        assert_eq!(game.phase(), GamePhase::LoadError);

        game.on_key_down(Key::Launch);
        for _ in 0..10 {
            game.on_update(0.0, DT);
        }
        assert_eq!(game.phase(), GamePhase::LoadError);
        assert!(game.level().is_none());
    }

    #[test]
    fn test_launch_before_level_is_ignored() {
        let fetcher = HeldFetcher::default();
        let mut game = TestGame::new(Settings::default(), ResourceLoader::new(fetcher.clone()));
        game.on_start(&Viewport::new(800.0, 600.0));
        game.on_key_down(Key::Launch);
        fetcher.held.borrow_mut().pop().unwrap().resolve("atlas".to_string());
        game.on_update(0.0, DT);
        game.on_update(0.0, DT);
        assert!(game.level().unwrap().balls[0].stuck_to_paddle);
    }

    #[test]
    fn test_launch_key_frees_ball() {
        let mut game = started(Settings::default());
        game.on_key_down(Key::Launch);
        game.on_key_up(Key::Launch);
        game.on_update(0.0, DT);
        assert!(!game.level().unwrap().balls[0].stuck_to_paddle);
    }

    #[test]
    fn test_destroying_block_scores() {
        let mut game = started(Settings::default());
        // top row, above an empty cell
        let target = *level_mut(&mut game).blocks[2].bounds();
        let ball = &mut level_mut(&mut game).balls[0];
        ball.stuck_to_paddle = false;
        ball.body.set_pos(Vec2::new(target.center.x, target.bottom() + ball.radius() - 2.0));
        ball.body.vel = Vec2::new(0.0, -200.0);

        game.on_update(0.0, DT);
        assert_eq!(game.score(), POINTS_PER_BLOCK);
        assert!(!game.level().unwrap().blocks[2].alive);
    }

    #[test]
    fn test_ball_lost_reloads_level() {
        let mut game = started(Settings::default());
        game.score = 50;
        level_mut(&mut game).blocks[0].alive = false;
        let ball = &mut level_mut(&mut game).balls[0];
        ball.stuck_to_paddle = false;
        ball.body.set_pos(Vec2::new(20.0, 595.0));
        ball.body.vel = Vec2::new(0.0, 100.0);

        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.score(), 0);
        let level = game.level().unwrap();
        assert!(level.balls[0].stuck_to_paddle);
        assert!(level.blocks.iter().all(|b| b.alive));
    }

    #[test]
    fn test_ball_lost_game_over_and_restart() {
        let settings = Settings {
            on_ball_lost: BallLostPolicy::GameOver,
            ..Settings::default()
        };
        let mut game = started(settings);
        game.level_index = 2;
        let ball = &mut level_mut(&mut game).balls[0];
        ball.stuck_to_paddle = false;
        ball.body.set_pos(Vec2::new(20.0, 595.0));
        ball.body.vel = Vec2::new(0.0, 100.0);

        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.on_key_down(Key::Launch);
        game.on_update(0.0, DT);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.level_index(), 0);
        assert!(game.level().unwrap().balls[0].stuck_to_paddle);
    }

    #[test]
    fn test_cleared_level_advances() {
        let mut game = started(Settings::default());
        let level = level_mut(&mut game);
        for (index, block) in level.blocks.iter_mut().enumerate() {
            block.alive = index == 2;
        }
        let target = *level.blocks[2].bounds();
        let ball = &mut level.balls[0];
        ball.stuck_to_paddle = false;
        ball.body.set_pos(Vec2::new(target.center.x, target.bottom() + ball.radius() - 2.0));
        ball.body.vel = Vec2::new(0.0, -200.0);

        game.on_update(0.0, DT);
        assert_eq!(game.level_index(), 1);
        assert_eq!(game.score(), POINTS_PER_BLOCK);
        let expected: usize = LEVELS[1].iter().flat_map(|r| r.iter()).filter(|&&k| k != 0).count();
        assert_eq!(game.level().unwrap().blocks.len(), expected);
    }

    #[test]
    fn test_draws_sprites_through_loop() {
        let settings = Settings::default();
        let game = TestGame::new(settings.clone(), ResourceLoader::new(ImmediateFetcher::echo()));
        let mut game_loop = GameLoop::from_settings(game, &settings);
        let mut surface = RecordingSurface::new(800.0, 600.0, 1.0);

        game_loop.frame(0.0, &mut surface);
        game_loop.frame(16.0, &mut surface);
        let frame = surface.last_frame();
        assert!(matches!(frame[0], DrawCommand::Clear { .. }));
        assert!(frame.iter().any(|c| matches!(
            c,
            DrawCommand::DrawImage { image, .. } if image == &settings.block_atlas_url
        )));
        assert!(frame.iter().any(|c| matches!(c, DrawCommand::FillCircle { .. })));
    }

    #[test]
    fn test_load_error_screen() {
        let settings = Settings::default();
        let loader = ResourceLoader::new(ImmediateFetcher::new(|_| Err("offline".to_string())));
        let mut game_loop = GameLoop::from_settings(TestGame::new(settings.clone(), loader), &settings);
        let mut surface = RecordingSurface::new(800.0, 600.0, 1.0);

        game_loop.frame(0.0, &mut surface);
        assert!(surface.last_frame().iter().any(|c| matches!(
            c,
            DrawCommand::FillRect { color, .. } if *color == palette::LOAD_ERROR
        )));
    }

    #[test]
    fn test_debug_overlay_drawn_when_enabled() {
        let settings = Settings {
            debug_overlay: true,
            ..Settings::default()
        };
        let mut game_loop = GameLoop::from_settings(
            TestGame::new(settings.clone(), ResourceLoader::new(ImmediateFetcher::echo())),
            &settings,
        );
        let mut surface = RecordingSurface::new(1000.0, 600.0, 1.0);
        game_loop.frame(0.0, &mut surface);
        assert!(surface.last_frame().iter().any(|c| matches!(
            c,
            DrawCommand::FillRect { color, .. } if *color == Color::MAGENTA
        )));
    }
}
