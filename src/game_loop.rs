//! Fixed-step loop driver
//!
//! The host calls [`GameLoop::frame`] about once per display refresh with a
//! millisecond timestamp. The first call sizes the viewport and starts the
//! game; every later call runs zero or more whole update steps and then
//! draws exactly once with the leftover fraction of a step.

use crate::input::Key;
use crate::renderer::Surface;
use crate::settings::Settings;
use crate::viewport::Viewport;

/// Largest blend factor handed to `on_draw`
const MAX_ALPHA: f32 = 1.0 - f32::EPSILON;

/// Hooks a game provides to the loop driver
pub trait Game {
    type Surface: Surface;

    /// Called once, on the first frame, after the viewport is sized
    fn on_start(&mut self, viewport: &Viewport);

    /// One fixed step. `sim_time_ms` is the simulation clock after this step.
    fn on_update(&mut self, sim_time_ms: f64, dt: f32);

    /// Draw with `alpha` in [0, 1) of a step not yet simulated
    fn on_draw(&mut self, surface: &mut Self::Surface, viewport: &Viewport, alpha: f32);

    fn on_key_down(&mut self, _key: Key) {}

    fn on_key_up(&mut self, _key: Key) {}
}

pub struct GameLoop<G> {
    game: G,
    viewport: Viewport,
    step_ms: f64,
    /// `step_ms` in seconds, as handed to `on_update`
    step_secs: f32,
    max_steps: u32,
    started: bool,
    last_timestamp: f64,
    /// Wall-clock time not yet turned into update steps
    unconsumed_ms: f64,
    sim_time_ms: f64,
    steps: u64,
}

impl<G: Game> GameLoop<G> {
    pub fn new(game: G, viewport: Viewport, step_ms: f64, max_steps: u32) -> Self {
        Self {
            game,
            viewport,
            step_ms,
            step_secs: (step_ms / 1000.0) as f32,
            max_steps: max_steps.max(1),
            started: false,
            last_timestamp: 0.0,
            unconsumed_ms: 0.0,
            sim_time_ms: 0.0,
            steps: 0,
        }
    }

    pub fn from_settings(game: G, settings: &Settings) -> Self {
        Self::new(
            game,
            Viewport::new(settings.render_width, settings.render_height),
            settings.step_ms,
            settings.max_catch_up_steps,
        )
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_running(&self) -> bool {
        self.started
    }

    pub fn sim_time_ms(&self) -> f64 {
        self.sim_time_ms
    }

    /// Update steps run since start
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn key_down(&mut self, key: Key) {
        self.game.on_key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.game.on_key_up(key);
    }

    /// Run one display frame
    pub fn frame(&mut self, timestamp_ms: f64, surface: &mut G::Surface) {
        self.viewport.on_resize(
            surface.width(),
            surface.height(),
            surface.device_pixel_ratio(),
        );

        if !self.started {
            self.started = true;
            self.last_timestamp = timestamp_ms;
            log::info!("Game loop started at {:.1} ms", timestamp_ms);
            self.game.on_start(&self.viewport);
            self.game.on_draw(surface, &self.viewport, 0.0);
            return;
        }

        // timestamps should be monotonic, but never run time backwards
        let delta = (timestamp_ms - self.last_timestamp).max(0.0);
        self.last_timestamp = timestamp_ms;
        self.unconsumed_ms += delta;

        let mut steps = 0;
        while self.unconsumed_ms >= self.step_ms {
            if steps == self.max_steps {
                let dropped = self.unconsumed_ms - self.unconsumed_ms % self.step_ms;
                self.unconsumed_ms %= self.step_ms;
                log::debug!(
                    "Frame hit the {} step cap, dropping {:.1} ms",
                    self.max_steps,
                    dropped
                );
                break;
            }

            self.sim_time_ms += self.step_ms;
            self.game.on_update(self.sim_time_ms, self.step_secs);
            self.unconsumed_ms -= self.step_ms;
            self.steps += 1;
            steps += 1;
        }

        let alpha = ((self.unconsumed_ms / self.step_ms) as f32).clamp(0.0, MAX_ALPHA);
        self.game.on_draw(surface, &self.viewport, alpha);
    }
}
