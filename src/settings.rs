//! Game settings
//!
//! Tunables for the simulation and the frontend. Nothing is persisted; the
//! native binary may read a JSON file, the web build uses the defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// What happens when the ball leaves through the bottom of the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BallLostPolicy {
    /// Rebuild the current level immediately and keep playing
    #[default]
    ReloadLevel,
    /// Stop in a game-over phase until the player launches again
    GameOver,
}

impl BallLostPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallLostPolicy::ReloadLevel => "reload_level",
            BallLostPolicy::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Loop ===
    /// Fixed update step in milliseconds
    pub step_ms: f64,
    /// Cap on update steps run by one frame
    pub max_catch_up_steps: u32,

    // === Field ===
    pub render_width: f32,
    pub render_height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_fire_speed: f32,
    pub paddle_deflection: f32,
    pub launch_spread: f32,
    /// Seed for the launch jitter
    pub seed: u64,

    // === Rules ===
    pub on_ball_lost: BallLostPolicy,

    // === Assets / debug ===
    pub block_atlas_url: String,
    pub debug_overlay: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_ms: STEP_MS,
            max_catch_up_steps: MAX_CATCH_UP_STEPS,

            render_width: RENDER_WIDTH,
            render_height: RENDER_HEIGHT,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,

            ball_radius: BALL_RADIUS,
            ball_fire_speed: BALL_FIRE_SPEED,
            paddle_deflection: PADDLE_DEFLECTION,
            launch_spread: LAUNCH_SPREAD,
            seed: 0x5eed,

            on_ball_lost: BallLostPolicy::ReloadLevel,

            block_atlas_url: BLOCK_ATLAS_URL.to_string(),
            debug_overlay: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        let invalid = |what: &str| Err(GameError::InvalidSettings(what.to_string()));

        if !(self.step_ms > 0.0) {
            return invalid("step_ms must be positive");
        }
        if self.max_catch_up_steps == 0 {
            return invalid("max_catch_up_steps must be at least 1");
        }
        if !(self.render_width > 0.0 && self.render_height > 0.0) {
            return invalid("render size must be positive");
        }
        if !(self.paddle_width > 0.0 && self.paddle_height > 0.0) {
            return invalid("paddle size must be positive");
        }
        if self.paddle_width > self.render_width {
            return invalid("paddle is wider than the field");
        }
        if !(self.ball_radius > 0.0) {
            return invalid("ball_radius must be positive");
        }
        if self.paddle_speed < 0.0 || self.ball_fire_speed < 0.0 || self.launch_spread < 0.0 {
            return invalid("speeds must not be negative");
        }
        Ok(())
    }
}
