//! Block Breaker - a Breakout clone with a fixed-timestep simulation core
//!
//! Core modules:
//! - `math`: Vector helpers and cardinal directions
//! - `sim`: Bounding volumes, entities, level layout and per-step rules
//! - `viewport`: Fixed render resolution to output surface mapping
//! - `game_loop`: Fixed-step update scheduler with interpolated draw
//! - `resources`: Deduplicated asynchronous asset loading
//! - `renderer`: Drawing surface contract and level drawing
//! - `game`: The block breaker game itself
//! - `input`, `settings`, `sprites`, `error`: Key flags, tunables, atlas regions, errors
//! - `platform`: Browser and headless implementations of the surface contracts

pub mod error;
pub mod game;
pub mod game_loop;
pub mod input;
pub mod math;
pub mod platform;
pub mod renderer;
pub mod resources;
pub mod settings;
pub mod sim;
pub mod sprites;
pub mod viewport;

pub use error::GameError;
pub use game::{BlockBreaker, GamePhase};
pub use game_loop::{Game, GameLoop};
pub use settings::{BallLostPolicy, Settings};
pub use viewport::Viewport;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const STEP_MS: f64 = 1000.0 / 60.0;
    /// Maximum update steps run by a single frame before surplus time is dropped
    pub const MAX_CATCH_UP_STEPS: u32 = 8;

    /// Internal render resolution; the play field uses these logical units
    pub const RENDER_WIDTH: f32 = 800.0;
    pub const RENDER_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    /// Horizontal paddle speed (units/s)
    pub const PADDLE_SPEED: f32 = 400.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 12.0;
    /// Upward speed given to a ball while it sits on the paddle (units/s)
    pub const BALL_FIRE_SPEED: f32 = 350.0;
    /// Horizontal weight of an off-centre paddle hit before renormalizing
    pub const PADDLE_DEFLECTION: f32 = 1.5;
    /// Maximum random horizontal speed added at launch (units/s)
    pub const LAUNCH_SPREAD: f32 = 60.0;

    /// Score for each destroyed block
    pub const POINTS_PER_BLOCK: u32 = 10;

    /// Asset name and location of the block sprite atlas
    pub const BLOCK_ATLAS: &str = "blocks";
    pub const BLOCK_ATLAS_URL: &str = "assets/blocks.png";
}
