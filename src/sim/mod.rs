//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity index)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod object;
pub mod state;
pub mod tick;

pub use bounds::{
    Aabb, Circle, Shape, aabb_aabb_intersects, circle_aabb_intersects, resolve_aabb_aabb,
    resolve_circle_aabb,
};
pub use object::GameObject;
pub use state::{BLOCK_DEFS, Ball, Block, BlockDef, LEVELS, Level, Paddle};
pub use tick::{GameEvent, TickInput, tick};
