//! Entities and level layout
//!
//! A `Level` owns every block, paddle and ball of the current session and is
//! rebuilt wholesale on reload; during play only entity fields change.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::{Aabb, Circle};
use super::object::GameObject;
use crate::settings::Settings;
use crate::sprites::SpriteRegion;

/// Appearance and behaviour shared by every block of one kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDef {
    /// 0xRRGGBB fill colour, used when the atlas isn't available
    pub color: u32,
    pub sprite: Option<SpriteRegion>,
    /// Solid blocks bounce the ball but are never destroyed
    pub solid: bool,
}

/// Block kinds, indexed by grid value minus one
pub const BLOCK_DEFS: &[BlockDef] = &[
    BlockDef {
        color: 0x3399FF,
        sprite: Some(SpriteRegion::named(0.0, 0.0, 64.0, 32.0, "blue")),
        solid: false,
    },
    BlockDef {
        color: 0x00B300,
        sprite: Some(SpriteRegion::named(64.0, 0.0, 64.0, 32.0, "green")),
        solid: false,
    },
    BlockDef {
        color: 0xCCCC66,
        sprite: Some(SpriteRegion::named(128.0, 0.0, 64.0, 32.0, "yellow")),
        solid: false,
    },
    BlockDef {
        color: 0xFF8000,
        sprite: Some(SpriteRegion::named(192.0, 0.0, 64.0, 32.0, "orange")),
        solid: false,
    },
    BlockDef {
        color: 0x808080,
        sprite: Some(SpriteRegion::named(0.0, 32.0, 64.0, 32.0, "steel")),
        solid: true,
    },
];

/// Built-in layouts, played in order and cycled
pub const LEVELS: &[&[&[u8]]] = &[
    &[
        &[1, 1, 1, 1, 1, 1],
        &[2, 2, 0, 0, 2, 2],
        &[3, 3, 4, 4, 3, 3],
        &[0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0],
    ],
    &[
        &[4, 4, 4, 4, 4, 4, 4, 4],
        &[3, 5, 3, 3, 3, 3, 5, 3],
        &[2, 2, 2, 0, 0, 2, 2, 2],
        &[1, 1, 5, 1, 1, 5, 1, 1],
        &[0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0],
    ],
    &[
        &[5, 1, 1, 1, 1, 1, 1, 5],
        &[0, 2, 2, 2, 2, 2, 2, 0],
        &[0, 0, 3, 3, 3, 3, 0, 0],
        &[0, 0, 0, 4, 4, 0, 0, 0],
    ],
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub body: GameObject,
}

impl Paddle {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            body: GameObject::from_aabb(Aabb::from_center(center, width / 2.0, height / 2.0)),
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        self.body.aabb()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub body: GameObject,
    radius: f32,
    /// Position and velocity follow the paddle until launched
    pub stuck_to_paddle: bool,
}

impl Ball {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            body: GameObject::from_circle(Circle::new(center, radius)),
            radius,
            stuck_to_paddle: true,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub body: GameObject,
    pub alive: bool,
    /// Index into `BLOCK_DEFS`
    def: usize,
}

impl Block {
    pub fn new(bounds: Aabb, def: usize) -> Self {
        debug_assert!(def < BLOCK_DEFS.len());
        Self {
            body: GameObject::from_aabb(bounds),
            alive: true,
            def,
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        self.body.aabb()
    }

    pub fn def(&self) -> &'static BlockDef {
        &BLOCK_DEFS[self.def]
    }

    pub fn is_solid(&self) -> bool {
        self.def().solid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub blocks: Vec<Block>,
    pub paddles: Vec<Paddle>,
    pub balls: Vec<Ball>,
    pub width: f32,
    pub height: f32,
}

impl Level {
    /// Build a level from a grid of block kinds.
    ///
    /// `0` is empty and `n > 0` is `BLOCK_DEFS[n - 1]`. Blocks fill the upper
    /// half of the field: each is `width / columns` wide and
    /// `(height / 2) / rows` tall. The first row's length is taken as the
    /// column count; rows of a different length are reported and truncated
    /// or left short rather than corrected.
    pub fn load<R: AsRef<[u8]>>(grid: &[R], width: f32, height: f32, settings: &Settings) -> Self {
        let row_count = grid.len();
        let col_count = grid.first().map(|row| row.as_ref().len()).unwrap_or(0);

        let block_width = if col_count > 0 { width / col_count as f32 } else { 0.0 };
        let block_height = if row_count > 0 { height / 2.0 / row_count as f32 } else { 0.0 };

        let mut blocks = Vec::new();
        for (row, cells) in grid.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != col_count {
                log::warn!(
                    "Level row {} has {} cells, expected {} (grid is not rectangular)",
                    row,
                    cells.len(),
                    col_count
                );
            }

            for (col, &kind) in cells.iter().enumerate().take(col_count) {
                if kind == 0 {
                    continue;
                }
                let def = kind as usize - 1;
                if def >= BLOCK_DEFS.len() {
                    log::warn!("Unknown block kind {} at row {}, col {}", kind, row, col);
                    continue;
                }
                let bounds = Aabb::new(
                    col as f32 * block_width,
                    row as f32 * block_height,
                    block_width,
                    block_height,
                );
                blocks.push(Block::new(bounds, def));
            }
        }

        let paddle = Paddle::new(
            Vec2::new(width / 2.0, height - settings.paddle_height),
            settings.paddle_width,
            settings.paddle_height,
        );
        let ball_start = Vec2::new(
            paddle.body.x(),
            paddle.bounds().top() - settings.ball_radius,
        );
        let ball = Ball::new(ball_start, settings.ball_radius);

        log::info!(
            "Level loaded: {}x{} grid, {} blocks, field {}x{}",
            col_count,
            row_count,
            blocks.len(),
            width,
            height
        );

        Self {
            blocks,
            paddles: vec![paddle],
            balls: vec![ball],
            width,
            height,
        }
    }

    /// Load one of the built-in layouts (index wraps around)
    pub fn builtin(index: usize, settings: &Settings) -> Self {
        let layout = LEVELS[index % LEVELS.len()];
        Self::load(layout, settings.render_width, settings.render_height, settings)
    }

    pub fn alive_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.alive)
    }

    /// Blocks that still have to be destroyed
    pub fn remaining_breakable(&self) -> usize {
        self.alive_blocks().filter(|b| !b.is_solid()).count()
    }

    /// True once every breakable block is gone. A level with no breakable
    /// blocks is never cleared.
    pub fn is_cleared(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_solid()) && self.remaining_breakable() == 0
    }

    /// Copy every current position into the previous-position slot
    pub fn snapshot(&mut self) {
        for paddle in &mut self.paddles {
            paddle.body.snapshot();
        }
        for ball in &mut self.balls {
            ball.body.snapshot();
        }
        for block in &mut self.blocks {
            block.body.snapshot();
        }
    }
}
