//! 2D drawing
//!
//! The game draws through the [`Surface`] trait in CSS pixel coordinates; a
//! surface applies the device pixel ratio itself. Entity positions are
//! blended between the previous and current step and mapped through the
//! viewport.

use glam::Vec2;

use crate::sim::{Aabb, Level};
use crate::sprites::SpriteRegion;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in [0, 1]
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xFFFFFF);
    pub const MAGENTA: Color = Color::from_hex(0xFF00FF);
    pub const GREEN: Color = Color::from_hex(0x00FF00);

    /// From a 0xRRGGBB value, fully opaque
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS colour string, `#rrggbb` when opaque
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a.max(0.0))
        }
    }
}

/// Drawing target plus its size metrics
pub trait Surface {
    /// Decoded image type usable with `draw_image_region`
    type Image;

    /// Physical pixel width
    fn width(&self) -> f32;
    /// Physical pixel height
    fn height(&self) -> f32;
    fn device_pixel_ratio(&self) -> f32;

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color);
    /// Copy `src` out of `image` into the destination rectangle
    fn draw_image_region(
        &mut self,
        image: &Self::Image,
        src: &SpriteRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    );
}

pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::from_hex(0x101018);
    pub const PADDLE: Color = Color::from_hex(0xE0E0E0);
    pub const BALL: Color = Color::WHITE;
    pub const LOADING: Color = Color::from_hex(0x202030);
    pub const LOAD_ERROR: Color = Color::from_hex(0x802020);
    pub const GAME_OVER_SHADE: Color = Color::BLACK.with_alpha(0.6);
}

/// Clear the whole canvas
pub fn clear<S: Surface>(surface: &mut S, viewport: &Viewport) {
    surface.clear_rect(0.0, 0.0, viewport.canvas_width(), viewport.canvas_height());
}

/// Fill the output region with one colour
pub fn fill_output<S: Surface>(surface: &mut S, viewport: &Viewport, color: Color) {
    surface.fill_rect(
        viewport.output_offset_x(),
        viewport.output_offset_y(),
        viewport.output_width(),
        viewport.output_height(),
        color,
    );
}

/// Full canvas in magenta, the region the game draws into in green
pub fn draw_debug_overlay<S: Surface>(surface: &mut S, viewport: &Viewport) {
    surface.fill_rect(
        0.0,
        0.0,
        viewport.canvas_width(),
        viewport.canvas_height(),
        Color::MAGENTA,
    );
    fill_output(surface, viewport, Color::GREEN);
}

/// Map a logical box centred at `center` to an output rectangle
fn output_rect(viewport: &Viewport, center: Vec2, half_extents: Vec2) -> (Vec2, Vec2) {
    let top_left = viewport.to_output(center - half_extents);
    let size = half_extents * 2.0 * viewport.scale();
    (top_left, size)
}

fn draw_box<S: Surface>(surface: &mut S, viewport: &Viewport, center: Vec2, bounds: &Aabb, color: Color) {
    let (pos, size) = output_rect(viewport, center, bounds.half_extents());
    surface.fill_rect(pos.x, pos.y, size.x, size.y, color);
}

/// Draw every alive block, the paddles and the balls at blend factor `alpha`.
///
/// Blocks use their sprite when `atlas` is given and fall back to their
/// fill colour otherwise.
pub fn draw_level<S: Surface>(
    surface: &mut S,
    viewport: &Viewport,
    level: &Level,
    atlas: Option<&S::Image>,
    alpha: f32,
) {
    for block in level.alive_blocks() {
        let center = block.body.interpolated_pos(alpha);
        let def = block.def();
        match (atlas, def.sprite.as_ref()) {
            (Some(image), Some(sprite)) => {
                let (pos, size) = output_rect(viewport, center, block.bounds().half_extents());
                surface.draw_image_region(image, sprite, pos.x, pos.y, size.x, size.y);
            }
            _ => draw_box(surface, viewport, center, block.bounds(), Color::from_hex(def.color)),
        }
    }

    for paddle in &level.paddles {
        let center = paddle.body.interpolated_pos(alpha);
        draw_box(surface, viewport, center, paddle.bounds(), palette::PADDLE);
    }

    for ball in &level.balls {
        let center = viewport.to_output(ball.body.interpolated_pos(alpha));
        surface.fill_circle(center.x, center.y, ball.radius() * viewport.scale(), palette::BALL);
    }
}
