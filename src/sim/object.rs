//! Shared entity bookkeeping
//!
//! A `GameObject` owns one precise shape plus a broad-phase box, and keeps the
//! two centred on the same point whenever the position changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::{Aabb, Circle, Shape};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    /// Uniform broad-phase bound for any entity
    aabb: Aabb,
    /// Exact collision shape
    shape: Shape,
    /// Position at the start of the latest fixed step, only read when drawing
    prev: Vec2,
    pub vel: Vec2,
}

impl GameObject {
    pub fn new(shape: Shape) -> Self {
        let aabb = shape.bounding_box();
        Self {
            aabb,
            shape,
            prev: shape.center(),
            vel: Vec2::ZERO,
        }
    }

    pub fn from_aabb(aabb: Aabb) -> Self {
        Self::new(Shape::Aabb(aabb))
    }

    pub fn from_circle(circle: Circle) -> Self {
        Self::new(Shape::Circle(circle))
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.aabb.center
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.aabb.center.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.aabb.center.y
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.aabb.center = pos;
        self.shape.set_center(pos);
    }

    pub fn set_x(&mut self, x: f32) {
        self.set_pos(Vec2::new(x, self.y()));
    }

    pub fn set_y(&mut self, y: f32) {
        self.set_pos(Vec2::new(self.x(), y));
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_pos(self.pos() + delta);
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn prev_pos(&self) -> Vec2 {
        self.prev
    }

    /// Record the current position as the previous one. Called once per
    /// fixed step before anything moves.
    pub fn snapshot(&mut self) {
        self.prev = self.pos();
    }

    /// Blend between the previous and current position for drawing
    pub fn interpolated_pos(&self, alpha: f32) -> Vec2 {
        self.prev.lerp(self.pos(), alpha)
    }
}
