//! Bounding volumes and collision resolution
//!
//! Blocks and paddles are axis-aligned boxes, balls are circles. Every query
//! returns `None` on the (common) no-contact path rather than an error.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::distance;

/// Axis-aligned bounding box stored as centre plus half extents
///
/// The centre moves freely; the extents are fixed at construction. Zero
/// extents (lines and points) are valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    half_width: f32,
    half_height: f32,
}

impl Aabb {
    /// Build from the top-left corner and full size
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative AABB extent");
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self {
            center: Vec2::new(left + half_width, top + half_height),
            half_width,
            half_height,
        }
    }

    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        debug_assert!(half_width >= 0.0 && half_height >= 0.0, "negative AABB extent");
        Self {
            center,
            half_width,
            half_height,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.half_width
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.half_width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half_height
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_height
    }

    #[inline]
    pub fn width(&self) -> f32 {
        2.0 * self.half_width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        2.0 * self.half_height
    }
}

/// Circle stored as centre plus radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        debug_assert!(radius >= 0.0, "negative circle radius");
        Self { center, radius }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Smallest box enclosing the circle
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_center(self.center, self.radius, self.radius)
    }
}

/// Precise bounds of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Aabb(Aabb),
    Circle(Circle),
}

impl Shape {
    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Aabb(b) => b.center,
            Shape::Circle(c) => c.center,
        }
    }

    pub fn set_center(&mut self, center: Vec2) {
        match self {
            Shape::Aabb(b) => b.center = center,
            Shape::Circle(c) => c.center = center,
        }
    }

    /// Broad-phase box covering the shape
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Aabb(b) => *b,
            Shape::Circle(c) => c.bounding_box(),
        }
    }

    pub fn intersects(&self, target: &Aabb) -> bool {
        self.resolve(target).is_some()
    }

    /// Penetration of this shape into `target`, using the resolver for the pair
    pub fn resolve(&self, target: &Aabb) -> Option<Vec2> {
        match self {
            Shape::Aabb(b) => resolve_aabb_aabb(b, target),
            Shape::Circle(c) => resolve_circle_aabb(c, target),
        }
    }
}

/// True when the boxes overlap on both axes.
///
/// Touching edges do not count, so two static boxes placed side by side never
/// report a collision.
pub fn aabb_aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    let overlap_x = a.right() > b.left() && b.right() > a.left();
    let overlap_y = a.bottom() > b.top() && b.bottom() > a.top();
    overlap_x && overlap_y
}

/// Size of the overlap region between two boxes, or `None` if they don't intersect.
///
/// Known limitation: when one box fully contains the other the result is the
/// inner box's full size, which is not the minimal separating vector. Callers
/// must not rely on it in that case.
pub fn resolve_aabb_aabb(a: &Aabb, b: &Aabb) -> Option<Vec2> {
    if !aabb_aabb_intersects(a, b) {
        return None;
    }
    let x = a.right().min(b.right()) - a.left().max(b.left());
    let y = a.bottom().min(b.bottom()) - a.top().max(b.top());
    Some(Vec2::new(x, y))
}

/// Offset from the closest point on `b` to the circle centre, when they overlap.
///
/// The closest point is found by clamping the centre-to-centre offset to the
/// box half extents. Contact requires that point to be strictly closer than
/// the radius, so a zero-radius circle never collides. The result is the zero
/// vector when the circle centre lies on or inside the box.
pub fn resolve_circle_aabb(a: &Circle, b: &Aabb) -> Option<Vec2> {
    let diff = a.center - b.center;
    let clamped = diff.clamp(-b.half_extents(), b.half_extents());
    let closest = b.center + clamped;

    if distance(closest, a.center) < a.radius {
        Some(a.center - closest)
    } else {
        None
    }
}

pub fn circle_aabb_intersects(a: &Circle, b: &Aabb) -> bool {
    resolve_circle_aabb(a, b).is_some()
}
