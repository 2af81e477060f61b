//! Vector helpers
//!
//! Plain functions over `Vec2`; nothing here holds state.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    distance_squared(a, b).sqrt()
}

/// Squared distance, cheaper when only comparing
#[inline]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Magnitude of a vector
#[inline]
pub fn length(v: Vec2) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Angle of `v` from the positive x-axis in radians, in [0, 2π)
///
/// A zero-length vector has no direction and yields `None`.
pub fn angle(v: Vec2) -> Option<f32> {
    if length(v) == 0.0 {
        return None;
    }
    let theta = v.y.atan2(v.x).rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative angles
    Some(if theta >= TAU { 0.0 } else { theta })
}

#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// The four cardinal directions, counter-clockwise from the positive x-axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    North,
    West,
    South,
}

/// Closest cardinal direction of `v`, or `None` for a zero-length vector.
///
/// Each direction owns a 90° bucket centred on its axis (East is [-45°, 45°)).
/// A vector lying exactly on a diagonal belongs to the counter-clockwise
/// neighbour, so (1, 1) is North and (1, -1) is East. The buckets are tested
/// with component comparisons rather than a computed angle so diagonals are
/// classified exactly.
pub fn cardinal_direction(v: Vec2) -> Option<Direction> {
    let (x, y) = (v.x, v.y);
    if x == 0.0 && y == 0.0 {
        return None;
    }

    if x > 0.0 && y >= -x && y < x {
        Some(Direction::East)
    } else if y > 0.0 && x > -y && x <= y {
        Some(Direction::North)
    } else if x < 0.0 && y > x && y <= -x {
        Some(Direction::West)
    } else {
        Some(Direction::South)
    }
}
