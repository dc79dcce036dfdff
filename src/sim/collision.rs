//! Axis-aligned box collision
//!
//! Tanks and blocks are rectangles in the X/Z plane. Overlaps are resolved by
//! pushing the mover out along the axis of least penetration. Obstacles are
//! handled one after another, so a later push may reintroduce overlap with
//! an earlier obstacle.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in the X/Z plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Penetration depth along each axis (non-positive when separated)
    #[inline]
    pub fn overlap(&self, other: &Rect) -> Vec2 {
        Vec2::new(
            self.max.x.min(other.max.x) - self.min.x.max(other.min.x),
            self.max.y.min(other.max.y) - self.min.y.max(other.min.y),
        )
    }
}

/// Axis a collision was resolved on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Result of resolving one mover/obstacle pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Corrected plane velocity
    pub velocity: Vec2,
    /// Corrected world position
    pub position: Vec3,
    /// Axis the mover was pushed along, if the boxes overlapped
    pub axis: Option<Axis>,
    /// Distance pushed
    pub penetration: f32,
}

impl Resolution {
    pub fn hit(&self) -> bool {
        self.axis.is_some()
    }
}

/// Push `mover` out of `obstacle`
///
/// `position` is the mover's world position; its X and Z components move
/// with the box. The velocity component along the push axis is zeroed; the
/// other one is left alone.
pub fn resolve_box_collision(
    mover: &Rect,
    obstacle: &Rect,
    velocity: Vec2,
    position: Vec3,
) -> Resolution {
    let overlap = mover.overlap(obstacle);
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return Resolution {
            velocity,
            position,
            axis: None,
            penetration: 0.0,
        };
    }

    let delta = mover.center() - obstacle.center();
    let mut velocity = velocity;
    let mut position = position;

    if overlap.x <= overlap.y {
        let dir = push_direction(delta.x, velocity.x);
        position.x += dir * overlap.x;
        velocity.x = 0.0;
        Resolution {
            velocity,
            position,
            axis: Some(Axis::X),
            penetration: overlap.x,
        }
    } else {
        let dir = push_direction(delta.y, velocity.y);
        position.z += dir * overlap.y;
        velocity.y = 0.0;
        Resolution {
            velocity,
            position,
            axis: Some(Axis::Y),
            penetration: overlap.y,
        }
    }
}

/// Away from the obstacle; when centered, back against the motion
fn push_direction(center_delta: f32, velocity: f32) -> f32 {
    if center_delta > 0.0 {
        1.0
    } else if center_delta < 0.0 {
        -1.0
    } else if velocity > 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Playable rectangle for tank centers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            min: Vec2::new(TANKS_MIN_X, TANKS_MIN_Y),
            max: Vec2::new(TANKS_MAX_X, TANKS_MAX_Y),
        }
    }
}

impl ArenaBounds {
    /// Clamp a world position's X/Z into the arena
    pub fn clamp(&self, mut position: Vec3) -> Vec3 {
        position.x = position.x.clamp(self.min.x, self.max.x);
        position.z = position.z.clamp(self.min.y, self.max.y);
        position
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}
