//! Tank Arena - top-down tank combat simulation
//!
//! Core modules:
//! - `sim`: Tank timing, combat, collision, projectiles and decal pools
//! - `fx`: Asset, particle and effect collaborator interfaces
//! - `audio`: Sound effect catalog and mixer
//! - `ai`: Behavior counters consulted by AI controllers
//! - `settings`: Configuration read once at construction time

pub mod ai;
pub mod audio;
pub mod fx;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings, SettingsError};

use glam::{Vec2, Vec3};

/// Simulation constants
pub mod consts {
    /// Scalar applied to velocity each tick (not delta-time scaled)
    pub const INTEGRATION_FACTOR: f32 = 0.55;

    /// Nominal tank footprint used to derive the collision box
    pub const TANK_WIDTH: f32 = 25.0;
    pub const TANK_HEIGHT: f32 = 25.0;
    /// Collision box relative to the tank's 2D position
    pub const TANK_BOX_OFFSET_X: f32 = -9.0;
    pub const TANK_BOX_OFFSET_Y: f32 = -10.0;
    pub const TANK_BOX_WIDTH: f32 = TANK_WIDTH - 8.0;
    pub const TANK_BOX_HEIGHT: f32 = TANK_HEIGHT - 4.0;

    /// Playable rectangle for tank centers
    pub const TANKS_MIN_X: f32 = -234.0;
    pub const TANKS_MAX_X: f32 = 234.0;
    pub const TANKS_MIN_Y: f32 = -48.0;
    pub const TANKS_MAX_Y: f32 = 312.0;

    /// Edge length of a map block
    pub const BLOCK_SIZE: f32 = 21.7;

    /// Distance from tank center to the muzzle
    pub const BARREL_LENGTH: f32 = 20.0;
    /// Height shells travel at
    pub const SHELL_HEIGHT: f32 = 11.0;
    /// Ticks during which a shell ignores its owner
    pub const SHELL_OWNER_GRACE_TICKS: u32 = 5;

    /// Default mine fuse in ticks
    pub const MINE_FUSE_TICKS: u32 = 600;
    /// Blast radius of a detonating mine
    pub const MINE_BLAST_RADIUS: f32 = 65.0;

    /// Decals float slightly above the floor
    pub const DECAL_LIFT: f32 = 0.1;

    /// Hard ceiling for the configurable footprint pool
    pub const MAX_FOOTPRINTS: usize = 100_000;
    /// Fixed death mark pool capacity
    pub const MAX_DEATH_MARKS: usize = 1000;
}

/// Drop the vertical axis: (x, y, z) -> (x, z)
#[inline]
pub fn flatten(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lift a plane vector back into world space at height `y`
#[inline]
pub fn expand(v: Vec2, y: f32) -> Vec3 {
    Vec3::new(v.x, y, v.y)
}

/// Unit vector a turret or hull facing `rotation` points along, in the X/Z plane
#[inline]
pub fn facing(rotation: f32) -> Vec2 {
    Vec2::new(rotation.sin(), rotation.cos())
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_expand() {
        let v = Vec3::new(1.0, 5.0, -2.0);
        assert_eq!(flatten(v), Vec2::new(1.0, -2.0));
        assert_eq!(expand(flatten(v), 5.0), v);
    }

    #[test]
    fn test_facing_zero_points_along_z() {
        let f = facing(0.0);
        assert!(f.x.abs() < 1e-6);
        assert!((f.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_angle() {
        use std::f32::consts::PI;
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-4);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-4);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }
}
