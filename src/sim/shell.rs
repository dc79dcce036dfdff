//! Shells and mines
//!
//! Each projectile remembers the tank that spawned it. Whoever removes a
//! projectile from the simulation is responsible for handing the slot back
//! to its owner (see `Simulation::destroy_shell` / `Simulation::remove_mine`).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::map::ArenaMap;
use super::tank::TankId;
use crate::consts::MINE_BLAST_RADIUS;
use crate::{expand, flatten};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShellId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MineId(pub u32);

/// Shell variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShellTier {
    #[default]
    Standard,
    Rocket,
    RicochetRocket,
    Supressed,
    Explosive,
}

/// Target seeking parameters. Zero power disables homing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HomingProperties {
    /// Blend factor toward the target direction per tick (0.0 - 1.0)
    pub power: f32,
    /// Search radius for targets
    pub radius: f32,
    /// Speed the shell settles at while homing
    pub speed: f32,
    /// Ticks after firing before homing engages
    pub cooldown: u32,
}

impl HomingProperties {
    pub fn is_active(&self, age: u32) -> bool {
        self.power > 0.0 && self.radius > 0.0 && age >= self.cooldown
    }
}

/// Outcome of one shell tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellStep {
    Flying,
    /// Bounced and consumed a ricochet
    Ricocheted,
    /// Hit a wall with no ricochets left
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub id: ShellId,
    pub owner: TankId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub tier: ShellTier,
    /// Bounces left before the next wall hit destroys the shell
    pub ricochets: u32,
    pub homing: HomingProperties,
    /// Ticks since fired
    pub age: u32,
}

impl Shell {
    pub fn position2d(&self) -> Vec2 {
        flatten(self.position)
    }

    pub fn velocity2d(&self) -> Vec2 {
        flatten(self.velocity)
    }

    /// Bend the trajectory toward `target` (already filtered by radius)
    pub fn steer_toward(&mut self, target: Vec2) {
        if !self.homing.is_active(self.age) {
            return;
        }
        let desired = (target - self.position2d()).normalize_or_zero() * self.homing.speed;
        let current = self.velocity2d();
        let steered = current + (desired - current) * self.homing.power.clamp(0.0, 1.0);
        self.velocity = expand(steered, 0.0);
    }

    /// Integrate one tick and bounce off the arena edge and blocks
    pub fn advance(&mut self, map: &ArenaMap) -> ShellStep {
        self.age = self.age.saturating_add(1);

        let old = self.position2d();
        let mut vel = self.velocity2d();
        let mut new = old + vel;
        let mut bounced = false;

        let bounds = &map.bounds;
        if new.x < bounds.min.x || new.x > bounds.max.x {
            vel.x = -vel.x;
            new.x = new.x.clamp(bounds.min.x, bounds.max.x);
            bounced = true;
        }
        if new.y < bounds.min.y || new.y > bounds.max.y {
            vel.y = -vel.y;
            new.y = new.y.clamp(bounds.min.y, bounds.max.y);
            bounced = true;
        }

        if let Some(block) = map.block_at(new) {
            let r = &block.collider;
            // Reflect on the axis the shell crossed into the block from
            let entered_from_side = old.x < r.min.x || old.x > r.max.x;
            if entered_from_side {
                vel.x = -vel.x;
            } else {
                vel.y = -vel.y;
            }
            new = old;
            bounced = true;
        }

        self.position = expand(new, self.position.y);
        self.velocity = expand(vel, self.velocity.y);

        if !bounced {
            return ShellStep::Flying;
        }
        if self.ricochets == 0 {
            return ShellStep::Expired;
        }
        self.ricochets -= 1;
        ShellStep::Ricocheted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mine {
    pub id: MineId,
    pub owner: TankId,
    pub position: Vec3,
    /// Ticks until detonation
    pub fuse: u32,
}

impl Mine {
    /// Count the fuse down. Returns true on the tick the mine goes off.
    pub fn tick(&mut self) -> bool {
        self.fuse = self.fuse.saturating_sub(1);
        self.fuse == 0
    }

    pub fn in_blast(&self, point: Vec2) -> bool {
        flatten(self.position).distance(point) <= MINE_BLAST_RADIUS
    }
}
