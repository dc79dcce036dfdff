//! Tank simulation module
//!
//! All gameplay logic lives here:
//! - Fixed tick, velocities are not delta-time scaled
//! - Seeded RNG only (debris scatter)
//! - Stable iteration order (tanks by id)
//! - No rendering or platform dependencies; effects go through `fx` traits

pub mod collision;
pub mod decal;
pub mod map;
pub mod shell;
pub mod state;
pub mod tank;
pub mod tick;
pub mod timing;

pub use collision::{ArenaBounds, Axis, Rect, Resolution, resolve_box_collision};
pub use decal::{CheckColor, DeathMark, DeathMarkPool, Footprint, FootprintPool};
pub use map::{ArenaMap, Block};
pub use shell::{HomingProperties, Mine, MineId, Shell, ShellId, ShellStep, ShellTier};
pub use state::{SimEvent, Simulation, ViewContext};
pub use tank::{ControllerKind, PlayerType, Tank, TankId, TankStats, Team, UpdateContext};
pub use tick::nearest_enemy;
pub use timing::{ActionDurations, ActionTimers, IDLE_START};
