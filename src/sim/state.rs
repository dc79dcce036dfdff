//! Simulation state: tanks, projectiles, decal pools and collaborators
//!
//! `Simulation` is the single owner of everything a mission touches. Combat
//! actions go through it so projectile bookkeeping (owner counts, id
//! allocation) stays in one place.

use glam::{Mat4, Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::decal::{DeathMarkPool, FootprintPool};
use super::map::ArenaMap;
use super::shell::{Mine, MineId, Shell, ShellId};
use super::tank::{ControllerKind, Tank, TankId, TankStats, Team};
use crate::audio::AudioMixer;
use crate::fx::{AssetCatalog, AssetError, Effects, ParticleField};
use crate::settings::Settings;

/// Camera matrices shared by every tank and decal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewContext {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for ViewContext {
    /// Top-down orthographic camera over the default arena
    fn default() -> Self {
        let center = Vec3::new(0.0, 0.0, 132.0);
        Self {
            view: Mat4::look_at_rh(center + Vec3::new(0.0, 500.0, 0.0), center, Vec3::NEG_Z),
            projection: Mat4::orthographic_rh(-270.0, 270.0, -180.0, 180.0, 1.0, 1000.0),
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    TankDestroyed { tank: TankId },
    ShellExpired { shell: ShellId },
    ShellHit { shell: ShellId, tank: TankId },
    MineDetonated { mine: MineId },
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub settings: Settings,
    pub map: ArenaMap,
    pub view: ViewContext,
    /// Sorted by id; dead tanks stay until the simulation is dropped
    pub(crate) tanks: Vec<Tank>,
    pub(crate) shells: Vec<Shell>,
    pub(crate) mines: Vec<Mine>,
    pub footprints: FootprintPool,
    pub death_marks: DeathMarkPool,
    pub assets: AssetCatalog,
    pub audio: AudioMixer,
    pub particles: ParticleField,
    pub(crate) rng: Pcg32,
    pub(crate) in_mission: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
}

impl Simulation {
    /// Create a simulation with the default asset catalog
    pub fn new(settings: Settings, map: ArenaMap) -> Self {
        Self::with_assets(settings, map, AssetCatalog::with_defaults())
    }

    pub fn with_assets(settings: Settings, map: ArenaMap, assets: AssetCatalog) -> Self {
        log::debug!(
            "Simulation created: seed {}, {} footprints, {} particles",
            settings.seed,
            settings.footprint_capacity(),
            settings.max_particles()
        );
        Self {
            map,
            view: ViewContext::default(),
            tanks: Vec::new(),
            shells: Vec::new(),
            mines: Vec::new(),
            footprints: FootprintPool::new(settings.footprint_capacity()),
            death_marks: DeathMarkPool::new(),
            assets,
            audio: AudioMixer::from_settings(&settings),
            particles: ParticleField::new(settings.max_particles()),
            rng: Pcg32::seed_from_u64(settings.seed),
            in_mission: false,
            time_ticks: 0,
            next_id: 1,
            settings,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn in_mission(&self) -> bool {
        self.in_mission
    }

    /// Begin a mission: clears decals and projectiles
    pub fn start_mission(&mut self) {
        let shells: Vec<ShellId> = self.shells.iter().map(|s| s.id).collect();
        for id in shells {
            self.destroy_shell(id);
        }
        let mines: Vec<MineId> = self.mines.iter().map(|m| m.id).collect();
        for id in mines {
            self.remove_mine(id);
        }
        self.footprints.clear();
        self.death_marks.clear();
        self.in_mission = true;
        for tank in &mut self.tanks {
            tank.in_mission = true;
        }
        log::info!("Mission started with {} tanks", self.live_tanks().count());
    }

    pub fn end_mission(&mut self) {
        self.in_mission = false;
        for tank in &mut self.tanks {
            tank.in_mission = false;
        }
        log::info!(
            "Mission ended after {} ticks, {} tanks alive",
            self.time_ticks,
            self.live_tanks().count()
        );
    }

    pub fn spawn_tank(
        &mut self,
        controller: ControllerKind,
        team: Team,
        position: Vec3,
        stats: &TankStats,
    ) -> TankId {
        let id = TankId(self.next_entity_id());
        let mut tank = Tank::new(id, controller, team, position, stats);
        tank.in_mission = self.in_mission;
        tank.view = self.view.view;
        tank.projection = self.view.projection;
        self.tanks.push(tank);
        log::trace!("Spawned tank {} ({:?}) at {}", id.0, controller, position);
        id
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        self.tanks
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|i| &self.tanks[i])
    }

    pub fn tank_mut(&mut self, id: TankId) -> Option<&mut Tank> {
        self.tanks
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|i| &mut self.tanks[i])
    }

    /// Every tank, dead ones included, in id order
    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn live_tanks(&self) -> impl Iterator<Item = &Tank> {
        self.tanks.iter().filter(|t| !t.is_dead())
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn mines(&self) -> &[Mine] {
        &self.mines
    }

    /// Feed movement input to a tank. False if the tank is unknown or dead.
    pub fn steer(&mut self, id: TankId, input: Vec2) -> bool {
        match self.tank_mut(id) {
            Some(tank) if !tank.is_dead() => {
                tank.steer(input);
                true
            }
            _ => false,
        }
    }

    pub fn fire(&mut self, id: TankId) -> Result<Option<ShellId>, AssetError> {
        let shell_id = ShellId(self.next_id);
        let in_mission = self.in_mission;
        let Some(i) = self.index_of(id) else {
            return Ok(None);
        };
        let mut fx = Effects::new(&self.assets, &mut self.audio, &mut self.particles);
        let Some(shell) = self.tanks[i].fire(shell_id, in_mission, &mut fx)? else {
            return Ok(None);
        };
        self.next_id += 1;
        self.shells.push(shell);
        Ok(Some(shell_id))
    }

    pub fn lay_mine(&mut self, id: TankId) -> Result<Option<MineId>, AssetError> {
        let mine_id = MineId(self.next_id);
        let fuse = self.settings.mine_fuse_ticks;
        let Some(i) = self.index_of(id) else {
            return Ok(None);
        };
        let mut fx = Effects::new(&self.assets, &mut self.audio, &mut self.particles);
        let Some(mine) = self.tanks[i].lay_mine(mine_id, fuse, &mut fx)? else {
            return Ok(None);
        };
        self.next_id += 1;
        self.mines.push(mine);
        Ok(Some(mine_id))
    }

    /// Place a footprint under a tank outside the regular tread cadence
    pub fn lay_footprint(&mut self, id: TankId, alternate: bool) -> Result<Option<usize>, AssetError> {
        let Some(i) = self.index_of(id) else {
            return Ok(None);
        };
        let mut fx = Effects::new(&self.assets, &mut self.audio, &mut self.particles);
        self.tanks[i].lay_footprint(alternate, &mut self.footprints, &mut fx)
    }

    /// Destroy a tank. True only for the call that actually killed it.
    pub fn destroy_tank(&mut self, id: TankId) -> Result<bool, AssetError> {
        let Some(i) = self.index_of(id) else {
            return Ok(false);
        };
        let mut fx = Effects::new(&self.assets, &mut self.audio, &mut self.particles);
        self.tanks[i].destroy(&mut fx, &mut self.death_marks, &mut self.rng)
    }

    /// Remove a shell and return its slot to the owner
    pub fn destroy_shell(&mut self, id: ShellId) -> bool {
        let Some(i) = self.shells.iter().position(|s| s.id == id) else {
            return false;
        };
        let shell = self.shells.remove(i);
        if let Some(owner) = self.tank_mut(shell.owner) {
            owner.release_shell();
        }
        log::trace!("Shell {} removed", id.0);
        true
    }

    /// Remove a mine and return its slot to the owner
    pub fn remove_mine(&mut self, id: MineId) -> bool {
        let Some(i) = self.mines.iter().position(|m| m.id == id) else {
            return false;
        };
        let mine = self.mines.remove(i);
        if let Some(owner) = self.tank_mut(mine.owner) {
            owner.release_mine();
        }
        log::trace!("Mine {} removed", id.0);
        true
    }

    /// Render pass: age decals and step particles
    pub fn render_tick(&mut self) {
        self.footprints.advance(&self.view);
        self.death_marks.advance(&self.view);
        self.particles.advance();
    }

    /// Effect collaborators bundled for a single call
    pub(crate) fn fx(&mut self) -> Effects<'_> {
        Effects::new(&self.assets, &mut self.audio, &mut self.particles)
    }

    pub(crate) fn index_of(&self, id: TankId) -> Option<usize> {
        self.tanks.binary_search_by_key(&id, |t| t.id).ok()
    }
}
