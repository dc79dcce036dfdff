//! Tank entity: movement, combat actions and destruction
//!
//! Player and AI tanks share this type; they differ only in
//! [`ControllerKind`], which picks the death mark color and sounds. Input
//! and AI decisions arrive from outside through [`Tank::steer`], turret
//! rotation, and the combat calls on `Simulation`.

use std::f32::consts::TAU;

use glam::{Mat4, Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, resolve_box_collision};
use super::decal::{CheckColor, DeathMarkPool, FootprintPool};
use super::map::ArenaMap;
use super::shell::{HomingProperties, Mine, MineId, Shell, ShellId, ShellTier};
use super::state::ViewContext;
use super::timing::{ActionDurations, ActionTimers};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::fx::{AssetError, Color, Effects, Particle, ParticleBehavior, names};
use crate::{expand, facing, flatten, normalize_angle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TankId(pub u32);

/// Which player seat controls a player tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerType {
    Blue,
    Red,
}

/// Source of a tank's input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerKind {
    Ai,
    Player(PlayerType),
}

impl ControllerKind {
    /// Death mark tint for tanks of this controller
    pub fn check_color(&self) -> CheckColor {
        match self {
            ControllerKind::Ai => CheckColor::White,
            ControllerKind::Player(PlayerType::Blue) => CheckColor::Blue,
            ControllerKind::Player(PlayerType::Red) => CheckColor::Red,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, ControllerKind::Player(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Team {
    #[default]
    NoTeam,
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Cyan,
    Magenta,
}

/// Stat profile applied when a tank is created
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankStats {
    pub acceleration: f32,
    pub deceleration: f32,
    pub max_speed: f32,
    /// Radians per tick the hull can turn
    pub turning_speed: f32,
    /// Heading error above which the tank pivots in place
    pub maximal_turn: f32,
    pub shell_speed: f32,
    pub shell_tier: ShellTier,
    pub ricochet_count: u32,
    pub homing: HomingProperties,
    pub shell_limit: u32,
    pub mine_limit: u32,
    pub timing: ActionDurations,
    pub stationary: bool,
    pub has_turret: bool,
    pub can_lay_tread: bool,
    pub destruction_color: Color,
}

impl Default for TankStats {
    fn default() -> Self {
        Self::ai_default()
    }
}

impl TankStats {
    pub fn player() -> Self {
        Self {
            acceleration: 0.3,
            deceleration: 0.6,
            max_speed: 1.8,
            turning_speed: 0.1,
            maximal_turn: 0.8,
            shell_speed: 3.0,
            shell_tier: ShellTier::Standard,
            ricochet_count: 1,
            homing: HomingProperties::default(),
            shell_limit: 5,
            mine_limit: 2,
            timing: ActionDurations {
                shoot_stun: 5,
                shoot_cooldown: 5,
                mine_stun: 8,
                mine_cooldown: 6,
            },
            stationary: false,
            has_turret: true,
            can_lay_tread: true,
            destruction_color: Color::rgb(0, 0, 255),
        }
    }

    pub fn ai_default() -> Self {
        Self {
            acceleration: 0.3,
            deceleration: 0.6,
            max_speed: 1.0,
            turning_speed: 0.08,
            maximal_turn: 0.5,
            shell_speed: 3.0,
            shell_tier: ShellTier::Standard,
            ricochet_count: 1,
            homing: HomingProperties::default(),
            shell_limit: 1,
            mine_limit: 0,
            timing: ActionDurations {
                shoot_stun: 5,
                shoot_cooldown: 180,
                mine_stun: 0,
                mine_cooldown: 0,
            },
            stationary: false,
            has_turret: true,
            can_lay_tread: true,
            destruction_color: Color::rgb(152, 96, 26),
        }
    }
}

/// Per-tick inputs for [`Tank::update`]
pub struct UpdateContext<'a, 'fx> {
    pub view: &'a ViewContext,
    /// Collision boxes of the other live tanks
    pub peers: &'a [Rect],
    pub map: &'a ArenaMap,
    pub footprints: &'a mut FootprintPool,
    pub fx: &'a mut Effects<'fx>,
    /// Ticks of travel between footprints (0 disables treads)
    pub footprint_interval: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: TankId,
    pub controller: ControllerKind,
    pub team: Team,

    /// World position; Y is render height only
    pub position: Vec3,
    /// Plane velocity stored in X/Z
    pub velocity: Vec3,
    pub tank_rotation: f32,
    pub turret_rotation: f32,

    pub acceleration: f32,
    pub deceleration: f32,
    /// Current speed
    pub speed: f32,
    pub max_speed: f32,
    pub turning_speed: f32,
    pub maximal_turn: f32,

    pub shell_speed: f32,
    pub shell_tier: ShellTier,
    pub ricochet_count: u32,
    pub homing: HomingProperties,
    pub shell_limit: u32,
    pub mine_limit: u32,
    owned_shells: u32,
    owned_mines: u32,

    timers: ActionTimers,

    dead: bool,
    /// Participates in the running mission (collision, clamping, stationary freeze)
    pub in_mission: bool,
    pub stationary: bool,
    pub has_turret: bool,
    pub can_lay_tread: bool,
    pub is_turning: bool,
    pub destruction_color: Color,

    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,

    tread_ticks: u32,
}

impl Tank {
    pub fn new(
        id: TankId,
        controller: ControllerKind,
        team: Team,
        position: Vec3,
        stats: &TankStats,
    ) -> Self {
        Self {
            id,
            controller,
            team,
            position,
            velocity: Vec3::ZERO,
            tank_rotation: 0.0,
            turret_rotation: 0.0,
            acceleration: stats.acceleration,
            deceleration: stats.deceleration,
            speed: 0.0,
            max_speed: stats.max_speed,
            turning_speed: stats.turning_speed,
            maximal_turn: stats.maximal_turn,
            shell_speed: stats.shell_speed,
            shell_tier: stats.shell_tier,
            ricochet_count: stats.ricochet_count,
            homing: stats.homing,
            shell_limit: stats.shell_limit,
            mine_limit: stats.mine_limit,
            owned_shells: 0,
            owned_mines: 0,
            timers: ActionTimers::new(stats.timing),
            dead: false,
            in_mission: true,
            stationary: stats.stationary,
            has_turret: stats.has_turret,
            can_lay_tread: stats.can_lay_tread,
            is_turning: false,
            destruction_color: stats.destruction_color,
            world: Mat4::from_translation(position),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            tread_ticks: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn owned_shells(&self) -> u32 {
        self.owned_shells
    }

    pub fn owned_mines(&self) -> u32 {
        self.owned_mines
    }

    pub fn timers(&self) -> &ActionTimers {
        &self.timers
    }

    pub fn position2d(&self) -> Vec2 {
        flatten(self.position)
    }

    pub fn velocity2d(&self) -> Vec2 {
        flatten(self.velocity)
    }

    pub fn collision_box(&self) -> Rect {
        let p = self.position2d();
        Rect::from_xywh(
            p.x + TANK_BOX_OFFSET_X,
            p.y + TANK_BOX_OFFSET_Y,
            TANK_BOX_WIDTH,
            TANK_BOX_HEIGHT,
        )
    }

    /// Stunned by a recent shot or mine
    pub fn is_stunned(&self) -> bool {
        self.timers.is_stunned()
    }

    pub fn general_stats(&self) -> String {
        format!(
            "Pos2D: {} | Vel: {} | Dead: {}",
            self.position2d(),
            self.velocity2d(),
            self.dead
        )
    }

    /// Turn movement input into velocity. Zero input decelerates.
    pub fn steer(&mut self, input: Vec2) {
        if self.dead {
            return;
        }

        if input.length_squared() < 1e-6 {
            self.is_turning = false;
            self.speed = (self.speed - self.deceleration).max(0.0);
            let dir = self.velocity2d().normalize_or_zero();
            self.velocity = expand(dir * self.speed, 0.0);
            return;
        }

        let dir = input.normalize();
        let target = dir.x.atan2(dir.y);
        let diff = normalize_angle(target - self.tank_rotation);
        self.is_turning = diff.abs() > f32::EPSILON;
        self.tank_rotation =
            normalize_angle(self.tank_rotation + diff.clamp(-self.turning_speed, self.turning_speed));

        if diff.abs() > self.maximal_turn {
            // Pivot in place
            self.speed = 0.0;
        } else {
            self.speed = (self.speed + self.acceleration).min(self.max_speed);
        }
        self.velocity = expand(facing(self.tank_rotation) * self.speed, 0.0);
    }

    /// Aim the turret at a point on the floor
    pub fn aim_at(&mut self, target: Vec2) {
        let d = target - self.position2d();
        if d.length_squared() > 0.0 {
            self.turret_rotation = d.x.atan2(d.y).rem_euclid(TAU);
        }
    }

    /// Advance one simulation tick
    pub fn update(&mut self, ctx: &mut UpdateContext<'_, '_>) -> Result<(), AssetError> {
        if self.dead {
            return Ok(());
        }

        if self.in_mission {
            self.view = ctx.view.view;
            self.projection = ctx.view.projection;
        }

        self.timers.tick();

        if self.timers.is_stunned() || (self.stationary && self.in_mission) {
            self.velocity = Vec3::ZERO;
        }

        self.world = Mat4::from_translation(self.position) * Mat4::from_rotation_y(-self.tank_rotation);

        self.position += self.velocity * INTEGRATION_FACTOR;

        if self.in_mission {
            self.update_collision(ctx.peers, ctx.map);
        }

        if ctx.footprint_interval > 0 && self.velocity2d().length_squared() > 1e-6 {
            self.tread_ticks += 1;
            if self.tread_ticks >= ctx.footprint_interval {
                self.tread_ticks = 0;
                let alternate = self.is_turning;
                self.lay_footprint(alternate, ctx.footprints, ctx.fx)?;
            }
        }

        Ok(())
    }

    /// Resolve against other tanks then blocks, in order, then clamp
    pub fn update_collision(&mut self, peers: &[Rect], map: &ArenaMap) {
        for obstacle in peers.iter().chain(map.obstacles()) {
            let res =
                resolve_box_collision(&self.collision_box(), obstacle, self.velocity2d(), self.position);
            self.position = res.position;
            self.velocity.x = res.velocity.x;
            self.velocity.z = res.velocity.y;
        }
        self.position = map.bounds.clamp(self.position);
    }

    /// Leave a tread mark under the tank
    pub fn lay_footprint(
        &mut self,
        alternate: bool,
        footprints: &mut FootprintPool,
        fx: &mut Effects<'_>,
    ) -> Result<Option<usize>, AssetError> {
        if self.dead || !self.can_lay_tread {
            return Ok(None);
        }

        let model = fx.model(names::FOOTPRINT_MODEL)?;
        let texture = fx.texture(if alternate {
            names::FOOTPRINT_ALT_TEXTURE
        } else {
            names::FOOTPRINT_TEXTURE
        })?;
        let sound = fx.sound(SoundEffect::Tread)?;

        let slot = footprints.create(
            self.position + Vec3::new(0.0, DECAL_LIFT, 0.0),
            -self.tank_rotation,
            alternate,
            model,
            texture,
        );
        fx.play(SoundEffect::Tread, sound);
        Ok(slot)
    }

    /// Fire a shell along the turret. `None` when any precondition fails.
    pub fn fire(
        &mut self,
        id: ShellId,
        mission_active: bool,
        fx: &mut Effects<'_>,
    ) -> Result<Option<Shell>, AssetError> {
        if self.dead || !mission_active || !self.has_turret {
            return Ok(None);
        }
        if !self.timers.can_fire(self.owned_shells, self.shell_limit) {
            return Ok(None);
        }

        let hit_tex = fx.texture(names::HIT_TEXTURE)?;
        let smoke_tex = fx.texture(names::SMOKE_TEXTURE)?;
        let sound = fx.sound(SoundEffect::Shoot)?;

        let dir = facing(self.turret_rotation);
        let muzzle = self.position2d() + dir * BARREL_LENGTH;
        let shell = Shell {
            id,
            owner: self.id,
            position: expand(muzzle, SHELL_HEIGHT),
            velocity: expand(dir * self.shell_speed, 0.0),
            tier: self.shell_tier,
            ricochets: self.ricochet_count,
            homing: self.homing,
            age: 0,
        };

        fx.spawn(
            Particle::new(shell.position, hit_tex)
                .facing_camera()
                .with_scale(0.5),
            ParticleBehavior::MuzzleFlash,
        );
        fx.spawn(
            Particle::new(shell.position, smoke_tex)
                .facing_camera()
                .with_scale(0.35)
                .with_color(Color::EMBER)
                .opaque(),
            ParticleBehavior::MuzzleSmoke { target: 80, step: 1 },
        );
        fx.play(SoundEffect::Shoot, sound);

        self.owned_shells += 1;
        self.timers.on_fire();
        log::trace!("Tank {} fired shell {} ({} owned)", self.id.0, id.0, self.owned_shells);
        Ok(Some(shell))
    }

    /// Lay a mine under the tank. `None` when any precondition fails.
    pub fn lay_mine(
        &mut self,
        id: MineId,
        fuse: u32,
        fx: &mut Effects<'_>,
    ) -> Result<Option<Mine>, AssetError> {
        if self.dead {
            return Ok(None);
        }
        if !self.timers.can_lay_mine(self.owned_mines, self.mine_limit) {
            return Ok(None);
        }

        let sound = fx.sound(SoundEffect::MinePlace)?;
        let flash_tex = fx.texture(names::HIT_TEXTURE)?;

        self.timers.on_mine();
        self.owned_mines += 1;

        fx.play(SoundEffect::MinePlace, sound);
        fx.spawn(
            Particle::new(self.position + Vec3::new(0.0, DECAL_LIFT, 0.0), flash_tex)
                .facing_camera()
                .with_scale(0.4),
            ParticleBehavior::Fade { rate: 0.08 },
        );

        log::trace!("Tank {} laid mine {} ({} owned)", self.id.0, id.0, self.owned_mines);
        Ok(Some(Mine {
            id,
            owner: self.id,
            position: self.position,
            fuse,
        }))
    }

    /// Hand back a shell slot after one of this tank's shells is destroyed
    pub(crate) fn release_shell(&mut self) {
        self.owned_shells = self.owned_shells.saturating_sub(1);
    }

    /// Hand back a mine slot after one of this tank's mines is gone
    pub(crate) fn release_mine(&mut self) {
        self.owned_mines = self.owned_mines.saturating_sub(1);
    }

    /// Destroy the tank. Only the first call has any effect; returns whether
    /// this call was it.
    pub fn destroy<R: Rng + ?Sized>(
        &mut self,
        fx: &mut Effects<'_>,
        marks: &mut DeathMarkPool,
        rng: &mut R,
    ) -> Result<bool, AssetError> {
        if self.dead {
            return Ok(false);
        }

        let color = self.controller.check_color();
        let destroy_sound = fx.sound(SoundEffect::TankDestroy)?;
        let layer = if self.controller.is_player() {
            SoundEffect::PlayerDestroyed
        } else {
            SoundEffect::EnemyDestroyed
        };
        let layer_sound = fx.sound(layer)?;
        let check_model = fx.model(names::CHECK_MODEL)?;
        let check_tex = fx.texture(color.texture_name())?;
        let rock_tex = fx.texture(names::ROCK_TEXTURE)?;
        let rock_alt_tex = fx.texture(names::ROCK_ALT_TEXTURE)?;
        let hit_tex = fx.texture(names::HIT_TEXTURE)?;
        let smoke_tex = fx.texture(names::SMOKE_TEXTURE)?;

        self.dead = true;
        self.velocity = Vec3::ZERO;

        fx.play(SoundEffect::TankDestroy, destroy_sound);
        fx.play(layer, layer_sound);

        marks.create(
            self.position + Vec3::new(0.0, DECAL_LIFT, 0.0),
            color,
            check_model,
            check_tex,
        );

        for _ in 0..12 {
            let tex = if rng.random_bool(0.5) { rock_tex } else { rock_alt_tex };
            let velocity = Vec3::new(
                rng.random_range(-3.0..3.0),
                rng.random_range(3.0..6.0),
                rng.random_range(-3.0..3.0),
            );
            fx.spawn(
                Particle::new(self.position, tex)
                    .facing_camera()
                    .with_scale(0.55)
                    .with_color(self.destruction_color)
                    .opaque(),
                ParticleBehavior::Debris { velocity },
            );
        }

        fx.spawn(
            Particle::new(self.position, hit_tex)
                .with_scale(5.0)
                .with_color(Color::YELLOW.scaled(0.75))
                .in_screen_space(),
            ParticleBehavior::Shockwave,
        );

        const SMOKE_PUFFS: usize = 8;
        for i in 0..SMOKE_PUFFS {
            let angle = (360.0 / SMOKE_PUFFS as f32 * i as f32).to_radians();
            let velocity = Vec3::new(-angle.sin(), 0.0, angle.cos()) / 2.0;
            let mut puff = Particle::new(self.position, smoke_tex)
                .facing_camera()
                .with_scale(0.8)
                .with_color(Color::DARK_ORANGE)
                .opaque();
            puff.position.y += 5.0;
            fx.spawn(puff, ParticleBehavior::SmokeRing { velocity });
        }

        log::debug!("Tank {} destroyed at {}", self.id.0, self.position2d());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioMixer;
    use crate::fx::{AssetCatalog, AssetKind, ParticleField};
    use crate::sim::collision::ArenaBounds;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Harness {
        assets: AssetCatalog,
        audio: AudioMixer,
        particles: ParticleField,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                assets: AssetCatalog::with_defaults(),
                audio: AudioMixer::new(),
                particles: ParticleField::new(1000),
            }
        }

        fn fx(&mut self) -> Effects<'_> {
            Effects::new(&self.assets, &mut self.audio, &mut self.particles)
        }
    }

    fn stats(shell_limit: u32, mine_limit: u32) -> TankStats {
        TankStats {
            shell_limit,
            mine_limit,
            timing: ActionDurations {
                shoot_stun: 2,
                shoot_cooldown: 0,
                mine_stun: 3,
                mine_cooldown: 4,
            },
            ..TankStats::ai_default()
        }
    }

    fn tank(stats: &TankStats) -> Tank {
        Tank::new(TankId(1), ControllerKind::Ai, Team::Red, Vec3::ZERO, stats)
    }

    fn open_map() -> ArenaMap {
        ArenaMap::new(ArenaBounds {
            min: Vec2::splat(-1000.0),
            max: Vec2::splat(1000.0),
        })
    }

    fn run_update(t: &mut Tank, h: &mut Harness, peers: &[Rect], map: &ArenaMap) {
        let view = ViewContext::default();
        let mut footprints = FootprintPool::new(16);
        let mut fx = h.fx();
        let mut ctx = UpdateContext {
            view: &view,
            peers,
            map,
            footprints: &mut footprints,
            fx: &mut fx,
            footprint_interval: 0,
        };
        t.update(&mut ctx).unwrap();
    }

    #[test]
    fn test_fire_until_limit() {
        let mut h = Harness::new();
        let mut t = tank(&stats(2, 0));

        assert!(t.fire(ShellId(1), true, &mut h.fx()).unwrap().is_some());
        assert_eq!(t.owned_shells(), 1);
        assert!(t.fire(ShellId(2), true, &mut h.fx()).unwrap().is_some());
        assert_eq!(t.owned_shells(), 2);
        assert!(t.fire(ShellId(3), true, &mut h.fx()).unwrap().is_none());
        assert_eq!(t.owned_shells(), 2);

        t.release_shell();
        assert!(t.fire(ShellId(3), true, &mut h.fx()).unwrap().is_some());
        assert_eq!(t.owned_shells(), 2);
    }

    #[test]
    fn test_fire_sets_timers() {
        let mut h = Harness::new();
        let s = TankStats {
            timing: ActionDurations {
                shoot_stun: 4,
                shoot_cooldown: 9,
                mine_stun: 0,
                mine_cooldown: 0,
            },
            ..stats(3, 0)
        };
        let mut t = tank(&s);
        t.fire(ShellId(1), true, &mut h.fx()).unwrap();
        assert_eq!(t.timers().shoot_stun(), 4);
        assert_eq!(t.timers().shoot_cooldown(), 9);
        assert_eq!(t.timers().time_since_last_action(), 0);
        // Two particles and one sound
        assert_eq!(h.particles.len(), 2);
        assert_eq!(h.audio.pending().len(), 1);
    }

    #[test]
    fn test_fire_preconditions_leave_state_untouched() {
        let mut h = Harness::new();

        let mut no_turret = tank(&TankStats {
            has_turret: false,
            ..stats(3, 0)
        });
        assert!(no_turret.fire(ShellId(1), true, &mut h.fx()).unwrap().is_none());
        assert_eq!(no_turret.owned_shells(), 0);

        let mut out_of_mission = tank(&stats(3, 0));
        assert!(out_of_mission.fire(ShellId(1), false, &mut h.fx()).unwrap().is_none());
        assert_eq!(out_of_mission.timers().shoot_stun(), 0);

        assert!(h.particles.is_empty());
        assert!(h.audio.pending().is_empty());
    }

    #[test]
    fn test_fire_direction_follows_turret() {
        let mut h = Harness::new();
        let mut t = tank(&stats(1, 0));
        t.shell_speed = 2.0;
        t.turret_rotation = std::f32::consts::FRAC_PI_2;
        let shell = t.fire(ShellId(1), true, &mut h.fx()).unwrap().unwrap();
        assert!((shell.velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((shell.position - Vec3::new(BARREL_LENGTH, SHELL_HEIGHT, 0.0)).length() < 1e-4);
        assert_eq!(shell.owner, TankId(1));
        assert_eq!(shell.ricochets, t.ricochet_count);
    }

    #[test]
    fn test_fire_during_cooldown_changes_nothing() {
        let mut h = Harness::new();
        let mut t = tank(&TankStats {
            timing: ActionDurations {
                shoot_stun: 2,
                shoot_cooldown: 9,
                mine_stun: 0,
                mine_cooldown: 0,
            },
            ..stats(3, 0)
        });
        assert!(t.fire(ShellId(1), true, &mut h.fx()).unwrap().is_some());
        run_update(&mut t, &mut h, &[], &open_map());

        let timers = t.timers().clone();
        let particles = h.particles.len();
        let sounds = h.audio.pending().len();
        assert!(t.timers().shoot_cooldown() > 0);

        assert!(t.fire(ShellId(2), true, &mut h.fx()).unwrap().is_none());
        assert_eq!(t.timers(), &timers);
        assert_eq!(t.owned_shells(), 1);
        assert_eq!(h.particles.len(), particles);
        assert_eq!(h.audio.pending().len(), sounds);
    }

    #[test]
    fn test_fire_with_missing_asset_fails_cleanly() {
        let mut h = Harness::new();
        h.assets.remove(AssetKind::Texture, names::SMOKE_TEXTURE);
        let mut t = tank(&stats(1, 0));
        assert!(t.fire(ShellId(1), true, &mut h.fx()).is_err());
        assert_eq!(t.owned_shells(), 0);
        assert_eq!(t.timers().shoot_stun(), 0);
    }

    #[test]
    fn test_lay_mine_respects_cooldown_and_limit() {
        let mut h = Harness::new();
        let mut t = tank(&stats(1, 2));
        let mine = t.lay_mine(MineId(1), 600, &mut h.fx()).unwrap().unwrap();
        assert_eq!(mine.owner, t.id);
        assert_eq!(mine.fuse, 600);
        assert_eq!(t.owned_mines(), 1);
        assert_eq!(t.timers().mine_stun(), 3);

        // Cooldown of 4 blocks the next mine
        assert!(t.lay_mine(MineId(2), 600, &mut h.fx()).unwrap().is_none());
        let map = open_map();
        for _ in 0..4 {
            run_update(&mut t, &mut h, &[], &map);
        }
        assert!(t.lay_mine(MineId(2), 600, &mut h.fx()).unwrap().is_some());
        assert_eq!(t.owned_mines(), 2);

        for _ in 0..4 {
            run_update(&mut t, &mut h, &[], &map);
        }
        assert!(t.lay_mine(MineId(3), 600, &mut h.fx()).unwrap().is_none());
        assert_eq!(t.owned_mines(), 2);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut h = Harness::new();
        let mut marks = DeathMarkPool::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut t = tank(&stats(1, 0));

        assert!(t.destroy(&mut h.fx(), &mut marks, &mut rng).unwrap());
        let particles = h.particles.len();
        let sounds = h.audio.pending().len();
        assert!(!t.destroy(&mut h.fx(), &mut marks, &mut rng).unwrap());

        assert!(t.is_dead());
        assert_eq!(marks.len(), 1);
        assert_eq!(particles, 12 + 1 + 8);
        assert_eq!(h.particles.len(), particles);
        assert_eq!(sounds, 2);
        assert_eq!(h.audio.pending().len(), sounds);
    }

    #[test]
    fn test_death_mark_color_follows_controller() {
        let mut h = Harness::new();
        let mut marks = DeathMarkPool::new();
        let mut rng = Pcg32::seed_from_u64(7);

        let s = stats(1, 0);
        let mut ai = Tank::new(TankId(1), ControllerKind::Ai, Team::Red, Vec3::ZERO, &s);
        let mut red = Tank::new(
            TankId(2),
            ControllerKind::Player(PlayerType::Red),
            Team::Red,
            Vec3::new(10.0, 0.0, 0.0),
            &s,
        );
        let mut blue = Tank::new(
            TankId(3),
            ControllerKind::Player(PlayerType::Blue),
            Team::Blue,
            Vec3::new(-10.0, 0.0, 0.0),
            &s,
        );
        ai.destroy(&mut h.fx(), &mut marks, &mut rng).unwrap();
        red.destroy(&mut h.fx(), &mut marks, &mut rng).unwrap();
        blue.destroy(&mut h.fx(), &mut marks, &mut rng).unwrap();

        assert_eq!(marks.get(0).unwrap().color, CheckColor::White);
        assert_eq!(marks.get(1).unwrap().color, CheckColor::Red);
        assert_eq!(marks.get(2).unwrap().color, CheckColor::Blue);
        assert_eq!(marks.get(2).unwrap().location.x, -10.0);
        assert!((marks.get(1).unwrap().location.y - DECAL_LIFT).abs() < 1e-6);
    }

    #[test]
    fn test_dead_tank_ignores_everything() {
        let mut h = Harness::new();
        let mut marks = DeathMarkPool::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut t = tank(&stats(3, 3));
        t.velocity = Vec3::new(1.0, 0.0, 0.0);
        t.destroy(&mut h.fx(), &mut marks, &mut rng).unwrap();
        let before = t.position;

        t.steer(Vec2::X);
        run_update(&mut t, &mut h, &[], &open_map());
        assert_eq!(t.position, before);
        assert!(t.fire(ShellId(1), true, &mut h.fx()).unwrap().is_none());
        assert!(t.lay_mine(MineId(1), 600, &mut h.fx()).unwrap().is_none());
        assert_eq!(t.owned_shells(), 0);
        assert_eq!(t.owned_mines(), 0);
    }

    #[test]
    fn test_update_integrates_velocity() {
        let mut h = Harness::new();
        let mut t = tank(&stats(1, 0));
        t.velocity = Vec3::new(2.0, 0.0, -1.0);
        run_update(&mut t, &mut h, &[], &open_map());
        assert!((t.position - Vec3::new(1.1, 0.0, -0.55)).length() < 1e-5);
    }

    #[test]
    fn test_stun_freezes_movement() {
        let mut h = Harness::new();
        let mut t = tank(&stats(3, 0));
        t.fire(ShellId(1), true, &mut h.fx()).unwrap();
        t.velocity = Vec3::new(1.0, 0.0, 0.0);
        // Stun of 2: still stunned after the first decrement
        run_update(&mut t, &mut h, &[], &open_map());
        assert_eq!(t.position, Vec3::ZERO);
        t.velocity = Vec3::new(1.0, 0.0, 0.0);
        run_update(&mut t, &mut h, &[], &open_map());
        assert!(t.position.x > 0.0);
    }

    #[test]
    fn test_stationary_only_frozen_in_mission() {
        let mut h = Harness::new();
        let mut t = tank(&TankStats {
            stationary: true,
            ..stats(1, 0)
        });
        t.velocity = Vec3::new(1.0, 0.0, 0.0);
        run_update(&mut t, &mut h, &[], &open_map());
        assert_eq!(t.position, Vec3::ZERO);

        t.in_mission = false;
        t.velocity = Vec3::new(1.0, 0.0, 0.0);
        run_update(&mut t, &mut h, &[], &open_map());
        assert!(t.position.x > 0.0);
    }

    #[test]
    fn test_collision_against_peer_box() {
        let mut h = Harness::new();
        let mut t = tank(&stats(1, 0));
        t.velocity = Vec3::new(2.0, 0.0, 0.0);
        // Peer box directly to the right, overlapping after the move
        let peer = Rect::from_xywh(8.5, -10.0, 17.0, 21.0);
        run_update(&mut t, &mut h, &[peer], &open_map());
        assert_eq!(t.velocity.x, 0.0);
        assert!(t.position.x < 1.1);
        assert!(t.collision_box().max.x <= peer.min.x + 1e-4);
    }

    #[test]
    fn test_position_clamped_to_arena() {
        let mut h = Harness::new();
        let mut t = tank(&stats(1, 0));
        t.position = Vec3::new(TANKS_MAX_X - 0.1, 0.0, 0.0);
        t.velocity = Vec3::new(5.0, 0.0, 0.0);
        run_update(&mut t, &mut h, &[], &ArenaMap::default());
        assert_eq!(t.position.x, TANKS_MAX_X);
    }

    #[test]
    fn test_out_of_mission_skips_collision() {
        let mut h = Harness::new();
        let mut t = tank(&stats(1, 0));
        t.in_mission = false;
        t.position = Vec3::new(TANKS_MAX_X, 0.0, 0.0);
        t.velocity = Vec3::new(5.0, 0.0, 0.0);
        run_update(&mut t, &mut h, &[], &ArenaMap::default());
        assert!(t.position.x > TANKS_MAX_X);
    }

    #[test]
    fn test_steer_accelerates_to_max_speed() {
        let mut t = tank(&stats(1, 0));
        for _ in 0..10 {
            t.steer(Vec2::new(0.0, 1.0));
        }
        assert!((t.speed - t.max_speed).abs() < 1e-6);
        assert!((t.velocity - Vec3::new(0.0, 0.0, t.max_speed)).length() < 1e-5);

        t.steer(Vec2::ZERO);
        assert!((t.speed - (t.max_speed - t.deceleration)).abs() < 1e-6);
        assert!(!t.is_turning);
    }

    #[test]
    fn test_steer_pivots_on_sharp_turn() {
        let mut t = tank(&stats(1, 0));
        t.steer(Vec2::new(0.0, -1.0));
        assert_eq!(t.speed, 0.0);
        assert!(t.is_turning);
        assert!((t.tank_rotation.abs() - t.turning_speed).abs() < 1e-6);
    }

    #[test]
    fn test_footprints_laid_while_moving() {
        let mut h = Harness::new();
        let mut t = tank(&stats(1, 0));
        let map = open_map();
        let view = ViewContext::default();
        let mut footprints = FootprintPool::new(16);
        for _ in 0..6 {
            t.velocity = Vec3::new(0.0, 0.0, 1.0);
            let mut fx = h.fx();
            let mut ctx = UpdateContext {
                view: &view,
                peers: &[],
                map: &map,
                footprints: &mut footprints,
                fx: &mut fx,
                footprint_interval: 3,
            };
            t.update(&mut ctx).unwrap();
        }
        assert_eq!(footprints.len(), 2);
        assert!(footprints.iter().all(|f| !f.alternate));
    }

    #[test]
    fn test_no_tread_when_disabled() {
        let mut h = Harness::new();
        let mut t = tank(&TankStats {
            can_lay_tread: false,
            ..stats(1, 0)
        });
        let mut pool = FootprintPool::new(4);
        assert_eq!(t.lay_footprint(false, &mut pool, &mut h.fx()).unwrap(), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_general_stats() {
        let t = tank(&stats(1, 0));
        let s = t.general_stats();
        assert!(s.starts_with("Pos2D: "));
        assert!(s.ends_with("Dead: false"));
    }

    #[test]
    fn test_aim_at() {
        let mut t = tank(&stats(1, 0));
        t.aim_at(Vec2::new(10.0, 0.0));
        assert!((t.turret_rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
