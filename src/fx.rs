//! Effect collaborators: assets and particles
//!
//! The simulation never owns asset or particle lifetimes. It looks assets up
//! through [`AssetProvider`] and hands spawn parameters plus a per-tick
//! [`ParticleBehavior`] to a [`ParticleSpawner`].

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Asset categories known to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Model,
    Texture,
    Sound,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Model => "model",
            AssetKind::Texture => "texture",
            AssetKind::Sound => "sound",
        }
    }
}

/// Opaque reference to a loaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub u32);

/// Asset lookup failure. Indicates a packaging defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("missing {} asset `{name}`", .kind.as_str())]
    Missing { kind: AssetKind, name: String },
}

/// Resolves asset names to handles
pub trait AssetProvider {
    fn get(&self, kind: AssetKind, name: &str) -> Result<AssetHandle, AssetError>;
}

/// Asset names referenced by the simulation
pub mod names {
    pub const FOOTPRINT_MODEL: &str = "Assets/footprint";
    pub const FOOTPRINT_TEXTURE: &str = "Assets/textures/tank_footprint";
    pub const FOOTPRINT_ALT_TEXTURE: &str = "Assets/textures/tank_footprint_alt";
    pub const CHECK_MODEL: &str = "Assets/check";
    pub const CHECK_WHITE_TEXTURE: &str = "Assets/textures/check/check_white";
    pub const CHECK_BLUE_TEXTURE: &str = "Assets/textures/check/check_blue";
    pub const CHECK_RED_TEXTURE: &str = "Assets/textures/check/check_red";
    pub const ROCK_TEXTURE: &str = "Assets/textures/misc/tank_rock";
    pub const ROCK_ALT_TEXTURE: &str = "Assets/textures/misc/tank_rock_2";
    pub const HIT_TEXTURE: &str = "Assets/textures/misc/bot_hit";
    pub const SMOKE_TEXTURE: &str = "Assets/textures/misc/tank_smokes";

    pub const MODELS: &[&str] = &[FOOTPRINT_MODEL, CHECK_MODEL];
    pub const TEXTURES: &[&str] = &[
        FOOTPRINT_TEXTURE,
        FOOTPRINT_ALT_TEXTURE,
        CHECK_WHITE_TEXTURE,
        CHECK_BLUE_TEXTURE,
        CHECK_RED_TEXTURE,
        ROCK_TEXTURE,
        ROCK_ALT_TEXTURE,
        HIT_TEXTURE,
        SMOKE_TEXTURE,
    ];
}

/// In-memory asset registry
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    entries: HashMap<(AssetKind, String), AssetHandle>,
    next_handle: u32,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every asset the simulation references
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for name in names::MODELS {
            catalog.register(AssetKind::Model, name);
        }
        for name in names::TEXTURES {
            catalog.register(AssetKind::Texture, name);
        }
        for sound in crate::audio::SoundEffect::ALL {
            catalog.register(AssetKind::Sound, sound.asset_name());
        }
        catalog
    }

    /// Register an asset, returning its handle (existing handle if already known)
    pub fn register(&mut self, kind: AssetKind, name: &str) -> AssetHandle {
        if let Some(handle) = self.entries.get(&(kind, name.to_string())) {
            return *handle;
        }
        let handle = AssetHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert((kind, name.to_string()), handle);
        handle
    }

    /// Forget an asset (for exercising missing-asset paths)
    pub fn remove(&mut self, kind: AssetKind, name: &str) -> Option<AssetHandle> {
        self.entries.remove(&(kind, name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetProvider for AssetCatalog {
    fn get(&self, kind: AssetKind, name: &str) -> Result<AssetHandle, AssetError> {
        self.entries
            .get(&(kind, name.to_string()))
            .copied()
            .ok_or_else(|| AssetError::Missing {
                kind,
                name: name.to_string(),
            })
    }
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const DARK_ORANGE: Color = Color::rgb(255, 140, 0);
    pub const EMBER: Color = Color::rgb(84, 22, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scale every channel (alpha included)
    pub fn scaled(self, factor: f32) -> Self {
        let f = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: f(self.a),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Move `value` toward `target` by at most `step`
pub fn rough_step(value: u8, target: u8, step: u8) -> u8 {
    if value < target {
        value.saturating_add(step).min(target)
    } else {
        value.saturating_sub(step).max(target)
    }
}

/// Identifier of a spawned particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

/// Spawn parameters and live state of one particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub texture: AssetHandle,
    pub scale: Vec3,
    pub color: Color,
    pub opacity: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub additive: bool,
    pub screen_space: bool,
    /// Ticks since spawn
    pub life_time: u32,
}

/// Camera tilt applied to floor-facing particles
pub const ORTHOGRAPHIC_ANGLE: f32 = std::f32::consts::FRAC_PI_2;

impl Particle {
    pub fn new(position: Vec3, texture: AssetHandle) -> Self {
        Self {
            position,
            texture,
            scale: Vec3::ONE,
            color: Color::WHITE,
            opacity: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            additive: true,
            screen_space: false,
            life_time: 0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn opaque(mut self) -> Self {
        self.additive = false;
        self
    }

    pub fn facing_camera(mut self) -> Self {
        self.rotation_x = -ORTHOGRAPHIC_ANGLE;
        self
    }

    pub fn in_screen_space(mut self) -> Self {
        self.screen_space = true;
        self
    }
}

/// Per-tick rule driving a particle after spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParticleBehavior {
    /// Tank debris thrown upward, falling under gravity
    Debris { velocity: Vec3 },
    /// Expanding explosion flash that shrinks away
    Shockwave,
    /// Smoke drifting outward, rising and fading late in life
    SmokeRing { velocity: Vec3 },
    /// Short orange muzzle flash
    MuzzleFlash,
    /// Muzzle smoke whose color settles toward `target` before fading
    MuzzleSmoke { target: u8, step: u8 },
    /// Plain fade at a fixed rate
    Fade { rate: f32 },
}

impl ParticleBehavior {
    /// Advance one tick. Returns false once the particle should be removed.
    pub fn step(&mut self, p: &mut Particle) -> bool {
        p.life_time = p.life_time.saturating_add(1);
        match self {
            ParticleBehavior::Debris { velocity } => {
                p.rotation_y += (p.position.length() / 10.0).sin();
                velocity.y -= 0.2;
                p.position += *velocity;
                p.opacity -= 0.025;
                p.opacity > 0.0
            }
            ParticleBehavior::Shockwave => {
                p.scale -= Vec3::splat(0.3);
                p.opacity -= 0.06;
                p.scale.x > 0.0
            }
            ParticleBehavior::SmokeRing { velocity } => {
                p.position += *velocity;
                p.scale -= Vec3::splat(0.01);
                if p.life_time > 40 {
                    p.opacity -= 0.02;
                    p.position.y += 0.25;
                }
                p.scale.x > 0.0
            }
            ParticleBehavior::MuzzleFlash => {
                p.color = Color::ORANGE;
                if p.life_time > 1 {
                    p.opacity -= 0.1;
                }
                p.opacity > 0.0
            }
            ParticleBehavior::MuzzleSmoke { target, step } => {
                p.color.r = rough_step(p.color.r, *target, *step);
                p.color.g = rough_step(p.color.g, *target, *step);
                p.color.b = rough_step(p.color.b, *target, *step);
                p.scale += Vec3::splat(0.004);
                if p.color.g == *target {
                    p.color.b = *target;
                    p.opacity -= 0.04;
                }
                p.opacity > 0.0
            }
            ParticleBehavior::Fade { rate } => {
                p.opacity -= *rate;
                p.opacity > 0.0
            }
        }
    }
}

/// Accepts particles from the simulation
pub trait ParticleSpawner {
    fn spawn(&mut self, particle: Particle, behavior: ParticleBehavior) -> ParticleId;
}

/// Collaborators handed to every simulation call that produces effects
pub struct Effects<'a> {
    pub assets: &'a dyn AssetProvider,
    pub audio: &'a mut dyn crate::audio::AudioSink,
    pub particles: &'a mut dyn ParticleSpawner,
}

impl<'a> Effects<'a> {
    pub fn new(
        assets: &'a dyn AssetProvider,
        audio: &'a mut dyn crate::audio::AudioSink,
        particles: &'a mut dyn ParticleSpawner,
    ) -> Self {
        Self {
            assets,
            audio,
            particles,
        }
    }

    pub fn texture(&self, name: &str) -> Result<AssetHandle, AssetError> {
        self.assets.get(AssetKind::Texture, name)
    }

    pub fn model(&self, name: &str) -> Result<AssetHandle, AssetError> {
        self.assets.get(AssetKind::Model, name)
    }

    pub fn sound(&self, effect: crate::audio::SoundEffect) -> Result<AssetHandle, AssetError> {
        self.assets.get(AssetKind::Sound, effect.asset_name())
    }

    /// Play an already resolved sound at the effect's default volume
    pub fn play(&mut self, effect: crate::audio::SoundEffect, handle: AssetHandle) {
        self.audio.play(handle, effect.context(), effect.volume());
    }

    pub fn spawn(&mut self, particle: Particle, behavior: ParticleBehavior) -> ParticleId {
        self.particles.spawn(particle, behavior)
    }
}

/// Bounded particle store that steps behaviors each render tick
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<(ParticleId, Particle, ParticleBehavior)>,
    max_particles: usize,
    next_id: u64,
    spawned_total: u64,
}

impl ParticleField {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles.min(4096)),
            max_particles,
            next_id: 1,
            spawned_total: 0,
        }
    }

    /// Step every particle, dropping the finished ones
    pub fn advance(&mut self) {
        self.particles
            .retain_mut(|(_, particle, behavior)| behavior.step(particle));
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles
            .iter()
            .find(|(pid, _, _)| *pid == id)
            .map(|(_, p, _)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().map(|(_, p, _)| p)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles requested since creation, including dropped ones
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

impl ParticleSpawner for ParticleField {
    fn spawn(&mut self, particle: Particle, behavior: ParticleBehavior) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.spawned_total += 1;

        if self.max_particles == 0 {
            return id;
        }
        if self.particles.len() >= self.max_particles {
            // Remove oldest particles to make room
            self.particles.remove(0);
        }
        self.particles.push((id, particle, behavior));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_defaults_resolve() {
        let catalog = AssetCatalog::with_defaults();
        assert!(catalog.get(AssetKind::Model, names::CHECK_MODEL).is_ok());
        assert!(catalog.get(AssetKind::Texture, names::SMOKE_TEXTURE).is_ok());
    }

    #[test]
    fn test_catalog_missing_asset() {
        let catalog = AssetCatalog::new();
        let err = catalog.get(AssetKind::Texture, "nope").unwrap_err();
        assert_eq!(err.to_string(), "missing texture asset `nope`");
    }

    #[test]
    fn test_register_is_stable() {
        let mut catalog = AssetCatalog::new();
        let a = catalog.register(AssetKind::Model, "m");
        let b = catalog.register(AssetKind::Model, "m");
        let c = catalog.register(AssetKind::Texture, "m");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_rough_step() {
        assert_eq!(rough_step(84, 80, 1), 83);
        assert_eq!(rough_step(0, 80, 1), 1);
        assert_eq!(rough_step(80, 80, 1), 80);
        assert_eq!(rough_step(79, 80, 5), 80);
    }

    #[test]
    fn test_debris_falls_and_fades() {
        let mut p = Particle::new(Vec3::ZERO, AssetHandle(0));
        let mut b = ParticleBehavior::Debris {
            velocity: Vec3::new(0.0, 1.0, 0.0),
        };
        let mut ticks = 0;
        while b.step(&mut p) {
            ticks += 1;
        }
        // Opacity 1.0 at 0.025 per tick
        assert!((38..=40).contains(&ticks));
        assert!(p.position.y < 0.0);
    }

    #[test]
    fn test_shockwave_ends_when_scale_gone() {
        let mut p = Particle::new(Vec3::ZERO, AssetHandle(0)).with_scale(5.0);
        let mut b = ParticleBehavior::Shockwave;
        let mut ticks = 1;
        while b.step(&mut p) {
            ticks += 1;
        }
        assert!((16..=17).contains(&ticks));
    }

    #[test]
    fn test_muzzle_smoke_settles_then_fades() {
        let mut p = Particle::new(Vec3::ZERO, AssetHandle(0)).with_color(Color::EMBER);
        let mut b = ParticleBehavior::MuzzleSmoke { target: 80, step: 1 };
        assert!(b.step(&mut p));
        assert_eq!(p.color.r, 83);
        assert_eq!(p.color.g, 23);
        assert_eq!(p.opacity, 1.0);
        while b.step(&mut p) {}
        assert_eq!(p.color.g, 80);
        assert_eq!(p.color.b, 80);
    }

    #[test]
    fn test_field_evicts_oldest() {
        let mut field = ParticleField::new(2);
        let first = field.spawn(
            Particle::new(Vec3::ZERO, AssetHandle(0)),
            ParticleBehavior::Fade { rate: 0.1 },
        );
        field.spawn(
            Particle::new(Vec3::ONE, AssetHandle(0)),
            ParticleBehavior::Fade { rate: 0.1 },
        );
        field.spawn(
            Particle::new(Vec3::ONE, AssetHandle(0)),
            ParticleBehavior::Fade { rate: 0.1 },
        );
        assert_eq!(field.len(), 2);
        assert!(field.get(first).is_none());
        assert_eq!(field.spawned_total(), 3);
    }

    #[test]
    fn test_field_advance_removes_finished() {
        let mut field = ParticleField::new(8);
        field.spawn(
            Particle::new(Vec3::ZERO, AssetHandle(0)),
            ParticleBehavior::Fade { rate: 0.6 },
        );
        field.advance();
        assert_eq!(field.len(), 1);
        field.advance();
        assert!(field.is_empty());
    }
}
