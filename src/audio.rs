//! Sound effects
//!
//! The simulation resolves a sound through the asset provider and hands the
//! handle to an [`AudioSink`]. Playback is fire-and-forget.

use serde::{Deserialize, Serialize};

use crate::fx::AssetHandle;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Any tank destroyed
    TankDestroy,
    /// Extra layer when an AI tank is destroyed
    EnemyDestroyed,
    /// Fanfare when a player tank is destroyed
    PlayerDestroyed,
    /// Shell leaves the barrel
    Shoot,
    /// Mine placed
    MinePlace,
    /// Mine detonates
    MineExplode,
    /// Shell bounces off a wall or block
    Ricochet,
    /// Tread footprint placed
    Tread,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 8] = [
        SoundEffect::TankDestroy,
        SoundEffect::EnemyDestroyed,
        SoundEffect::PlayerDestroyed,
        SoundEffect::Shoot,
        SoundEffect::MinePlace,
        SoundEffect::MineExplode,
        SoundEffect::Ricochet,
        SoundEffect::Tread,
    ];

    pub fn asset_name(&self) -> &'static str {
        match self {
            SoundEffect::TankDestroy => "Assets/sounds/tnk_destroy",
            SoundEffect::EnemyDestroyed => "Assets/sounds/tnk_destroy_enemy",
            SoundEffect::PlayerDestroyed => "Assets/fanfares/tank_player_death",
            SoundEffect::Shoot => "Assets/sounds/tnk_shoot_regular_1",
            SoundEffect::MinePlace => "Assets/sounds/mine_place",
            SoundEffect::MineExplode => "Assets/sounds/mine_explode",
            SoundEffect::Ricochet => "Assets/sounds/bullet_ricochet",
            SoundEffect::Tread => "Assets/sounds/tnk_tread_place_1",
        }
    }

    /// Volume the simulation plays this effect at
    pub fn volume(&self) -> f32 {
        match self {
            SoundEffect::TankDestroy => 0.2,
            SoundEffect::EnemyDestroyed | SoundEffect::PlayerDestroyed => 0.3,
            SoundEffect::Shoot => 0.3,
            SoundEffect::MinePlace => 0.5,
            SoundEffect::MineExplode => 0.6,
            SoundEffect::Ricochet => 0.25,
            SoundEffect::Tread => 0.2,
        }
    }

    pub fn context(&self) -> SoundContext {
        match self {
            SoundEffect::PlayerDestroyed => SoundContext::Music,
            _ => SoundContext::Effect,
        }
    }
}

/// Mixer channel a sound plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundContext {
    Effect,
    Music,
    Ambient,
}

/// Plays resolved sounds
pub trait AudioSink {
    fn play(&mut self, sound: AssetHandle, context: SoundContext, volume: f32);
}

/// One queued playback request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedSound {
    pub sound: AssetHandle,
    pub context: SoundContext,
    /// Volume after master/effect scaling
    pub volume: f32,
}

/// Volume-aware audio sink that queues playback for the audio backend
#[derive(Debug, Clone)]
pub struct AudioMixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    queue: Vec<QueuedSound>,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            queue: Vec::new(),
        }
    }

    /// Mixer configured from settings
    pub fn from_settings(settings: &crate::Settings) -> Self {
        let mut mixer = Self::new();
        mixer.set_master_volume(settings.master_volume);
        mixer.set_sfx_volume(settings.sfx_volume);
        mixer.set_muted(settings.muted);
        mixer
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume for a channel
    fn effective_volume(&self, context: SoundContext) -> f32 {
        if self.muted {
            return 0.0;
        }
        match context {
            SoundContext::Effect | SoundContext::Ambient => self.master_volume * self.sfx_volume,
            SoundContext::Music => self.master_volume,
        }
    }

    /// Hand queued sounds to the backend
    pub fn drain(&mut self) -> std::vec::Drain<'_, QueuedSound> {
        self.queue.drain(..)
    }

    pub fn pending(&self) -> &[QueuedSound] {
        &self.queue
    }
}

impl AudioSink for AudioMixer {
    fn play(&mut self, sound: AssetHandle, context: SoundContext, volume: f32) {
        let volume = volume * self.effective_volume(context);
        if volume <= 0.0 {
            return;
        }
        self.queue.push(QueuedSound {
            sound,
            context,
            volume,
        });
    }
}
