//! Simulation settings
//!
//! Read once when the simulation, its tanks and its pools are built.
//! Missing fields in a settings file fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FOOTPRINTS, MINE_FUSE_TICKS};

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Default footprint pool size for this preset
    pub fn footprint_limit(&self) -> usize {
        match self {
            QualityPreset::Low => 500,
            QualityPreset::Medium => 2500,
            QualityPreset::High => 10_000,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Effects ===
    /// Particle effects (debris, smoke, muzzle flash)
    pub particles: bool,
    /// Footprint pool capacity (clamped to `MAX_FOOTPRINTS`)
    pub tank_footprint_limit: usize,
    /// Ticks of travel between two footprints
    pub footprint_interval: u32,

    // === Gameplay ===
    /// Ticks before a laid mine detonates
    pub mine_fuse_ticks: u32,
    /// Seed for the simulation RNG
    pub seed: u64,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute all audio
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            tank_footprint_limit: QualityPreset::Medium.footprint_limit(),
            footprint_interval: 8,

            mine_fuse_ticks: MINE_FUSE_TICKS,
            seed: 0x7a4b_2c1d,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.tank_footprint_limit = preset.footprint_limit();

        if preset == QualityPreset::Low {
            self.footprint_interval = self.footprint_interval.max(12);
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Footprint pool capacity actually used
    pub fn footprint_capacity(&self) -> usize {
        self.tank_footprint_limit.min(MAX_FOOTPRINTS)
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        if settings.tank_footprint_limit > MAX_FOOTPRINTS {
            log::warn!(
                "Footprint limit {} exceeds ceiling, clamping to {}",
                settings.tank_footprint_limit,
                MAX_FOOTPRINTS
            );
            settings.tank_footprint_limit = MAX_FOOTPRINTS;
        }
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "tank_footprint_limit": 42 }"#).unwrap();
        assert_eq!(settings.tank_footprint_limit, 42);
        assert_eq!(settings.mine_fuse_ticks, MINE_FUSE_TICKS);
        assert_eq!(settings.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_footprint_capacity_clamped() {
        let settings = Settings {
            tank_footprint_limit: MAX_FOOTPRINTS * 4,
            ..Default::default()
        };
        assert_eq!(settings.footprint_capacity(), MAX_FOOTPRINTS);
    }

    #[test]
    fn test_oversized_limit_clamped_on_load() {
        let json = format!(r#"{{ "tank_footprint_limit": {} }}"#, MAX_FOOTPRINTS * 3);
        let settings = Settings::from_json(&json).unwrap();
        assert_eq!(settings.tank_footprint_limit, MAX_FOOTPRINTS);

        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back.tank_footprint_limit, MAX_FOOTPRINTS);
    }

    #[test]
    fn test_particles_disabled() {
        let settings = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(matches!(
            Settings::load("/definitely/not/here.json"),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
    }

    #[test]
    fn test_json_roundtrip_keeps_limit() {
        let settings = Settings::from_preset(QualityPreset::Low);
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.tank_footprint_limit, QualityPreset::Low.footprint_limit());
        assert_eq!(back.footprint_interval, 12);
    }
}
