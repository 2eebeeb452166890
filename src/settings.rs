//! World settings and preferences
//!
//! Loaded once when a world is created. Native hosts read a JSON file;
//! anything missing falls back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tuning::Tuning;

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

    /// Particle pool capacity for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 128,
            QualityPreset::Medium => 512,
            QualityPreset::High => 2048,
        }
    }

    /// Chunk render radius for this preset
    pub fn render_distance(&self) -> u32 {
        match self {
            QualityPreset::Low => 1,
            QualityPreset::Medium => 2,
            QualityPreset::High => 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// World settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World seed; every chunk is a pure function of this and its coordinate
    pub seed: u64,
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Explicit chunk render radius (overrides the preset)
    pub render_distance: Option<u32>,
    /// Particle effects (landing dust, muzzle sparks)
    pub particles: bool,
    /// Behaviour and density tables
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 12345,
            quality: QualityPreset::Medium,
            render_distance: None,
            particles: true,
            tuning: Tuning::default(),
        }
    }
}

/// Upper bound on the render radius; beyond this a single step regenerates
/// thousands of chunks
const MAX_RENDER_DISTANCE: u32 = 8;

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Effective chunk render radius
    pub fn render_distance(&self) -> u32 {
        self.render_distance
            .unwrap_or_else(|| self.quality.render_distance())
    }

    /// Effective particle pool capacity
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Using default settings: {err}");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.render_distance() > MAX_RENDER_DISTANCE {
            return Err(SettingsError::Invalid {
                field: "render_distance",
                reason: format!("{} exceeds {MAX_RENDER_DISTANCE}", self.render_distance()),
            });
        }
        let clock = &self.tuning.clock;
        if !(clock.cycle_length > 0.0) {
            return Err(SettingsError::Invalid {
                field: "tuning.clock.cycle_length",
                reason: "must be positive".into(),
            });
        }
        if clock.keyframes.is_empty() {
            return Err(SettingsError::Invalid {
                field: "tuning.clock.keyframes",
                reason: "at least one keyframe is required".into(),
            });
        }
        if let Some(k) = clock.keyframes.iter().find(|k| !(0.0..1.0).contains(&k.time)) {
            return Err(SettingsError::Invalid {
                field: "tuning.clock.keyframes",
                reason: format!("time {} outside [0, 1)", k.time),
            });
        }
        if !(clock.day_start < clock.day_end) {
            return Err(SettingsError::Invalid {
                field: "tuning.clock.day_start",
                reason: "day window must start before it ends".into(),
            });
        }
        let bird = &self.tuning.bird;
        if !(bird.min_speed > 0.0 && bird.min_speed <= bird.max_speed) {
            return Err(SettingsError::Invalid {
                field: "tuning.bird.min_speed",
                reason: "speed band must satisfy 0 < min <= max".into(),
            });
        }
        if !(self.tuning.villager.walk_speed > 0.0) {
            return Err(SettingsError::Invalid {
                field: "tuning.villager.walk_speed",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
        for preset in [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High] {
            assert!(Settings::from_preset(preset).validate().is_ok());
        }
    }

    #[test]
    fn test_render_distance_override() {
        let mut settings = Settings::from_preset(QualityPreset::High);
        assert_eq!(settings.render_distance(), 3);
        settings.render_distance = Some(1);
        assert_eq!(settings.render_distance(), 1);
    }

    #[test]
    fn test_particles_disabled_means_empty_pool() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_from_json_partial() {
        let settings = Settings::from_json(r#"{ "seed": 7, "quality": "Low" }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.render_distance(), 1);
        assert_eq!(settings.max_particles(), 128);
    }

    #[test]
    fn test_from_json_rejects_bad_clock() {
        let err = Settings::from_json(r#"{ "tuning": { "clock": { "keyframes": [] } } }"#)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));

        let err = Settings::from_json(r#"{ "render_distance": 40 }"#).unwrap_err();
        assert!(err.to_string().contains("render_distance"));
    }

    #[test]
    fn test_from_json_malformed() {
        let err = Settings::from_json("{ seed: ").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }
}
