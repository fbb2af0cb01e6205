//! Engine configuration (`disintegrate.toml`)

use crate::error::{DisintegrateError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Engine-wide defaults. Per-element discovery options override the
/// sampling stride and particle type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Sampling stride: one pixel in `reduction_factor` becomes a particle
    #[serde(default = "default_reduction_factor")]
    pub reduction_factor: u32,
    /// Particle type used when an element names none
    #[serde(default = "default_particle_type")]
    pub default_particle_type: String,
    /// Element animation duration until a particle reports its own
    #[serde(default = "default_animation_duration_ms")]
    pub animation_duration_ms: f32,
    /// Scale factor passed with every rasterization request
    #[serde(default = "default_snapshot_scale")]
    pub snapshot_scale: f32,
    /// Quiet window before a burst of resizes triggers re-rasterization
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Seed for particle randomness; unset seeds from the wall clock
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_reduction_factor() -> u32 {
    35
}

fn default_particle_type() -> String {
    "Particle".to_string()
}

fn default_animation_duration_ms() -> f32 {
    100.0
}

fn default_snapshot_scale() -> f32 {
    1.0
}

fn default_resize_debounce_ms() -> u64 {
    250
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reduction_factor: default_reduction_factor(),
            default_particle_type: default_particle_type(),
            animation_duration_ms: default_animation_duration_ms(),
            snapshot_scale: default_snapshot_scale(),
            resize_debounce_ms: default_resize_debounce_ms(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reduction_factor == 0 {
            return Err(DisintegrateError::InvalidConfig(
                "reduction_factor must be greater than 0".into(),
            ));
        }
        if !(self.snapshot_scale.is_finite() && self.snapshot_scale > 0.0) {
            return Err(DisintegrateError::InvalidConfig(format!(
                "snapshot_scale must be positive, got {}",
                self.snapshot_scale
            )));
        }
        if !(self.animation_duration_ms.is_finite() && self.animation_duration_ms > 0.0) {
            return Err(DisintegrateError::InvalidConfig(format!(
                "animation_duration_ms must be positive, got {}",
                self.animation_duration_ms
            )));
        }
        Ok(())
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_reduction_factor(mut self, factor: u32) -> Self {
        self.reduction_factor = factor;
        self
    }
}
