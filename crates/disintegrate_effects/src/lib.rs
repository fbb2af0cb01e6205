//! Disintegrate Effects
//!
//! The stock particle strategies:
//!
//! - [`DriftParticleType`] (`"Particle"`): a fading square that rises on a
//!   randomized sine wave
//! - [`BurstParticleType`] (`"ExplodingParticle"`): a shrinking circle flung
//!   in a random direction
//!
//! ```ignore
//! let mut engine = Engine::new(EngineConfig::default())?;
//! disintegrate_effects::register_defaults(engine.registry_mut());
//! engine.start()?;
//! ```

pub mod burst;
pub mod drift;

pub use burst::{BurstParticle, BurstParticleType};
pub use drift::{DriftParticle, DriftParticleType};

use disintegrate_core::ParticleRegistry;
use rand::{Rng, RngCore};

/// Register both stock strategies. Drift goes first so it is the fallback
/// for unknown type names.
pub fn register_defaults(registry: &mut ParticleRegistry) {
    registry.register(DriftParticleType);
    registry.register(BurstParticleType);
    tracing::debug!(types = registry.len(), "stock particle types registered");
}

/// Bell-shaped value in `[-1, 1]`: the mean of six uniform draws, recentred
pub fn normalized_value(rng: &mut dyn RngCore) -> f32 {
    let sum: f32 = (0..6).map(|_| rng.gen::<f32>()).sum();
    (sum - 3.0) / 3.0
}
