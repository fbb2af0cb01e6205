//! Particle capability and the type registry
//!
//! The engine knows nothing about how a particle moves or looks. A strategy
//! registers a [`ParticleType`] under a name; at spawn time the element's
//! configured name is looked up, falling back to the first registered type
//! when the name is unknown. That fallback is the intended default, not an
//! error path.

use disintegrate_paint::{Canvas, Point, Rgba8};
use rand::RngCore;

/// Everything a strategy is told about a particle it creates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSeed {
    /// Page-space position of the source pixel
    pub position: Point,
    /// Source pixel color, or the element's fixed override
    pub color: Rgba8,
    /// Index of the batch the particle belongs to
    pub batch_index: usize,
    /// Index of the particle inside its batch
    pub index: usize,
}

/// A live particle
pub trait Particle {
    /// Milliseconds this particle's animation is designed to last
    fn animation_duration(&self) -> f32;

    /// Record this frame's shape. `progress` is the batch's elapsed fraction
    /// and may exceed 1; clamping is the particle's business.
    fn draw(&mut self, canvas: &mut Canvas, progress: f32);
}

/// A named particle strategy
pub trait ParticleType {
    fn name(&self) -> &str;

    fn spawn(&self, seed: ParticleSeed, rng: &mut dyn RngCore) -> Box<dyn Particle>;
}

/// Ordered collection of particle strategies.
///
/// At least one type must be registered before the engine starts; lookups on
/// an empty registry resolve to nothing and spawn nothing.
#[derive(Default)]
pub struct ParticleRegistry {
    types: Vec<Box<dyn ParticleType>>,
}

impl ParticleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a strategy. Registering a name twice shadows the earlier one for
    /// lookups, but the earlier one keeps its place as fallback if it was first.
    pub fn register(&mut self, particle_type: impl ParticleType + 'static) {
        tracing::debug!(name = particle_type.name(), "particle type registered");
        self.types.push(Box::new(particle_type));
    }

    /// Look up by name, falling back to the first registered type
    pub fn resolve(&self, name: &str) -> Option<&dyn ParticleType> {
        let found = self.types.iter().rev().find(|t| t.name() == name);
        if found.is_none() && !self.types.is_empty() {
            tracing::trace!(name, "unregistered particle type, using fallback");
        }
        found.or_else(|| self.types.first()).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for ParticleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::DotType;
    use super::*;

    #[test]
    fn test_unknown_name_falls_back_to_first() {
        let mut registry = ParticleRegistry::new();
        registry.register(DotType {
            name: "first",
            duration: 10.0,
        });
        registry.register(DotType {
            name: "second",
            duration: 20.0,
        });

        assert_eq!(registry.resolve("second").map(|t| t.name()), Some("second"));
        assert_eq!(registry.resolve("missing").map(|t| t.name()), Some("first"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = ParticleRegistry::new();
        assert!(registry.resolve("anything").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_later_registration_shadows_same_name() {
        let mut registry = ParticleRegistry::new();
        registry.register(DotType {
            name: "dot",
            duration: 10.0,
        });
        registry.register(DotType {
            name: "dot",
            duration: 99.0,
        });
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let seed = ParticleSeed {
            position: Point::ZERO,
            color: Rgba8::TRANSPARENT,
            batch_index: 0,
            index: 0,
        };
        let particle = registry.resolve("dot").unwrap().spawn(seed, &mut rng);
        assert_eq!(particle.animation_duration(), 99.0);
    }
}
