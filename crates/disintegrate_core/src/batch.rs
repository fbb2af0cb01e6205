//! Particle batches

use crate::particle::Particle;
use disintegrate_animation::Timestamp;
use disintegrate_paint::Canvas;

/// Particles spawned together by one geometry change, sharing a time origin.
///
/// A batch only gains members during the spawning pass that created it.
pub struct ParticleBatch {
    start_time: Timestamp,
    particles: Vec<Box<dyn Particle>>,
}

impl ParticleBatch {
    pub fn new(start_time: Timestamp) -> Self {
        Self {
            start_time,
            particles: Vec::new(),
        }
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub(crate) fn push(&mut self, particle: Box<dyn Particle>) {
        self.particles.push(particle);
    }

    /// Elapsed fraction of `duration_ms` at `now`
    pub fn progress(&self, now: Timestamp, duration_ms: f32) -> f32 {
        (now.millis_since(self.start_time) / duration_ms as f64) as f32
    }

    pub(crate) fn draw(&mut self, canvas: &mut Canvas, progress: f32) {
        for particle in &mut self.particles {
            particle.draw(canvas, progress);
        }
    }
}

impl std::fmt::Debug for ParticleBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleBatch")
            .field("start_time", &self.start_time)
            .field("particles", &self.particles.len())
            .finish()
    }
}
