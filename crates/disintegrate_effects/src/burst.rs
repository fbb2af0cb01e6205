//! Burst particle
//!
//! A filled circle that flies off at a fixed random velocity, shrinking by a
//! quarter pixel per drawn frame until its life or radius runs out. It moves
//! per frame rather than per elapsed time, so it ignores progress.

use disintegrate_core::{Particle, ParticleSeed, ParticleType};
use disintegrate_paint::{Canvas, Point, Rgba8};
use rand::{Rng, RngCore};

const DURATION_MS: f32 = 1000.0;
const SHRINK_PER_FRAME: f32 = 0.25;

/// Registered as `"ExplodingParticle"`
#[derive(Clone, Copy, Debug, Default)]
pub struct BurstParticleType;

impl ParticleType for BurstParticleType {
    fn name(&self) -> &str {
        "ExplodingParticle"
    }

    fn spawn(&self, seed: ParticleSeed, rng: &mut dyn RngCore) -> Box<dyn Particle> {
        Box::new(BurstParticle::new(seed.position, seed.color, rng))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BurstParticle {
    position: Point,
    color: Rgba8,
    velocity: Point,
    radius: f32,
    remaining_life: f32,
}

impl BurstParticle {
    pub fn new(position: Point, color: Rgba8, rng: &mut dyn RngCore) -> Self {
        let velocity = Point::new(-5.0 + rng.gen::<f32>() * 10.0, -5.0 + rng.gen::<f32>() * 10.0);
        let radius = 5.0 + rng.gen::<f32>() * 5.0;
        let life = 30.0 + rng.gen::<f32>() * 10.0;

        Self {
            position,
            color,
            velocity,
            radius,
            remaining_life: life,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.remaining_life > 0.0 && self.radius > 0.0
    }
}

impl Particle for BurstParticle {
    fn animation_duration(&self) -> f32 {
        DURATION_MS
    }

    fn draw(&mut self, canvas: &mut Canvas, _progress: f32) {
        if !self.is_alive() {
            return;
        }
        canvas.fill_circle(
            self.position.x,
            self.position.y,
            self.radius,
            self.color.with_opacity(1.0),
        );
        self.remaining_life -= 1.0;
        self.radius -= SHRINK_PER_FRAME;
        self.position = self.position.offset(self.velocity.x, self.velocity.y);
    }
}
