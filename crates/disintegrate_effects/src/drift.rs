//! Drift particle
//!
//! A square that floats upward along a sine wave while shrinking and fading
//! out. Every shape parameter is drawn from a bell curve so neighbouring
//! particles wander apart.

use crate::normalized_value;
use disintegrate_animation::Easing;
use disintegrate_core::{Particle, ParticleSeed, ParticleType};
use disintegrate_paint::{Canvas, Point, Rgba8};
use rand::RngCore;
use std::f32::consts::PI;

const DURATION_MS: f32 = 1000.0;
const START_SIZE: f32 = 10.0;

/// Registered as `"Particle"`
#[derive(Clone, Copy, Debug, Default)]
pub struct DriftParticleType;

impl ParticleType for DriftParticleType {
    fn name(&self) -> &str {
        "Particle"
    }

    fn spawn(&self, seed: ParticleSeed, rng: &mut dyn RngCore) -> Box<dyn Particle> {
        Box::new(DriftParticle::new(seed.position, seed.color, rng))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DriftParticle {
    origin: Point,
    color: Rgba8,
    /// Horizontal sway amplitude, roughly -50..50
    width_scaler: f32,
    /// Half-waves traversed over the animation
    waves: f32,
    /// Total rise, 10..75
    height_scaler: f32,
    /// Exponent of the fade curve, 1..4
    fade_power: f32,
}

impl DriftParticle {
    pub fn new(origin: Point, color: Rgba8, rng: &mut dyn RngCore) -> Self {
        let width_scaler = (50.0 * normalized_value(rng)).round();
        let waves = (normalized_value(rng) + 0.5) * 2.0 + 1.0;
        let height_scaler = (65.0 * (normalized_value(rng) + 1.0) / 2.0).round() + 10.0;
        let fade_power = ((normalized_value(rng) + 1.0) / 2.0 * 3.0 + 1.0).round();

        Self {
            origin,
            color,
            width_scaler,
            waves,
            height_scaler,
            fade_power,
        }
    }

    /// Position, edge length and opacity at progress `t`
    fn state(&self, t: f32) -> (Point, f32, f32) {
        let x = self.origin.x + (self.waves * PI * t).sin() * self.width_scaler;
        let y = self.origin.y - t * self.height_scaler;
        let size = START_SIZE * (1.0 - t);
        let opacity = 1.0 - Easing::EaseInOut(self.fade_power).apply(t);
        (Point::new(x, y), size, opacity)
    }
}

impl Particle for DriftParticle {
    fn animation_duration(&self) -> f32 {
        DURATION_MS
    }

    fn draw(&mut self, canvas: &mut Canvas, progress: f32) {
        let t = progress.min(1.0);
        let (center, size, opacity) = self.state(t);
        canvas.fill_rect(
            center.x - size / 2.0,
            center.y - size / 2.0,
            size,
            size,
            self.color.with_opacity(opacity),
        );
    }
}
