//! Easing functions for particle animations

/// Easing function type
///
/// The power curves take an arbitrary exponent so strategies can randomize
/// how sharply a particle fades or shrinks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// `t^p`
    EaseIn(f32),
    /// `1 - |(t - 1)^p|`
    EaseOut(f32),
    /// Ease-in over the first half, ease-out over the second
    EaseInOut(f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match *self {
            Easing::Linear => t,
            Easing::EaseIn(p) => ease_in(t, p),
            Easing::EaseOut(p) => ease_out(t, p),
            Easing::EaseInOut(p) => {
                if t < 0.5 {
                    ease_in(t * 2.0, p) / 2.0
                } else {
                    ease_out(t * 2.0 - 1.0, p) / 2.0 + 0.5
                }
            }
        }
    }
}

#[inline]
fn ease_in(t: f32, power: f32) -> f32 {
    t.powf(power)
}

#[inline]
fn ease_out(t: f32, power: f32) -> f32 {
    // powf of a negative base is NaN for fractional powers; the curve only
    // needs the magnitude.
    1.0 - (1.0 - t).abs().powf(power)
}
