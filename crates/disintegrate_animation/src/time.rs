//! Frame timestamps
//!
//! The engine never reads the wall clock itself. Hosts pass the display
//! refresh time into every frame, which keeps batch ages reproducible.

use std::ops::Add;
use std::time::Duration;

/// A point in time, in microseconds since an arbitrary host epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis_f64(&self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Milliseconds elapsed since `earlier`, negative if `earlier` is in the future.
    pub fn millis_since(&self, earlier: Timestamp) -> f64 {
        (self.0 as f64 - earlier.0 as f64) / 1_000.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(micros))
    }
}
