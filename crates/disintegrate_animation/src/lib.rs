//! Disintegrate Animation
//!
//! Frame timing primitives for the disintegration engine.
//!
//! # Features
//!
//! - **Timestamps**: host-supplied monotonic frame times, so passes are deterministic
//! - **Frame loop**: a display-refresh driven loop that re-arms itself every pass
//! - **Debouncing**: last-write-wins coalescing of bursty signals such as resizes
//! - **Easing**: power-curve easing used by particle strategies

pub mod debounce;
pub mod easing;
pub mod frame_loop;
pub mod time;

pub use debounce::Debouncer;
pub use easing::Easing;
pub use frame_loop::{FrameInfo, FrameLoop};
pub use time::Timestamp;
