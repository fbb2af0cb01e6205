//! Disintegrate Paint
//!
//! The drawing side of the disintegration effect: a per-element surface
//! that particles paint themselves onto every frame.
//!
//! # Features
//!
//! - RGBA colors in both pixel (`Rgba8`) and paint (`Color`) form
//! - Rect, point, and size primitives shared with the geometry calculator
//! - A recording `Canvas` sized to the scrollable document, cleared per frame

pub mod canvas;
pub mod color;
pub mod primitives;

pub use canvas::{Canvas, PaintCommand};
pub use color::{Color, Rgb, Rgba8};
pub use primitives::*;
