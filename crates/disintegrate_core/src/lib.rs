//! Disintegrate Core
//!
//! The engine behind the disintegration effect: as an element is clipped by
//! its container, the pixels of each newly hidden strip are turned into
//! particles exactly once, and those particles are animated in time-stamped
//! batches until they expire.
//!
//! - **Geometry**: visible box of an element against its clipping container
//! - **Detector**: frame-over-frame diff of the visible box, per overflow side
//! - **Sampler**: strided walk over a snapshot region, with color and corner filters
//! - **Scheduler**: per-frame redraw and retirement of particle batches
//! - **Registry**: named, pluggable particle strategies
//!
//! The engine is single-threaded and frame driven. Layout, rasterization, and
//! rendering stay with the host, reached through [`DocumentHost`], snapshot
//! requests, and the recorded [`disintegrate_paint::Canvas`].
//!
//! # Example
//!
//! ```ignore
//! use disintegrate_core::{Engine, EngineConfig, ElementDescriptor, ContainmentMode};
//!
//! let mut engine = Engine::new(EngineConfig::default())?;
//! disintegrate_effects::register_defaults(engine.registry_mut());
//!
//! engine.expect_elements(1);
//! let id = engine.register(ElementDescriptor::new(node, ContainmentMode::Contained), &mut host)?;
//!
//! for request in engine.take_snapshot_requests() {
//!     let snapshot = rasterize(request.node, request.scale);
//!     engine.deliver_snapshot(request.element, snapshot, &host)?;
//! }
//!
//! // Once per display refresh:
//! engine.on_animation_frame(now, &host);
//! ```

pub mod batch;
pub mod config;
pub mod detector;
pub mod element;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod particle;
pub mod sampler;
pub mod scheduler;
pub mod snapshot;

pub use batch::ParticleBatch;
pub use config::EngineConfig;
pub use detector::{BoundsDiff, BoundsTracker, BoundsTransition, Side, Strip};
pub use element::{ContainmentMode, ElementDescriptor, ElementId, ElementOptions, TrackedElement};
pub use engine::{Engine, FrameReport};
pub use error::{DisintegrateError, Result};
pub use events::{DisEvent, DisEventKind, EventDispatcher};
pub use geometry::{visible_dimensions, Overflow, Visibility};
pub use host::{DocumentHost, NodeId, SnapshotRequest};
pub use particle::{Particle, ParticleRegistry, ParticleSeed, ParticleType};
pub use sampler::{CornerExclusion, SampleStats, SpawnSampler};
pub use snapshot::{PixelRect, RasterRegion, RasterSnapshot};
