//! The engine context
//!
//! Owns every tracked element, the particle registry, the notification
//! dispatcher, and the frame loop. One instance per activation; nothing is
//! process-global, so independent engines can run side by side.
//!
//! All mutation happens inside calls on `&mut Engine` that run to
//! completion, so no locking is needed. Notifications raised while mutating
//! are queued and dispatched at the end of each public call.

use crate::batch::ParticleBatch;
use crate::config::EngineConfig;
use crate::detector::BoundsTransition;
use crate::element::{ContainmentMode, ElementDescriptor, ElementId, TrackedElement};
use crate::error::{DisintegrateError, Result};
use crate::events::{DisEvent, DisEventKind, EventDispatcher};
use crate::geometry::visible_dimensions;
use crate::host::{DocumentHost, NodeId, SnapshotRequest};
use crate::particle::{ParticleRegistry, ParticleSeed};
use crate::sampler::{CornerExclusion, SampleStats, SpawnSampler};
use crate::scheduler::animate_element;
use crate::snapshot::{PixelRect, RasterSnapshot};
use disintegrate_animation::{Debouncer, FrameInfo, FrameLoop, Timestamp};
use disintegrate_paint::{Canvas, Point};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Summary of one frame pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    /// New batches appended by the detector
    pub batches_created: usize,
    /// Particles materialized this pass
    pub particles_spawned: usize,
    /// Elements whose batch sequence expired this pass
    pub elements_retired: usize,
    /// Particles alive after the pass
    pub live_particles: usize,
    /// A debounced resize fired and re-rasterization was requested
    pub resnapshot: bool,
}

/// The disintegration engine
pub struct Engine {
    config: EngineConfig,
    registry: ParticleRegistry,
    elements: SlotMap<ElementId, TrackedElement>,
    by_node: FxHashMap<NodeId, ElementId>,
    dispatcher: EventDispatcher,
    pending_events: Vec<DisEvent>,
    snapshot_requests: Vec<SnapshotRequest>,
    expected_elements: Option<usize>,
    registration_announced: bool,
    snapshot_round_open: bool,
    frame_loop: FrameLoop,
    resize: Debouncer,
    rng: StdRng,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.rng_seed.unwrap_or_else(wall_clock_seed);
        Ok(Self {
            resize: Debouncer::new(config.resize_debounce()),
            config,
            registry: ParticleRegistry::new(),
            elements: SlotMap::with_key(),
            by_node: FxHashMap::default(),
            dispatcher: EventDispatcher::new(),
            pending_events: Vec::new(),
            snapshot_requests: Vec::new(),
            expected_elements: None,
            registration_announced: false,
            snapshot_round_open: true,
            frame_loop: FrameLoop::new(),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ParticleRegistry {
        &self.registry
    }

    /// Register particle strategies here before starting the engine
    pub fn registry_mut(&mut self) -> &mut ParticleRegistry {
        &mut self.registry
    }

    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    /// Listen for a notification from any source
    pub fn on<F>(&mut self, kind: DisEventKind, handler: F)
    where
        F: Fn(&DisEvent) + Send + Sync + 'static,
    {
        self.dispatcher.on(kind, handler);
    }

    // === Registration ===

    /// Declare how many elements discovery found. Once that many are
    /// registered the engine starts on its own.
    pub fn expect_elements(&mut self, count: usize) {
        self.expected_elements = Some(count);
        self.check_registration();
        self.check_snapshots_ready();
        self.flush_events();
    }

    /// Start tracking a discovered element and queue its first snapshot.
    ///
    /// Registering a node twice returns the existing id.
    pub fn register(
        &mut self,
        descriptor: ElementDescriptor,
        host: &mut dyn DocumentHost,
    ) -> Result<ElementId> {
        if let Some(existing) = self.by_node.get(&descriptor.node) {
            tracing::debug!(node = descriptor.node.0, "node already tracked");
            return Ok(*existing);
        }

        let node = descriptor.node;
        let mode = descriptor.mode;
        let container = resolve_container(&descriptor, host);
        let initial_size = host.bounds(node).map(|b| b.size()).unwrap_or_default();

        let element = TrackedElement::new(
            descriptor,
            container,
            initial_size,
            self.config.reduction_factor,
            &self.config.default_particle_type,
            self.config.animation_duration_ms,
        );
        let id = self.elements.insert(element);
        self.by_node.insert(node, id);
        self.snapshot_requests.push(SnapshotRequest {
            element: id,
            node,
            scale: self.config.snapshot_scale,
        });
        self.snapshot_round_open = true;

        tracing::debug!(
            node = node.0,
            container = container.0,
            mode = mode.as_str(),
            width = initial_size.width,
            height = initial_size.height,
            "element registered"
        );

        self.check_registration();
        self.flush_events();
        Ok(id)
    }

    /// Arm the frame loop.
    ///
    /// At least one particle type must be registered first.
    pub fn start(&mut self) -> Result<()> {
        if self.registry.is_empty() {
            return Err(DisintegrateError::NoParticleTypes);
        }
        if !self.registration_announced {
            self.activate();
        }
        self.flush_events();
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_armed()
    }

    // === Snapshots ===

    /// Drain rasterization requests for the host to fulfil
    pub fn take_snapshot_requests(&mut self) -> Vec<SnapshotRequest> {
        std::mem::take(&mut self.snapshot_requests)
    }

    /// Fulfil a snapshot request. The first delivery for an element also
    /// creates its canvas, sized to the document.
    pub fn deliver_snapshot(
        &mut self,
        id: ElementId,
        snapshot: RasterSnapshot,
        host: &dyn DocumentHost,
    ) -> Result<()> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or(DisintegrateError::UnknownElement)?;

        tracing::debug!(
            node = element.node.0,
            width = snapshot.width(),
            height = snapshot.height(),
            "snapshot delivered"
        );
        element.snapshot = Some(snapshot);
        if element.canvas.is_none() {
            element.canvas = Some(Canvas::new(host.document_size()));
        }
        if !element.awaiting_snapshot {
            tracing::warn!(node = element.node.0, "unrequested snapshot replaced the cached one");
        }
        element.awaiting_snapshot = false;

        self.check_snapshots_ready();
        self.flush_events();
        Ok(())
    }

    /// Record a viewport resize. Bursts coalesce; the re-rasterization
    /// happens in the first frame after the debounce window goes quiet.
    pub fn notify_resize(&mut self, now: Timestamp) {
        self.resize.signal(now);
    }

    // === Frames ===

    /// Run one animation frame if the loop is armed.
    ///
    /// Returns `None` before the engine has started.
    pub fn on_animation_frame(
        &mut self,
        now: Timestamp,
        host: &dyn DocumentHost,
    ) -> Option<FrameReport> {
        let mut frame_loop = std::mem::take(&mut self.frame_loop);
        let report = frame_loop.run(now, |info| self.frame_pass(info, host));
        self.frame_loop = frame_loop;
        self.flush_events();

        if let Some(report) = &report {
            if report.batches_created > 0 || report.elements_retired > 0 {
                tracing::trace!(
                    frame = report.frame,
                    batches = report.batches_created,
                    spawned = report.particles_spawned,
                    retired = report.elements_retired,
                    live = report.live_particles,
                    "frame"
                );
            }
        }
        report
    }

    /// Spawn one batch from the element's whole snapshot right now.
    ///
    /// The batch replaces the element's first batch. Returns the number of
    /// particles created, 0 if the element is not ready.
    pub fn create_simultaneous_particles(
        &mut self,
        id: ElementId,
        host: &dyn DocumentHost,
        now: Timestamp,
    ) -> Result<usize> {
        let Self {
            config,
            elements,
            registry,
            rng,
            ..
        } = self;
        let element = elements.get_mut(id).ok_or(DisintegrateError::UnknownElement)?;

        let Some(bounds) = host.bounds(element.node) else {
            tracing::debug!(node = element.node.0, "no layout, nothing to spawn");
            return Ok(0);
        };
        if element.snapshot.is_none() {
            tracing::debug!(node = element.node.0, "snapshot not ready, nothing to spawn");
            return Ok(0);
        }

        element.actual = bounds.size();
        element.corner_radius = host.corner_radius(element.node);
        let source = PixelRect::from_layout(0.0, 0.0, element.actual.width, element.actual.height);

        let batch = ParticleBatch::new(now);
        match element.batches.first_mut() {
            Some(first) => *first = batch,
            None => element.batches.push(batch),
        }
        element.is_animating = true;

        let mut spawner = Spawner {
            registry,
            rng,
            scale: config.snapshot_scale,
        };
        let stats = spawner.spawn(element, source, bounds.origin(), 0);
        Ok(stats.emitted)
    }

    // === Queries ===

    pub fn element(&self, id: ElementId) -> Option<&TrackedElement> {
        self.elements.get(id)
    }

    pub fn element_by_node(&self, node: NodeId) -> Option<ElementId> {
        self.by_node.get(&node).copied()
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &TrackedElement)> {
        self.elements.iter()
    }

    pub fn canvas(&self, id: ElementId) -> Option<&Canvas> {
        self.elements.get(id).and_then(TrackedElement::canvas)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // === Internals ===

    fn frame_pass(&mut self, info: FrameInfo, host: &dyn DocumentHost) -> FrameReport {
        let now = info.now;
        let mut report = FrameReport {
            frame: info.frame,
            ..Default::default()
        };

        if self.resize.poll(now) {
            self.begin_resnapshot(host);
            report.resnapshot = true;
        }

        let Self {
            config,
            elements,
            registry,
            rng,
            pending_events,
            ..
        } = self;
        let mut spawner = Spawner {
            registry,
            rng,
            scale: config.snapshot_scale,
        };

        for (id, element) in elements.iter_mut() {
            if element.mode != ContainmentMode::Simultaneous && element.is_ready() {
                if let Some((created, spawned)) =
                    detect_and_spawn(id, element, host, now, &mut spawner, pending_events)
                {
                    report.batches_created += usize::from(created);
                    report.particles_spawned += spawned;
                }
            }

            if animate_element(element, now).retired {
                pending_events.push(DisEvent::element(DisEventKind::Complete, id));
                report.elements_retired += 1;
            }
            report.live_particles += element.live_particles();
        }

        report
    }

    fn begin_resnapshot(&mut self, host: &dyn DocumentHost) {
        let size = host.document_size();
        tracing::debug!(
            elements = self.elements.len(),
            width = size.width,
            height = size.height,
            "resize settled, re-rasterizing"
        );
        for (id, element) in self.elements.iter_mut() {
            self.snapshot_requests.push(SnapshotRequest {
                element: id,
                node: element.node,
                scale: self.config.snapshot_scale,
            });
            element.awaiting_snapshot = true;
            element.bounds.request_rebaseline();
            if let Some(canvas) = element.canvas.as_mut() {
                canvas.resize(size);
            }
        }
        self.snapshot_round_open = true;
    }

    fn check_registration(&mut self) {
        if self.registration_announced {
            return;
        }
        let Some(expected) = self.expected_elements else {
            return;
        };
        if self.elements.len() < expected {
            return;
        }
        if self.registry.is_empty() {
            tracing::warn!("all elements registered but no particle type is; call start() after registering one");
            return;
        }
        self.activate();
    }

    fn activate(&mut self) {
        self.registration_announced = true;
        self.frame_loop.arm();
        self.pending_events
            .push(DisEvent::global(DisEventKind::ElementsRegistered));
    }

    fn check_snapshots_ready(&mut self) {
        if !self.snapshot_round_open || self.elements.is_empty() {
            return;
        }
        let registered = self
            .expected_elements
            .map_or(true, |expected| self.elements.len() >= expected);
        if registered && self.elements.values().all(|e| !e.awaiting_snapshot) {
            self.snapshot_round_open = false;
            self.pending_events
                .push(DisEvent::global(DisEventKind::SnapshotsReady));
        }
    }

    fn flush_events(&mut self) {
        for event in std::mem::take(&mut self.pending_events) {
            self.dispatcher.dispatch(&event);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("elements", &self.elements.len())
            .field("registry", &self.registry)
            .field("running", &self.frame_loop.is_armed())
            .field("frames", &self.frame_loop.frame_count())
            .finish_non_exhaustive()
    }
}

/// Detector pass for one element. Returns whether a batch was appended and
/// how many particles it received, or `None` if layout was unavailable.
fn detect_and_spawn(
    id: ElementId,
    element: &mut TrackedElement,
    host: &dyn DocumentHost,
    now: Timestamp,
    spawner: &mut Spawner<'_>,
    events: &mut Vec<DisEvent>,
) -> Option<(bool, usize)> {
    let bounds = host.bounds(element.node)?;
    let reference = host.bounds(element.container)?;
    let vis = visible_dimensions(bounds, reference);

    element.actual = bounds.size();
    element.corner_radius = host.corner_radius(element.node);

    let diff = element.bounds.update(&vis, element.actual);
    match diff.transition {
        Some(BoundsTransition::OutOfBounds) => {
            events.push(DisEvent::element(DisEventKind::OutOfBounds, id));
        }
        Some(BoundsTransition::InBounds) => {
            events.push(DisEvent::element(DisEventKind::InBounds, id));
        }
        None => {}
    }

    if !diff.dimension_changed {
        return Some((false, 0));
    }

    let batch_index = element.batches.len();
    element.batches.push(ParticleBatch::new(now));
    element.is_animating = true;

    let mut stats = SampleStats::default();
    for strip in &diff.strips {
        let strip_stats = spawner.spawn(element, strip.source, vis.origin(), batch_index);
        tracing::trace!(
            side = ?strip.side,
            x = strip.source.x,
            y = strip.source.y,
            width = strip.source.width,
            height = strip.source.height,
            spawned = strip_stats.emitted,
            "strip sampled"
        );
        stats.merge(strip_stats);
    }

    Some((true, stats.emitted))
}

/// What a spawn pass draws on: the strategies, the shared randomness, and
/// the scale snapshots were rasterized at
struct Spawner<'a> {
    registry: &'a ParticleRegistry,
    rng: &'a mut StdRng,
    scale: f32,
}

impl Spawner<'_> {
    /// Sample `source` (layout pixels, relative to the element) out of the
    /// element's snapshot into its batch at `batch_index`
    fn spawn(
        &mut self,
        element: &mut TrackedElement,
        source: PixelRect,
        origin: Point,
        batch_index: usize,
    ) -> SampleStats {
        let Some(particle_type) = self.registry.resolve(&element.particle_type) else {
            tracing::warn!(node = element.node.0, "no particle types registered, spawn skipped");
            return SampleStats::default();
        };

        let corners = CornerExclusion::new(element.corner_radius, element.actual);
        let TrackedElement {
            snapshot,
            sample_counter,
            reduction_factor,
            ignored_colors,
            color_override,
            batches,
            animation_duration_ms,
            ..
        } = element;
        let (Some(snapshot), Some(batch)) = (snapshot.as_ref(), batches.get_mut(batch_index)) else {
            return SampleStats::default();
        };
        let region = snapshot.region_scaled(source, self.scale);
        let rng = &mut *self.rng;

        let mut sampler = SpawnSampler::new(
            sample_counter,
            *reduction_factor,
            ignored_colors.as_slice(),
            *color_override,
            corners,
        );
        sampler.sample(&region, origin, |world, _local, color| {
            let seed = ParticleSeed {
                position: world,
                color,
                batch_index,
                index: batch.len(),
            };
            let particle = particle_type.spawn(seed, &mut *rng);
            *animation_duration_ms = particle.animation_duration();
            batch.push(particle);
        })
    }
}

/// Work out which node clips a newly registered element
fn resolve_container(descriptor: &ElementDescriptor, host: &mut dyn DocumentHost) -> NodeId {
    match descriptor.mode {
        ContainmentMode::SelfContained => host.wrap_in_container(descriptor.node),
        ContainmentMode::Contained | ContainmentMode::Simultaneous => {
            if let Some(id) = descriptor.options.container_id.as_deref() {
                match host.container_by_id(id) {
                    Some(container) => return container,
                    None => tracing::debug!(id, "container id did not resolve, searching ancestors"),
                }
            }
            nearest_container(descriptor.node, &*host)
        }
    }
}

/// Nearest marked ancestor, else the parent, else the node itself
fn nearest_container(node: NodeId, host: &dyn DocumentHost) -> NodeId {
    let mut current = host.parent(node);
    while let Some(ancestor) = current {
        if host.is_container(ancestor) {
            return ancestor;
        }
        current = host.parent(ancestor);
    }
    host.parent(node).unwrap_or(node)
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
