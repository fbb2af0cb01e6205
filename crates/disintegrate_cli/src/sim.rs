//! In-memory document and the scripted scroll

use anyhow::{Context, Result};
use disintegrate_animation::Timestamp;
use disintegrate_core::{
    ContainmentMode, DisEvent, DisEventKind, DocumentHost, ElementDescriptor, ElementId,
    ElementOptions, Engine, EngineConfig, FrameReport, NodeId, RasterSnapshot,
};
use disintegrate_paint::{Rect, Rgba8, Size};
use std::sync::{Arc, Mutex};

const CONTAINER: NodeId = NodeId(1);
const ELEMENT: NodeId = NodeId(2);
const FRAME_MS: u64 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// One element inside a container of the same size
#[derive(Debug)]
pub struct SimHost {
    container: Rect,
    element: Rect,
    document: Size,
}

impl SimHost {
    pub fn new(size: Size) -> Self {
        Self {
            container: Rect::new(0.0, 0.0, size.width, size.height),
            element: Rect::new(0.0, 0.0, size.width, size.height),
            document: Size::new(size.width * 3.0, size.height * 3.0),
        }
    }

    /// Move the element away from the container's origin, pushing its
    /// bottom or right edge out of view
    pub fn scroll(&mut self, axis: Axis, px: f32) {
        self.element = match axis {
            Axis::Vertical => self.element.translate(0.0, px),
            Axis::Horizontal => self.element.translate(px, 0.0),
        };
    }

    /// Synthetic rasterization: a two-channel gradient over the element box
    pub fn rasterize(&self, node: NodeId) -> Option<RasterSnapshot> {
        let rect = self.bounds(node)?;
        let (width, height) = (rect.width as u32, rect.height as u32);
        Some(RasterSnapshot::from_fn(width, height, |x, y| {
            Rgba8::new(
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                160,
                255,
            )
        }))
    }
}

impl DocumentHost for SimHost {
    fn bounds(&self, node: NodeId) -> Option<Rect> {
        match node {
            CONTAINER => Some(self.container),
            ELEMENT => Some(self.element),
            _ => None,
        }
    }

    fn document_size(&self) -> Size {
        self.document
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        (node == ELEMENT).then_some(CONTAINER)
    }

    fn is_container(&self, node: NodeId) -> bool {
        node == CONTAINER
    }

    fn container_by_id(&self, _id: &str) -> Option<NodeId> {
        None
    }

    fn wrap_in_container(&mut self, _node: NodeId) -> NodeId {
        CONTAINER
    }
}

/// Running totals across a simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub frames: u64,
    pub batches: usize,
    pub particles: usize,
    pub retired: usize,
    pub peak_live: usize,
}

impl Totals {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.batches += report.batches_created;
        self.particles += report.particles_spawned;
        self.retired += report.elements_retired;
        self.peak_live = self.peak_live.max(report.live_particles);
    }
}

pub struct Simulation {
    engine: Engine,
    host: SimHost,
    element: ElementId,
    events: Arc<Mutex<Vec<DisEvent>>>,
    frame: u64,
}

impl Simulation {
    pub fn new(config: EngineConfig, size: Size, particle_type: Option<String>) -> Result<Self> {
        let mut engine = Engine::new(config).context("failed to create engine")?;
        disintegrate_effects::register_defaults(engine.registry_mut());

        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            DisEventKind::ElementsRegistered,
            DisEventKind::SnapshotsReady,
            DisEventKind::OutOfBounds,
            DisEventKind::InBounds,
            DisEventKind::Complete,
        ] {
            let sink = Arc::clone(&events);
            engine.on(kind, move |event| {
                if let Ok(mut events) = sink.lock() {
                    events.push(*event);
                }
            });
        }

        let mut options = ElementOptions::default();
        if let Some(name) = particle_type {
            options = options.particle_type(name);
        }
        let descriptor =
            ElementDescriptor::new(ELEMENT, ContainmentMode::Contained).with_options(options);

        let mut host = SimHost::new(size);
        engine.expect_elements(1);
        let element = engine
            .register(descriptor, &mut host)
            .context("failed to register element")?;

        let mut simulation = Self {
            engine,
            host,
            element,
            events,
            frame: 0,
        };
        simulation.fulfil_snapshots()?;
        Ok(simulation)
    }

    /// Scroll, then run one frame
    pub fn step(&mut self, axis: Axis, px: f32) -> Option<FrameReport> {
        self.host.scroll(axis, px);
        self.frame += 1;
        let now = Timestamp::from_millis(self.frame * FRAME_MS);
        let report = self.engine.on_animation_frame(now, &self.host);
        if let Err(err) = self.fulfil_snapshots() {
            tracing::warn!(error = %err, "snapshot delivery failed");
        }
        report
    }

    pub fn drain_events(&self) -> Vec<DisEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    fn fulfil_snapshots(&mut self) -> Result<()> {
        for request in self.engine.take_snapshot_requests() {
            let snapshot = self
                .host
                .rasterize(request.node)
                .context("snapshot requested for a node without layout")?;
            self.engine
                .deliver_snapshot(request.element, snapshot, &self.host)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation(reduction_factor: u32) -> Simulation {
        let config = EngineConfig::default()
            .with_seed(5)
            .with_reduction_factor(reduction_factor);
        Simulation::new(config, Size::new(100.0, 100.0), None).unwrap()
    }

    #[test]
    fn test_startup_events() {
        let sim = simulation(35);
        let kinds: Vec<_> = sim.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![DisEventKind::ElementsRegistered, DisEventKind::SnapshotsReady]
        );
        assert!(sim.engine().element(sim.element()).unwrap().is_ready());
    }

    #[test]
    fn test_vertical_scroll_spawns_every_hidden_pixel() {
        let mut sim = simulation(1);
        let mut totals = Totals::default();
        for _ in 0..9 {
            totals.record(&sim.step(Axis::Vertical, 10.0).unwrap());
        }
        assert_eq!(totals.batches, 9);
        assert_eq!(totals.particles, 9000);
        assert_eq!(totals.peak_live, 9000);
    }

    #[test]
    fn test_horizontal_matches_vertical() {
        let mut vertical = simulation(35);
        let mut horizontal = simulation(35);
        let mut v = Totals::default();
        let mut h = Totals::default();
        for _ in 0..20 {
            v.record(&vertical.step(Axis::Vertical, 3.0).unwrap());
            h.record(&horizontal.step(Axis::Horizontal, 3.0).unwrap());
        }
        assert_eq!(v.particles, h.particles);
        assert_eq!(v.batches, h.batches);
    }

    #[test]
    fn test_out_of_bounds_reported() {
        let mut sim = simulation(35);
        sim.drain_events();
        for _ in 0..12 {
            sim.step(Axis::Vertical, 10.0);
        }
        let kinds: Vec<_> = sim.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![DisEventKind::OutOfBounds]);
    }

    #[test]
    fn test_rasterize_gradient() {
        let host = SimHost::new(Size::new(4.0, 2.0));
        let snapshot = host.rasterize(ELEMENT).unwrap();
        assert_eq!((snapshot.width(), snapshot.height()), (4, 2));
        assert_eq!(snapshot.pixel(0, 0), Some(Rgba8::new(0, 0, 160, 255)));
        assert_eq!(snapshot.pixel(2, 1), Some(Rgba8::new(127, 127, 160, 255)));
        assert!(host.rasterize(NodeId(99)).is_none());
    }
}
