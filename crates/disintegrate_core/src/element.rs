//! Tracked elements and their discovery options

use crate::batch::ParticleBatch;
use crate::detector::BoundsTracker;
use crate::error::{DisintegrateError, Result};
use crate::host::NodeId;
use crate::snapshot::RasterSnapshot;
use disintegrate_paint::{Canvas, Rgb, Size};
use regex::Regex;
use slotmap::new_key_type;
use smallvec::SmallVec;
use std::str::FromStr;
use std::sync::OnceLock;

new_key_type! {
    /// Identifier for a tracked element inside one engine
    pub struct ElementId;
}

/// How an element relates to the box that clips it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainmentMode {
    /// The element gets its own overflow-hidden wrapper
    SelfContained,
    /// Clipped by an existing ancestor
    Contained,
    /// Never diffed; disintegrates all at once on request
    Simultaneous,
}

impl ContainmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainmentMode::SelfContained => "self-contained",
            ContainmentMode::Contained => "contained",
            ContainmentMode::Simultaneous => "simultaneous",
        }
    }
}

impl FromStr for ContainmentMode {
    type Err = DisintegrateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "self-contained" => Ok(ContainmentMode::SelfContained),
            "contained" => Ok(ContainmentMode::Contained),
            "simultaneous" => Ok(ContainmentMode::Simultaneous),
            other => Err(DisintegrateError::attribute(attr::TYPE, other)),
        }
    }
}

/// Discovery attribute names, matched with or without a `data-` prefix
pub mod attr {
    pub const TYPE: &str = "dis-type";
    pub const IGNORE_COLORS: &str = "dis-ignore-colors";
    pub const PARTICLE_TYPE: &str = "dis-particle-type";
    pub const COLOR: &str = "dis-color";
    pub const REDUCTION_FACTOR: &str = "dis-reduction-factor";
    pub const CONTAINER_ID: &str = "dis-container-id";
}

/// Optional per-element configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementOptions {
    pub ignored_colors: Vec<Rgb>,
    pub particle_type: Option<String>,
    pub color: Option<Rgb>,
    pub reduction_factor: Option<u32>,
    pub container_id: Option<String>,
}

impl ElementOptions {
    pub fn ignore_color(mut self, color: Rgb) -> Self {
        self.ignored_colors.push(color);
        self
    }

    pub fn particle_type(mut self, name: impl Into<String>) -> Self {
        self.particle_type = Some(name.into());
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn reduction_factor(mut self, factor: u32) -> Self {
        self.reduction_factor = Some(factor);
        self
    }

    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = Some(id.into());
        self
    }
}

/// One discovered element, ready to register
#[derive(Clone, Debug, PartialEq)]
pub struct ElementDescriptor {
    pub node: NodeId,
    pub mode: ContainmentMode,
    pub options: ElementOptions,
}

impl ElementDescriptor {
    pub fn new(node: NodeId, mode: ContainmentMode) -> Self {
        Self {
            node,
            mode,
            options: ElementOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ElementOptions) -> Self {
        self.options = options;
        self
    }

    /// Build a descriptor from the node's marker attributes.
    ///
    /// `dis-type` is required; unknown attributes are ignored.
    pub fn from_attributes<'a>(
        node: NodeId,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let mut mode = None;
        let mut options = ElementOptions::default();

        for (name, value) in attributes {
            let name = name.strip_prefix("data-").unwrap_or(name);
            match name {
                attr::TYPE => mode = Some(value.parse::<ContainmentMode>()?),
                attr::IGNORE_COLORS => {
                    options.ignored_colors = parse_rgb_list(attr::IGNORE_COLORS, value)?;
                }
                attr::PARTICLE_TYPE => options.particle_type = Some(value.trim().to_string()),
                attr::COLOR => {
                    options.color = parse_rgb_list(attr::COLOR, value)?.into_iter().next();
                    if options.color.is_none() {
                        return Err(DisintegrateError::attribute(attr::COLOR, value));
                    }
                }
                attr::REDUCTION_FACTOR => {
                    let factor = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|f| *f > 0)
                        .ok_or_else(|| DisintegrateError::attribute(attr::REDUCTION_FACTOR, value))?;
                    options.reduction_factor = Some(factor);
                }
                attr::CONTAINER_ID => options.container_id = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let mode = mode.ok_or(DisintegrateError::MissingMode)?;
        Ok(Self {
            node,
            mode,
            options,
        })
    }
}

/// Parse `"[255, 255, 255], [35, 35, 35]"` into RGB triples
pub fn parse_rgb_list(attribute: &str, value: &str) -> Result<Vec<Rgb>> {
    static BRACKETED: OnceLock<Regex> = OnceLock::new();
    let re = BRACKETED.get_or_init(|| Regex::new(r"\[([^\]]*)\]").expect("static pattern"));

    let mut colors = Vec::new();
    for caps in re.captures_iter(value) {
        let invalid = || DisintegrateError::attribute(attribute, value);
        let channels = caps[1]
            .split(',')
            .map(|c| c.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<SmallVec<[u8; 3]>>>()?;
        match channels.as_slice() {
            [r, g, b] => colors.push(Rgb::new(*r, *g, *b)),
            _ => return Err(invalid()),
        }
    }
    Ok(colors)
}

/// An element under disintegration management
pub struct TrackedElement {
    pub(crate) node: NodeId,
    pub(crate) mode: ContainmentMode,
    pub(crate) container: NodeId,

    pub(crate) ignored_colors: SmallVec<[Rgb; 4]>,
    pub(crate) color_override: Option<Rgb>,
    pub(crate) reduction_factor: u32,
    pub(crate) particle_type: String,

    /// Full unclipped size, refreshed every frame
    pub(crate) actual: Size,
    pub(crate) bounds: BoundsTracker,
    /// Stride counter; runs for the element's whole lifetime
    pub(crate) sample_counter: u64,
    pub(crate) corner_radius: f32,

    pub(crate) batches: Vec<ParticleBatch>,
    /// Adopted from the most recently spawned particle
    pub(crate) animation_duration_ms: f32,
    pub(crate) is_animating: bool,

    pub(crate) snapshot: Option<RasterSnapshot>,
    pub(crate) awaiting_snapshot: bool,
    pub(crate) canvas: Option<Canvas>,
}

impl TrackedElement {
    pub(crate) fn new(
        descriptor: ElementDescriptor,
        container: NodeId,
        initial_size: Size,
        default_reduction: u32,
        default_particle_type: &str,
        animation_duration_ms: f32,
    ) -> Self {
        let ElementDescriptor {
            node,
            mode,
            options,
        } = descriptor;

        Self {
            node,
            mode,
            container,
            ignored_colors: options.ignored_colors.into_iter().collect(),
            color_override: options.color,
            reduction_factor: options.reduction_factor.unwrap_or(default_reduction).max(1),
            particle_type: options
                .particle_type
                .unwrap_or_else(|| default_particle_type.to_string()),
            actual: initial_size,
            bounds: BoundsTracker::new(initial_size),
            sample_counter: 0,
            corner_radius: 0.0,
            batches: Vec::new(),
            animation_duration_ms,
            is_animating: false,
            snapshot: None,
            awaiting_snapshot: true,
            canvas: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn mode(&self) -> ContainmentMode {
        self.mode
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn ignored_colors(&self) -> &[Rgb] {
        &self.ignored_colors
    }

    pub fn color_override(&self) -> Option<Rgb> {
        self.color_override
    }

    pub fn reduction_factor(&self) -> u32 {
        self.reduction_factor
    }

    pub fn particle_type(&self) -> &str {
        &self.particle_type
    }

    pub fn actual_size(&self) -> Size {
        self.actual
    }

    pub fn last_visible(&self) -> Size {
        self.bounds.last_visible()
    }

    pub fn sample_counter(&self) -> u64 {
        self.sample_counter
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.bounds.is_out_of_bounds()
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn animation_duration_ms(&self) -> f32 {
        self.animation_duration_ms
    }

    /// A snapshot for the current round has been delivered
    pub fn is_ready(&self) -> bool {
        self.snapshot.is_some() && !self.awaiting_snapshot
    }

    pub fn snapshot(&self) -> Option<&RasterSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn batches(&self) -> &[ParticleBatch] {
        &self.batches
    }

    /// Particles across all live batches
    pub fn live_particles(&self) -> usize {
        self.batches.iter().map(ParticleBatch::len).sum()
    }
}

impl std::fmt::Debug for TrackedElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedElement")
            .field("node", &self.node)
            .field("mode", &self.mode)
            .field("container", &self.container)
            .field("actual", &self.actual)
            .field("last_visible", &self.bounds.last_visible())
            .field("batches", &self.batches.len())
            .field("is_animating", &self.is_animating)
            .finish_non_exhaustive()
    }
}
