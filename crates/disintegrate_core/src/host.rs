//! Host collaborator interfaces
//!
//! The engine owns no DOM. Everything it needs to know about layout comes
//! through [`DocumentHost`], and rasterization is requested by queueing
//! [`SnapshotRequest`]s that the host fulfils asynchronously.

use crate::element::ElementId;
use disintegrate_paint::{Rect, Size};

/// Opaque handle to a host UI node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Layout queries the engine makes against the host document
pub trait DocumentHost {
    /// Page-space box of a node, page scroll offset included.
    ///
    /// `None` means the node is no longer laid out; the element is skipped
    /// for that frame.
    fn bounds(&self, node: NodeId) -> Option<Rect>;

    /// Uniform border radius in pixels
    fn corner_radius(&self, _node: NodeId) -> f32 {
        0.0
    }

    /// Size of the full scrollable document
    fn document_size(&self) -> Size;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Whether the node carries the container marker
    fn is_container(&self, node: NodeId) -> bool;

    /// Resolve an explicit container reference id
    fn container_by_id(&self, id: &str) -> Option<NodeId>;

    /// Wrap `node` in a new overflow-hidden container that takes over its
    /// box, and return the wrapper
    fn wrap_in_container(&mut self, node: NodeId) -> NodeId;
}

/// A pending one-shot rasterization of an element's full content box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotRequest {
    pub element: ElementId,
    pub node: NodeId,
    pub scale: f32,
}
