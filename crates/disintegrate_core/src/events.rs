//! Notification dispatch
//!
//! Engine-level and per-element notifications, delivered to registered
//! handlers. Events raised inside a frame pass are queued by the engine and
//! dispatched once the pass has finished mutating state.

use crate::element::ElementId;
use rustc_hash::FxHashMap;

/// Notification kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisEventKind {
    /// Every registered element has a snapshot for the current round
    SnapshotsReady,
    /// All discovered elements are registered and the frame loop is running
    ElementsRegistered,
    /// The element just became fully invisible
    OutOfBounds,
    /// The element just became partly visible again
    InBounds,
    /// The element's last batch expired and its particles were dropped
    Complete,
}

/// A notification, optionally targeted at one element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisEvent {
    pub kind: DisEventKind,
    pub target: Option<ElementId>,
}

impl DisEvent {
    pub fn global(kind: DisEventKind) -> Self {
        Self { kind, target: None }
    }

    pub fn element(kind: DisEventKind, target: ElementId) -> Self {
        Self {
            kind,
            target: Some(target),
        }
    }
}

/// Event handler function type
pub type EventHandler = Box<dyn Fn(&DisEvent) + Send + Sync>;

/// Dispatches events to registered handlers
#[derive(Default)]
pub struct EventDispatcher {
    handlers: FxHashMap<(Option<ElementId>, DisEventKind), Vec<EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for `kind` from any source
    pub fn on<F>(&mut self, kind: DisEventKind, handler: F)
    where
        F: Fn(&DisEvent) + Send + Sync + 'static,
    {
        self.handlers
            .entry((None, kind))
            .or_default()
            .push(Box::new(handler));
    }

    /// Listen for `kind` targeted at one element
    pub fn on_element<F>(&mut self, element: ElementId, kind: DisEventKind, handler: F)
    where
        F: Fn(&DisEvent) + Send + Sync + 'static,
    {
        self.handlers
            .entry((Some(element), kind))
            .or_default()
            .push(Box::new(handler));
    }

    /// Dispatch to element-specific handlers first, then to catch-all handlers
    pub fn dispatch(&self, event: &DisEvent) {
        tracing::debug!(kind = ?event.kind, target = ?event.target, "dispatching event");
        if event.target.is_some() {
            if let Some(handlers) = self.handlers.get(&(event.target, event.kind)) {
                for handler in handlers {
                    handler(event);
                }
            }
        }
        if let Some(handlers) = self.handlers.get(&(None, event.kind)) {
            for handler in handlers {
                handler(event);
            }
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
