//! Last-write-wins debouncing
//!
//! Each new signal cancels the pending deadline and starts a fresh window.
//! Signals are never queued: however many arrive, one fire follows the last.

use crate::time::Timestamp;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Timestamp>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a signal at `now`, replacing any pending deadline
    pub fn signal(&mut self, now: Timestamp) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the quiet window has elapsed
    pub fn poll(&mut self, now: Timestamp) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
