//! Frame loop
//!
//! Mirrors a display-refresh callback: once armed, every pass runs to
//! completion and re-arms the loop for the next frame. There is no stop
//! condition; an armed loop stays armed for the life of its owner.

use crate::time::Timestamp;

/// Per-pass timing handed to the frame callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    /// Zero-based index of this pass
    pub frame: u64,
    /// Time of this pass
    pub now: Timestamp,
    /// Milliseconds since the previous pass (0 on the first)
    pub delta_ms: f64,
}

/// The self-perpetuating animation loop
#[derive(Debug, Default)]
pub struct FrameLoop {
    armed: bool,
    frames: u64,
    last_frame: Option<Timestamp>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the first frame. Arming twice is a no-op.
    pub fn arm(&mut self) {
        if !self.armed {
            tracing::debug!("frame loop armed");
            self.armed = true;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Number of passes run so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Run one pass if the loop is armed.
    ///
    /// Returns `None` without calling `pass` when the loop was never armed.
    /// The loop is re-armed unconditionally after `pass` returns.
    pub fn run<R>(&mut self, now: Timestamp, pass: impl FnOnce(FrameInfo) -> R) -> Option<R> {
        if !self.armed {
            return None;
        }
        // Consumed by this pass, requested again below.
        self.armed = false;

        let info = FrameInfo {
            frame: self.frames,
            now,
            delta_ms: self.last_frame.map_or(0.0, |last| now.millis_since(last)),
        };
        let result = pass(info);

        self.frames += 1;
        self.last_frame = Some(now);
        self.armed = true;
        Some(result)
    }
}
