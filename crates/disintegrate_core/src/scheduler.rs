//! Batch animation and retirement
//!
//! Every frame each element's canvas is cleared and every particle of every
//! live batch draws itself at its batch's elapsed fraction. Retirement looks
//! only at the most recent batch: once it has run past its duration the
//! whole batch sequence is dropped together, even if an older batch was
//! spawned with a longer-lived particle type.

use crate::element::TrackedElement;
use disintegrate_animation::Timestamp;

/// Shortest duration used when computing elapsed fractions
const MIN_DURATION_MS: f32 = 1e-3;

/// What one animation pass did to an element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimateOutcome {
    /// Batches drawn this pass
    pub batches_drawn: usize,
    /// The batch sequence expired and was dropped
    pub retired: bool,
}

/// Redraw all live batches of `element` at `now`, then retire them if the
/// newest one has expired.
///
/// An element without batches just gets its canvas cleared; its animating
/// flag is left alone.
pub fn animate_element(element: &mut TrackedElement, now: Timestamp) -> AnimateOutcome {
    let mut outcome = AnimateOutcome::default();

    if let Some(canvas) = element.canvas.as_mut() {
        canvas.clear();
    }
    if element.batches.is_empty() {
        return outcome;
    }

    let duration = element.animation_duration_ms.max(MIN_DURATION_MS);
    let last = element.batches.len() - 1;
    let mut expired = false;

    for (i, batch) in element.batches.iter_mut().enumerate() {
        let progress = batch.progress(now, duration);
        if let Some(canvas) = element.canvas.as_mut() {
            batch.draw(canvas, progress);
        }
        outcome.batches_drawn += 1;
        if i == last && progress > 1.0 {
            expired = true;
        }
    }

    if expired {
        tracing::debug!(
            node = element.node.0,
            batches = element.batches.len(),
            "particle batches retired"
        );
        element.batches.clear();
        element.is_animating = false;
        outcome.retired = true;
    }

    outcome
}
