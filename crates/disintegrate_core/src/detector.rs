//! Bounds-diff detector
//!
//! Once per frame, compares an element's visible box with the one recorded
//! on the previous frame and works out which snapshot strips just became
//! hidden. The tracker keeps a single "last visible" value per axis and
//! ratchets it forward every frame; it never recomputes from scratch.
//!
//! Where a strip starts inside the snapshot depends on the opposite axis: a
//! right or left strip starts below the chopped top when the top edge is also
//! clipped, and a top or bottom strip starts right of the chopped left when
//! the left edge is clipped.
//!
//! Both edges of one axis shrinking in the same frame is reported against
//! the single last value for that axis, so the spawned area can come out
//! smaller than what was actually hidden.

use crate::geometry::Visibility;
use crate::snapshot::PixelRect;
use disintegrate_paint::Size;
use smallvec::SmallVec;

/// One edge of an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// An edge-triggered change of the out-of-bounds state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundsTransition {
    OutOfBounds,
    InBounds,
}

/// A newly hidden strip, in snapshot pixel space
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strip {
    pub side: Side,
    pub source: PixelRect,
}

/// Outcome of one detector pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundsDiff {
    /// Set when the out-of-bounds state flipped this frame
    pub transition: Option<BoundsTransition>,
    /// Visible width or height differs from the previous frame
    pub dimension_changed: bool,
    /// Strips to extract, horizontal sides (right, left) before vertical (top, bottom)
    pub strips: SmallVec<[Strip; 4]>,
}

/// Per-element state carried between detector passes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsTracker {
    last_visible: Size,
    out_of_bounds: bool,
    rebaseline: bool,
}

impl BoundsTracker {
    /// Start tracking with the element fully visible at `initial` size
    pub fn new(initial: Size) -> Self {
        Self {
            last_visible: Size::new(initial.width.max(0.0), initial.height.max(0.0)),
            out_of_bounds: false,
            rebaseline: false,
        }
    }

    pub fn last_visible(&self) -> Size {
        self.last_visible
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.out_of_bounds
    }

    /// Make the next pass adopt the current visible size without diffing.
    pub fn request_rebaseline(&mut self) {
        self.rebaseline = true;
    }

    pub fn needs_rebaseline(&self) -> bool {
        self.rebaseline
    }

    /// Diff `vis` against the previous frame. `actual` is the element's
    /// current unclipped size.
    pub fn update(&mut self, vis: &Visibility, actual: Size) -> BoundsDiff {
        let mut diff = BoundsDiff::default();

        let occluded = vis.is_occluded();
        if !self.out_of_bounds && occluded {
            self.out_of_bounds = true;
            diff.transition = Some(BoundsTransition::OutOfBounds);
        } else if self.out_of_bounds && !occluded {
            self.out_of_bounds = false;
            diff.transition = Some(BoundsTransition::InBounds);
        }

        let visible = vis.clamped_size();
        if self.rebaseline {
            self.rebaseline = false;
            self.last_visible = visible;
            return diff;
        }

        let last = self.last_visible;
        let width_diff = last.width - visible.width;
        let height_diff = last.height - visible.height;
        let chopped_left = actual.width - visible.width;
        let chopped_top = actual.height - visible.height;
        let drawable = visible.width.floor() > 0.0 && visible.height.floor() > 0.0;

        diff.dimension_changed = visible.width != last.width || visible.height != last.height;

        if visible.width != last.width {
            if width_diff.floor() > 0.0 && drawable {
                let y = if vis.overflow.top { chopped_top } else { 0.0 };
                if vis.overflow.right {
                    diff.strips.push(Strip {
                        side: Side::Right,
                        source: PixelRect::from_layout(visible.width, y, width_diff, visible.height),
                    });
                }
                if vis.overflow.left {
                    diff.strips.push(Strip {
                        side: Side::Left,
                        source: PixelRect::from_layout(
                            actual.width - last.width,
                            y,
                            width_diff,
                            visible.height,
                        ),
                    });
                }
            }
            self.last_visible.width = visible.width;
        }

        if visible.height != last.height {
            if height_diff.floor() > 0.0 && drawable {
                let x = if vis.overflow.left { chopped_left } else { 0.0 };
                if vis.overflow.top {
                    diff.strips.push(Strip {
                        side: Side::Top,
                        source: PixelRect::from_layout(
                            x,
                            actual.height - last.height,
                            visible.width,
                            height_diff,
                        ),
                    });
                }
                if vis.overflow.bottom {
                    diff.strips.push(Strip {
                        side: Side::Bottom,
                        source: PixelRect::from_layout(x, visible.height, visible.width, height_diff),
                    });
                }
            }
            self.last_visible.height = visible.height;
        }

        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::visible_dimensions;
    use disintegrate_paint::Rect;

    const CONTAINER: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    const FULL: Size = Size::new(100.0, 100.0);

    fn at(x: f32, y: f32) -> Visibility {
        visible_dimensions(Rect::new(x, y, 100.0, 100.0), CONTAINER)
    }

    #[test]
    fn test_unchanged_frame_reports_nothing() {
        let mut tracker = BoundsTracker::new(FULL);
        let diff = tracker.update(&at(0.0, 0.0), FULL);
        assert_eq!(diff, BoundsDiff::default());
    }

    #[test]
    fn test_bottom_clip_extracts_strip_below_visible_part() {
        let mut tracker = BoundsTracker::new(FULL);
        let diff = tracker.update(&at(0.0, 60.0), FULL);
        assert!(diff.dimension_changed);
        assert_eq!(
            diff.strips.as_slice(),
            &[Strip {
                side: Side::Bottom,
                source: PixelRect::new(0, 40, 100, 60),
            }]
        );
        assert_eq!(tracker.last_visible(), Size::new(100.0, 40.0));
    }

    #[test]
    fn test_top_clip_ratchets_through_successive_frames() {
        let mut tracker = BoundsTracker::new(FULL);

        let first = tracker.update(&at(0.0, -30.0), FULL);
        assert_eq!(first.strips[0].side, Side::Top);
        assert_eq!(first.strips[0].source, PixelRect::new(0, 0, 100, 30));

        let second = tracker.update(&at(0.0, -50.0), FULL);
        assert_eq!(second.strips[0].source, PixelRect::new(0, 30, 100, 20));
    }

    #[test]
    fn test_right_and_left_strips_account_for_chopped_top() {
        let mut tracker = BoundsTracker::new(FULL);
        // Clip the top first, then the right.
        tracker.update(&at(0.0, -20.0), FULL);
        let diff = tracker.update(&at(30.0, -20.0), FULL);
        assert_eq!(
            diff.strips.as_slice(),
            &[Strip {
                side: Side::Right,
                source: PixelRect::new(70, 20, 30, 80),
            }]
        );

        let mut tracker = BoundsTracker::new(FULL);
        tracker.update(&at(0.0, -20.0), FULL);
        let diff = tracker.update(&at(-25.0, -20.0), FULL);
        assert_eq!(
            diff.strips.as_slice(),
            &[Strip {
                side: Side::Left,
                source: PixelRect::new(0, 20, 25, 80),
            }]
        );
    }

    #[test]
    fn test_bottom_strip_starts_after_chopped_left() {
        let mut tracker = BoundsTracker::new(FULL);
        tracker.update(&at(-10.0, 0.0), FULL);
        let diff = tracker.update(&at(-10.0, 40.0), FULL);
        assert_eq!(
            diff.strips.as_slice(),
            &[Strip {
                side: Side::Bottom,
                source: PixelRect::new(10, 60, 90, 40),
            }]
        );
    }

    #[test]
    fn test_top_strip_starts_after_chopped_left() {
        let mut tracker = BoundsTracker::new(FULL);
        tracker.update(&at(-10.0, 0.0), FULL);
        let diff = tracker.update(&at(-10.0, -30.0), FULL);
        assert_eq!(
            diff.strips.as_slice(),
            &[Strip {
                side: Side::Top,
                source: PixelRect::new(10, 0, 90, 30),
            }]
        );
        assert_eq!(tracker.last_visible(), Size::new(90.0, 70.0));
    }

    #[test]
    fn test_right_strip_spans_rows_above_clipped_bottom() {
        let mut tracker = BoundsTracker::new(FULL);
        tracker.update(&at(0.0, 20.0), FULL);
        let diff = tracker.update(&at(30.0, 20.0), FULL);
        assert_eq!(
            diff.strips.as_slice(),
            &[Strip {
                side: Side::Right,
                source: PixelRect::new(70, 0, 30, 80),
            }]
        );
    }

    #[test]
    fn test_sub_pixel_change_creates_batch_but_no_strip() {
        let mut tracker = BoundsTracker::new(FULL);
        let diff = tracker.update(&at(0.0, 0.5), FULL);
        assert!(diff.dimension_changed);
        assert!(diff.strips.is_empty());
        assert_eq!(tracker.last_visible().height, 99.5);
    }

    #[test]
    fn test_out_of_bounds_is_edge_triggered() {
        let mut tracker = BoundsTracker::new(FULL);
        let gone = tracker.update(&at(0.0, 150.0), FULL);
        assert_eq!(gone.transition, Some(BoundsTransition::OutOfBounds));
        assert!(gone.strips.is_empty(), "nothing visible means nothing to extract");

        let still_gone = tracker.update(&at(0.0, 200.0), FULL);
        assert_eq!(still_gone.transition, None);
        assert!(!still_gone.dimension_changed);

        let back = tracker.update(&at(0.0, 50.0), FULL);
        assert_eq!(back.transition, Some(BoundsTransition::InBounds));
        assert!(back.dimension_changed);
        assert!(back.strips.is_empty(), "growing never spawns");
    }

    #[test]
    fn test_monotonic_shrink_changes_once_per_moving_frame() {
        let mut tracker = BoundsTracker::new(FULL);
        let offsets = [0.0, 10.0, 10.0, 25.0, 25.0, 25.0, 60.0];
        let changed: Vec<bool> = offsets
            .iter()
            .map(|&y| tracker.update(&at(0.0, y), FULL).dimension_changed)
            .collect();
        assert_eq!(changed, vec![false, true, false, true, false, false, true]);
    }

    #[test]
    fn test_rebaseline_adopts_current_size_silently() {
        let mut tracker = BoundsTracker::new(FULL);
        tracker.request_rebaseline();
        let diff = tracker.update(&at(0.0, 40.0), FULL);
        assert!(!diff.dimension_changed);
        assert!(diff.strips.is_empty());
        assert_eq!(tracker.last_visible(), Size::new(100.0, 60.0));
        assert!(!tracker.needs_rebaseline());
    }

    #[test]
    fn test_sandwiched_axis_reports_against_single_last_value() {
        // Both left and right shrink in one frame: only the combined width
        // delta is known, so each side gets a strip of that delta.
        let reference = Rect::new(20.0, 0.0, 50.0, 100.0);
        let vis = visible_dimensions(Rect::new(0.0, 0.0, 100.0, 100.0), reference);
        assert!(vis.overflow.left && vis.overflow.right);

        let mut tracker = BoundsTracker::new(FULL);
        let diff = tracker.update(&vis, FULL);
        let sides: Vec<Side> = diff.strips.iter().map(|s| s.side).collect();
        assert_eq!(sides, vec![Side::Right, Side::Left]);
        // Visible width collapses to min(own, right survivor, left survivor) = 70,
        // not the true 50px window.
        assert_eq!(tracker.last_visible().width, 70.0);
    }
}
