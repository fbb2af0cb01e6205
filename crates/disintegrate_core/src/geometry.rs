//! Visibility calculator
//!
//! Computes how much of an element survives clipping by a reference box and
//! which of its four edges are currently cut off. Both inputs are page-space
//! rectangles. Nothing here fails: degenerate boxes just produce zero or
//! negative visible extents, which callers read as "fully occluded".

use disintegrate_paint::{Point, Rect, Size};

/// Which edges of the element lie outside the reference box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overflow {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Overflow {
    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

/// Visible extent of an element against its reference box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    /// The element's own unclipped box
    pub bounds: Rect,
    /// The clipping box it was measured against
    pub reference: Rect,
    /// Visible width; `<= 0` when nothing is visible horizontally
    pub width: f32,
    /// Visible height; `<= 0` when nothing is visible vertically
    pub height: f32,
    pub overflow: Overflow,
}

impl Visibility {
    /// True when no pixel of the element is visible
    pub fn is_occluded(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Visible size with negative extents clamped to zero
    pub fn clamped_size(&self) -> Size {
        Size::new(self.width.max(0.0), self.height.max(0.0))
    }

    /// Page-space position of the element's top-left pixel
    pub fn origin(&self) -> Point {
        self.bounds.origin()
    }
}

/// Measure `element` against `reference`.
///
/// Each edge is tested on its own: the extent that survives a cut along one
/// edge is compared to the element's own size. The visible width is the
/// smallest of the element width and the left/right survivors (likewise for
/// height), so it never exceeds the element's unclipped size. When both
/// edges of one axis are cut at once only the tighter cut is reflected.
pub fn visible_dimensions(element: Rect, reference: Rect) -> Visibility {
    let Rect {
        width: own_width,
        height: own_height,
        ..
    } = element;

    let top_survivor = own_height - (reference.y - element.y);
    let right_survivor = reference.right() - element.x;
    let bottom_survivor = reference.bottom() - element.y;
    let left_survivor = own_width - (reference.x - element.x);

    let overflow = Overflow {
        top: top_survivor < own_height,
        right: right_survivor < own_width,
        bottom: bottom_survivor < own_height,
        left: left_survivor < own_width,
    };

    Visibility {
        bounds: element,
        reference,
        width: own_width.min(right_survivor).min(left_survivor),
        height: own_height.min(bottom_survivor).min(top_survivor),
        overflow,
    }
}
