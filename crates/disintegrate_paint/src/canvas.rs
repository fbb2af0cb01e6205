//! Canvas - the per-element drawing surface
//!
//! Every tracked element owns one canvas covering the whole scrollable
//! document. The animation pass clears it and lets each live particle record
//! its shape for the current frame. The recorded commands are what a host
//! renderer rasterizes; nothing here touches pixels.

use crate::color::Color;
use crate::primitives::{Circle, Point, Rect, Size};

/// A paint command for the renderer
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCommand {
    Clear { rect: Rect },
    FillRect { rect: Rect, color: Color },
    FillCircle { circle: Circle, color: Color },
}

/// A recording drawing surface
#[derive(Debug, Default)]
pub struct Canvas {
    size: Size,
    commands: Vec<PaintCommand>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the surface. Drops anything recorded so far.
    pub fn resize(&mut self, size: Size) {
        tracing::trace!(width = size.width, height = size.height, "canvas resized");
        self.size = size;
        self.commands.clear();
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of shapes drawn since the last clear
    pub fn shape_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| !matches!(c, PaintCommand::Clear { .. }))
            .count()
    }

    /// Clear the whole surface, discarding the previous frame's shapes
    pub fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(PaintCommand::Clear {
            rect: Rect::from_origin_size(Point::ZERO, self.size),
        });
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if width <= 0.0 || height <= 0.0 || color.a <= 0.0 {
            return;
        }
        self.commands.push(PaintCommand::FillRect {
            rect: Rect::new(x, y, width, height),
            color,
        });
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        self.commands.push(PaintCommand::FillCircle {
            circle: Circle::new(Point::new(cx, cy), radius),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_to_single_command() {
        let mut canvas = Canvas::new(Size::new(200.0, 100.0));
        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, Color::BLACK);
        canvas.fill_circle(5.0, 5.0, 2.0, Color::BLACK);
        assert_eq!(canvas.shape_count(), 2);

        canvas.clear();
        assert_eq!(canvas.shape_count(), 0);
        assert_eq!(
            canvas.commands(),
            &[PaintCommand::Clear {
                rect: Rect::new(0.0, 0.0, 200.0, 100.0)
            }]
        );
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut canvas = Canvas::new(Size::new(10.0, 10.0));
        canvas.fill_rect(0.0, 0.0, 0.0, 5.0, Color::BLACK);
        canvas.fill_circle(0.0, 0.0, -1.0, Color::BLACK);
        canvas.fill_rect(0.0, 0.0, 5.0, 5.0, Color::TRANSPARENT);
        assert_eq!(canvas.shape_count(), 0);
    }

    #[test]
    fn test_resize_drops_recording() {
        let mut canvas = Canvas::new(Size::new(10.0, 10.0));
        canvas.fill_rect(0.0, 0.0, 5.0, 5.0, Color::BLACK);
        canvas.resize(Size::new(20.0, 30.0));
        assert!(canvas.commands().is_empty());
        assert_eq!(canvas.size(), Size::new(20.0, 30.0));
    }
}
