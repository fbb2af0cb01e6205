//! Cached raster snapshots
//!
//! A snapshot is the RGBA8 rasterization of an element's full content box,
//! produced once by the host (and again after a resize). The detector cuts
//! newly hidden strips out of it with [`RasterSnapshot::region`].

use crate::error::{DisintegrateError, Result};
use disintegrate_paint::Rgba8;

/// Integer pixel rectangle in snapshot space. The origin may be negative or
/// past the edge; such pixels read as transparent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Truncate fractional layout values toward zero; negative sizes become 0
    pub fn from_layout(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x as i32, y as i32, width.max(0.0) as u32, height.max(0.0) as u32)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }
}

/// A full-element raster
#[derive(Clone, Debug, PartialEq)]
pub struct RasterSnapshot {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RasterSnapshot {
    /// Wrap an RGBA8 buffer of `width * height * 4` bytes
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(DisintegrateError::SnapshotSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// A snapshot filled with one color
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color.to_array());
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Build a snapshot by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).to_array());
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a pixel at (x, y); `None` outside the snapshot
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(idx..idx + 4).map(Rgba8::from_slice)
    }

    /// View a sub-rectangle. Pixels outside the snapshot read as
    /// transparent black, so the region always yields exactly
    /// `width * height` pixels.
    pub fn region(&self, rect: PixelRect) -> RasterRegion<'_> {
        self.region_scaled(rect, 1.0)
    }

    /// View a sub-rectangle given in layout pixels of a snapshot rasterized
    /// at `scale`. The region still yields one pixel per layout pixel, read
    /// from the top-left of its footprint in the scaled buffer.
    pub fn region_scaled(&self, rect: PixelRect, scale: f32) -> RasterRegion<'_> {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        RasterRegion {
            snapshot: self,
            rect,
            scale,
        }
    }

    /// The whole snapshot as one region
    pub fn full_region(&self) -> RasterRegion<'_> {
        self.region(PixelRect::new(0, 0, self.width, self.height))
    }
}

/// A rectangle of a snapshot, read lazily
#[derive(Clone, Copy, Debug)]
pub struct RasterRegion<'a> {
    snapshot: &'a RasterSnapshot,
    rect: PixelRect,
    scale: f32,
}

impl<'a> RasterRegion<'a> {
    /// Source rectangle in layout pixels
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.rect.width
    }

    pub fn height(&self) -> u32 {
        self.rect.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pixel_count(&self) -> usize {
        self.rect.pixel_count()
    }

    /// Pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Rgba8> + 'a {
        let region = *self;
        (0..region.rect.height).flat_map(move |row| {
            (0..region.rect.width).map(move |col| region.pixel_at(col, row))
        })
    }

    fn pixel_at(&self, col: u32, row: u32) -> Rgba8 {
        let x = self.source(self.rect.x, col);
        let y = self.source(self.rect.y, row);
        self.snapshot.pixel(x, y).unwrap_or(Rgba8::TRANSPARENT)
    }

    /// Buffer coordinate of layout coordinate `origin + offset`
    fn source(&self, origin: i32, offset: u32) -> i32 {
        let layout = i64::from(origin) + i64::from(offset);
        if self.scale == 1.0 {
            return layout.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        }
        (layout as f64 * f64::from(self.scale)).floor() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterSnapshot {
        RasterSnapshot::from_fn(width, height, |x, y| Rgba8::new(x as u8, y as u8, 0, 255))
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let err = RasterSnapshot::new(vec![0; 10], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            DisintegrateError::SnapshotSize { expected: 16, actual: 10, .. }
        ));
    }

    #[test]
    fn test_region_reads_row_major() {
        let snap = gradient(10, 10);
        let region = snap.region(PixelRect::new(2, 3, 3, 2));
        let pixels: Vec<_> = region.pixels().collect();
        assert_eq!(pixels.len(), 6);
        assert_eq!(pixels[0], Rgba8::new(2, 3, 0, 255));
        assert_eq!(pixels[2], Rgba8::new(4, 3, 0, 255));
        assert_eq!(pixels[3], Rgba8::new(2, 4, 0, 255));
    }

    #[test]
    fn test_out_of_range_pixels_are_transparent() {
        let snap = RasterSnapshot::filled(4, 4, Rgba8::new(9, 9, 9, 255));
        let region = snap.region(PixelRect::new(-1, 2, 3, 4));
        assert_eq!(region.pixel_count(), 12);
        assert_eq!(region.pixels().count(), 12);
        let transparent = region.pixels().filter(|p| *p == Rgba8::TRANSPARENT).count();
        // Column -1 (4 rows) plus rows 4 and 5 of the two in-range columns.
        assert_eq!(transparent, 4 + 4);
    }

    #[test]
    fn test_oversized_region_is_read_lazily() {
        let snap = RasterSnapshot::filled(2, 2, Rgba8::new(9, 9, 9, 255));
        let region = snap.region(PixelRect::new(0, 0, 4000, 4000));
        assert_eq!(region.pixel_count(), 16_000_000);

        let mut pixels = region.pixels();
        assert_eq!(pixels.next(), Some(Rgba8::new(9, 9, 9, 255)));
        assert_eq!(pixels.next(), Some(Rgba8::new(9, 9, 9, 255)));
        assert_eq!(pixels.next(), Some(Rgba8::TRANSPARENT));
        // Second row starts back inside the snapshot
        let second_row: Vec<_> = region.pixels().skip(4000).take(3).collect();
        assert_eq!(
            second_row,
            vec![Rgba8::new(9, 9, 9, 255), Rgba8::new(9, 9, 9, 255), Rgba8::TRANSPARENT]
        );
    }

    #[test]
    fn test_scaled_region_reads_layout_pixels() {
        // 2x raster of a 5x5 element
        let snap = gradient(10, 10);
        let region = snap.region_scaled(PixelRect::new(1, 3, 2, 2), 2.0);
        assert_eq!(region.pixel_count(), 4);
        let pixels: Vec<_> = region.pixels().collect();
        assert_eq!(
            pixels,
            vec![
                Rgba8::new(2, 6, 0, 255),
                Rgba8::new(4, 6, 0, 255),
                Rgba8::new(2, 8, 0, 255),
                Rgba8::new(4, 8, 0, 255),
            ]
        );

        // Past the scaled edge reads transparent
        let edge = snap.region_scaled(PixelRect::new(4, 4, 2, 1), 2.0);
        let pixels: Vec<_> = edge.pixels().collect();
        assert_eq!(pixels, vec![Rgba8::new(8, 8, 0, 255), Rgba8::TRANSPARENT]);
    }

    #[test]
    fn test_invalid_scale_reads_one_to_one() {
        let snap = gradient(4, 4);
        assert_eq!(snap.region_scaled(PixelRect::new(0, 0, 1, 1), 0.0).scale(), 1.0);
        assert_eq!(snap.region_scaled(PixelRect::new(0, 0, 1, 1), f32::NAN).scale(), 1.0);
    }

    #[test]
    fn test_layout_values_truncate() {
        assert_eq!(
            PixelRect::from_layout(40.7, 0.2, 59.9, -3.0),
            PixelRect::new(40, 0, 59, 0)
        );
    }
}
