//! Particle spawn sampler
//!
//! Walks a snapshot region pixel by pixel and decides which pixels become
//! particles. The decision is a stride over a per-element counter that keeps
//! counting across regions, frames, and batches: every visited pixel bumps
//! it, so the sampling phase does not depend on where regions start or end.
//!
//! Sampled pixels are then filtered: ignored colors and pixels cut off by a
//! rounded corner are dropped.

use crate::snapshot::RasterRegion;
use disintegrate_paint::{Circle, Point, Rgb, Rgba8, Size};

/// Quarter-disk exclusion for rounded corners.
///
/// The radius is the configured border radius capped at half the element's
/// width and height. A local pixel inside a corner's `r x r` square that lies
/// farther than `r` from that corner's circle center is cut off; pixels on or
/// inside the circle are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerExclusion {
    radius: f32,
    size: Size,
}

impl CornerExclusion {
    pub fn new(configured_radius: f32, size: Size) -> Self {
        let radius = configured_radius
            .min(size.width / 2.0)
            .min(size.height / 2.0);
        Self {
            radius: if radius.is_finite() { radius } else { 0.0 },
            size,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether `local` (element-relative) falls in a cut-off corner
    pub fn excludes(&self, local: Point) -> bool {
        let r = self.radius;
        if r <= 0.0 {
            return false;
        }
        let right = self.size.width - r;
        let bottom = self.size.height - r;

        let cx = if local.x < r {
            r
        } else if local.x > right {
            right
        } else {
            return false;
        };
        let cy = if local.y < r {
            r
        } else if local.y > bottom {
            bottom
        } else {
            return false;
        };

        !Circle::new(Point::new(cx, cy), r).contains(local)
    }
}

/// Counts from one sampling walk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleStats {
    /// Pixels walked (every one advances the counter)
    pub visited: usize,
    /// Pixels that landed on the stride
    pub sampled: usize,
    /// Sampled pixels dropped for matching an ignored color
    pub ignored_color: usize,
    /// Sampled pixels dropped by corner exclusion
    pub outside_corner: usize,
    /// Pixels handed on to become particles
    pub emitted: usize,
}

impl SampleStats {
    pub fn merge(&mut self, other: SampleStats) {
        self.visited += other.visited;
        self.sampled += other.sampled;
        self.ignored_color += other.ignored_color;
        self.outside_corner += other.outside_corner;
        self.emitted += other.emitted;
    }
}

/// One element's view of the sampling state for a spawning pass
pub struct SpawnSampler<'a> {
    counter: &'a mut u64,
    reduction_factor: u64,
    ignored_colors: &'a [Rgb],
    color_override: Option<Rgb>,
    corners: CornerExclusion,
}

impl<'a> SpawnSampler<'a> {
    pub fn new(
        counter: &'a mut u64,
        reduction_factor: u32,
        ignored_colors: &'a [Rgb],
        color_override: Option<Rgb>,
        corners: CornerExclusion,
    ) -> Self {
        Self {
            counter,
            reduction_factor: u64::from(reduction_factor.max(1)),
            ignored_colors,
            color_override,
            corners,
        }
    }

    /// Walk `region` in buffer order, calling `emit(world, local, color)` for
    /// every pixel that survives sampling and filtering.
    ///
    /// `origin` is the page-space position of the element's top-left pixel;
    /// a pixel's local coordinate is its position in the snapshot, which
    /// already carries any top/left chop offset through the region's source
    /// rectangle.
    pub fn sample(
        &mut self,
        region: &RasterRegion,
        origin: Point,
        mut emit: impl FnMut(Point, Point, Rgba8),
    ) -> SampleStats {
        let mut stats = SampleStats::default();
        let rect = region.rect();
        let width = rect.width.max(1) as usize;

        for (i, pixel) in region.pixels().enumerate() {
            stats.visited += 1;
            let on_stride = *self.counter % self.reduction_factor == 0;
            *self.counter += 1;
            if !on_stride {
                continue;
            }
            stats.sampled += 1;

            let local = Point::new(
                rect.x as f32 + (i % width) as f32,
                rect.y as f32 + (i / width) as f32,
            );

            let color = self.color_override.map_or(pixel, Rgb::opaque);
            if self.ignored_colors.iter().any(|c| color.same_rgb(*c)) {
                stats.ignored_color += 1;
                continue;
            }
            if self.corners.excludes(local) {
                stats.outside_corner += 1;
                continue;
            }

            stats.emitted += 1;
            emit(origin.offset(local.x, local.y), local, color);
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{PixelRect, RasterSnapshot};

    fn white(width: u32, height: u32) -> RasterSnapshot {
        RasterSnapshot::filled(width, height, Rgba8::new(255, 255, 255, 255))
    }

    fn sample_count(region: &RasterRegion, counter: &mut u64, factor: u32) -> SampleStats {
        let mut sampler =
            SpawnSampler::new(counter, factor, &[], None, CornerExclusion::default());
        sampler.sample(region, Point::ZERO, |_, _, _| {})
    }

    #[test]
    fn test_stride_samples_ceiling_of_pixel_count() {
        let snap = white(100, 100);
        for factor in [1, 2, 7, 35, 64, 10_000] {
            let region = snap.region(PixelRect::new(0, 40, 100, 60));
            let mut counter = 0;
            let stats = sample_count(&region, &mut counter, factor);
            let expected = 6000usize.div_ceil(factor as usize);
            assert_eq!(stats.sampled, expected, "factor {factor}");
            assert_eq!(counter, 6000, "counter advances on every pixel");
        }
    }

    #[test]
    fn test_phase_carries_across_regions() {
        let snap = white(10, 10);
        let a = snap.region(PixelRect::new(0, 0, 7, 1));
        let b = snap.region(PixelRect::new(0, 1, 6, 1));

        let mut counter = 0;
        let mut hits = Vec::new();
        for region in [&a, &b] {
            let mut sampler =
                SpawnSampler::new(&mut counter, 5, &[], None, CornerExclusion::default());
            sampler.sample(region, Point::ZERO, |_, local, _| hits.push(local));
        }
        // Global positions 0, 5, 10 -> a[0], a[5], b[3].
        assert_eq!(
            hits,
            vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(3.0, 1.0)
            ]
        );
    }

    #[test]
    fn test_world_position_adds_region_offset() {
        let snap = white(10, 10);
        let region = snap.region(PixelRect::new(4, 6, 2, 2));
        let mut counter = 0;
        let mut worlds = Vec::new();
        let mut sampler = SpawnSampler::new(&mut counter, 1, &[], None, CornerExclusion::default());
        sampler.sample(&region, Point::new(100.0, 200.0), |world, _, _| worlds.push(world));
        assert_eq!(
            worlds,
            vec![
                Point::new(104.0, 206.0),
                Point::new(105.0, 206.0),
                Point::new(104.0, 207.0),
                Point::new(105.0, 207.0),
            ]
        );
    }

    #[test]
    fn test_ignored_colors_match_rgb_regardless_of_alpha() {
        let snap = RasterSnapshot::from_fn(4, 1, |x, _| match x {
            0 => Rgba8::new(255, 255, 255, 255),
            1 => Rgba8::new(255, 255, 255, 0),
            2 => Rgba8::new(255, 255, 255, 17),
            _ => Rgba8::new(10, 20, 30, 255),
        });
        let ignored = [Rgb::new(255, 255, 255)];
        let mut counter = 0;
        let mut colors = Vec::new();
        let mut sampler =
            SpawnSampler::new(&mut counter, 1, &ignored, None, CornerExclusion::default());
        let stats = sampler.sample(&snap.full_region(), Point::ZERO, |_, _, c| colors.push(c));
        assert_eq!(colors, vec![Rgba8::new(10, 20, 30, 255)]);
        assert_eq!(stats.ignored_color, 3);
    }

    #[test]
    fn test_color_override_replaces_pixel_color() {
        let snap = RasterSnapshot::filled(2, 1, Rgba8::new(1, 2, 3, 40));
        let mut counter = 0;
        let mut colors = Vec::new();
        let mut sampler = SpawnSampler::new(
            &mut counter,
            1,
            &[],
            Some(Rgb::new(200, 0, 0)),
            CornerExclusion::default(),
        );
        sampler.sample(&snap.full_region(), Point::ZERO, |_, _, c| colors.push(c));
        assert_eq!(colors, vec![Rgba8::new(200, 0, 0, 255); 2]);
    }

    #[test]
    fn test_corner_exclusion_cuts_only_outside_the_circle() {
        let corners = CornerExclusion::new(10.0, Size::new(100.0, 50.0));
        assert_eq!(corners.radius(), 10.0);

        // Top-left corner pixel is well outside the quarter circle.
        assert!(corners.excludes(Point::new(0.0, 0.0)));
        // Exactly on the circle: 6-8-10 triangle from the center (10, 10).
        assert!(!corners.excludes(Point::new(4.0, 2.0)));
        // Inside the corner square but within the circle.
        assert!(!corners.excludes(Point::new(5.0, 5.0)));
        // Other three corners.
        assert!(corners.excludes(Point::new(99.0, 0.0)));
        assert!(corners.excludes(Point::new(99.0, 49.0)));
        assert!(corners.excludes(Point::new(0.0, 49.0)));
        // Edges away from corners are never cut.
        assert!(!corners.excludes(Point::new(50.0, 0.0)));
        assert!(!corners.excludes(Point::new(0.0, 25.0)));
    }

    #[test]
    fn test_corner_radius_is_capped_at_half_extent() {
        let corners = CornerExclusion::new(500.0, Size::new(40.0, 20.0));
        assert_eq!(corners.radius(), 10.0);
        assert!(!CornerExclusion::new(0.0, Size::new(40.0, 20.0)).excludes(Point::ZERO));
    }

    #[test]
    fn test_corner_filter_applies_during_sampling() {
        let snap = white(20, 20);
        let corners = CornerExclusion::new(10.0, Size::new(20.0, 20.0));
        let mut counter = 0;
        let mut sampler = SpawnSampler::new(&mut counter, 1, &[], None, corners);
        let stats = sampler.sample(&snap.full_region(), Point::ZERO, |world, _, _| {
            let d = world.distance_to(Point::new(10.0, 10.0));
            assert!(d <= 10.0 + 1e-4, "kept pixel {world:?} lies in a cut corner");
        });
        assert!(stats.outside_corner > 0);
        assert_eq!(stats.emitted + stats.outside_corner, 400);
    }
}
