//! Spawn sampling throughput over a full-width strip

use criterion::{criterion_group, criterion_main, Criterion};
use disintegrate_core::{CornerExclusion, PixelRect, RasterSnapshot, SpawnSampler};
use disintegrate_paint::{Point, Rgb, Rgba8, Size};
use std::hint::black_box;

fn sample_strip(c: &mut Criterion) {
    let snapshot = RasterSnapshot::from_fn(1024, 768, |x, y| {
        Rgba8::new((x % 256) as u8, (y % 256) as u8, 96, 255)
    });
    let region = snapshot.region(PixelRect::new(0, 600, 1024, 168));
    let ignored = [Rgb::new(255, 255, 255)];
    let corners = CornerExclusion::new(12.0, Size::new(1024.0, 768.0));

    for factor in [1u32, 35] {
        c.bench_function(&format!("sample_strip_r{factor}"), |b| {
            b.iter(|| {
                let mut counter = 0;
                let mut sampler = SpawnSampler::new(&mut counter, factor, &ignored, None, corners);
                let mut emitted = 0usize;
                sampler.sample(black_box(&region), Point::ZERO, |_, _, _| emitted += 1);
                emitted
            })
        });
    }
}

criterion_group!(benches, sample_strip);
criterion_main!(benches);
