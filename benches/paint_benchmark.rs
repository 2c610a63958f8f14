//! Painting engine benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use impasto::{
    BackgroundKind, BrushFamily, FieldKind, NullProgress, PaintConfig, PaintEngine, Raster,
};

fn round_brush(side: usize) -> Raster {
    let mut r = Raster::new(side, side);
    let c = (side as f32 - 1.0) / 2.0;
    for y in 0..side {
        for x in 0..side {
            let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
            if d < c {
                let v = (255.0 * (1.0 - d / c)) as u8;
                r.set_pixel(x, y, [v, v, v]);
            }
        }
    }
    r
}

fn gradient(w: usize, h: usize) -> Raster {
    let mut r = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            r.set_pixel(x, y, [(x * 255 / w) as u8, (y * 255 / h) as u8, 128]);
        }
    }
    r
}

fn benchmark_paint(c: &mut Criterion) {
    let mut group = c.benchmark_group("Paint");
    group.sample_size(10);

    let engine = PaintEngine::new();
    let brush = round_brush(16);

    for side in [64, 128, 256].iter() {
        let source = gradient(*side, *side);
        let cfg = PaintConfig::default();

        group.bench_with_input(BenchmarkId::new("default", side), &source, |b, source| {
            b.iter(|| {
                let mut image = source.clone();
                engine
                    .paint(&mut image, None, &brush, None, &cfg, 42, &mut NullProgress)
                    .unwrap();
                image
            })
        });
    }

    group.finish();
}

fn benchmark_adaptive_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Adaptive Selection");
    group.sample_size(10);

    let engine = PaintEngine::new();
    let brush = round_brush(16);
    let source = gradient(128, 128);

    let cfg = PaintConfig {
        orient_kind: FieldKind::Adaptive,
        size_kind: FieldKind::Adaptive,
        background: BackgroundKind::KeepOriginal,
        ..PaintConfig::default()
    };
    group.bench_function("both_adaptive_128", |b| {
        b.iter(|| {
            let mut image = source.clone();
            engine
                .paint(&mut image, None, &brush, None, &cfg, 42, &mut NullProgress)
                .unwrap();
            image
        })
    });

    group.finish();
}

fn benchmark_brush_preparation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Brush Preparation");

    let brush = round_brush(48);
    for (orient, size) in [(2usize, 4usize), (8, 8)].iter() {
        let cfg = PaintConfig {
            orient_num: *orient,
            size_num: *size,
            ..PaintConfig::default()
        };
        group.bench_function(format!("{}x{}", orient, size), |b| {
            b.iter(|| BrushFamily::prepare(&brush, &cfg))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_paint,
    benchmark_adaptive_selection,
    benchmark_brush_preparation
);
criterion_main!(benches);
