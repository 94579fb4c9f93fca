//! Criterion benchmarks for `ss-math`.
//!
//! Focus on the kernels that run once per sample in the streaming path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ss_math::{nearest, rolling_stats};

fn bench_rolling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling");
    let values: Vec<f64> = (0..10_000).map(|i| (i as f64 * 0.01).sin()).collect();

    for window in [5usize, 20, 100] {
        group.bench_with_input(
            BenchmarkId::new("rolling_stats", window),
            &window,
            |b, &w| {
                b.iter(|| black_box(rolling_stats(black_box(&values), w)));
            },
        );
    }

    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");

    for k in [5usize, 20, 100] {
        let centroids: Vec<Vec<f64>> = (0..k)
            .map(|i| (0..9).map(|d| (i * 9 + d) as f64 * 0.1).collect())
            .collect();
        let point = vec![0.37; 9];
        group.bench_with_input(BenchmarkId::new("nearest", k), &centroids, |b, cs| {
            b.iter(|| black_box(nearest(black_box(&point), cs)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rolling, bench_nearest);
criterion_main!(benches);
