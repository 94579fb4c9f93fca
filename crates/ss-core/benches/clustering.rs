//! Criterion benchmarks for state discovery and online transition learning.
//!
//! Inputs are synthetic and seeded so runs are comparable across machines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ss_common::Frame;
use ss_core::classifier::HoeffdingTree;
use ss_core::cluster::{DpMeans, KMeans};
use ss_core::{Clusterer, TransitionModel};

/// `n` points scattered around `centers` fixed cluster centres in 4 dimensions.
fn blobs(n: usize, centers: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let c = (i % centers) as f64 * 10.0;
            (0..4).map(|_| c + rng.random_range(-1.0..1.0)).collect()
        })
        .collect()
}

fn labeled_stream(n: usize) -> Frame {
    let mut rng = StdRng::seed_from_u64(11);
    let rows = (0..n)
        .map(|i| {
            let regime = (i / 25) % 4;
            vec![
                regime as f64 * 3.0 + rng.random_range(-0.5..0.5),
                50.0 - regime as f64 + rng.random_range(-0.5..0.5),
            ]
        })
        .collect();
    Frame::new(vec!["temp", "pressure"], rows)
        .and_then(|f| f.with_timestamps((0..n as i64).collect()))
        .and_then(|f| f.with_labels((0..n).map(|i| (i / 25) % 4).collect()))
        .expect("synthetic stream should build")
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");

    for n in [500usize, 5_000] {
        let data = blobs(n, 5, 42);

        group.bench_with_input(BenchmarkId::new("kmeans_fit", n), &data, |b, data| {
            b.iter(|| {
                let mut km = KMeans::with_clusters(5, 0).expect("valid k");
                let summary = km.fit(black_box(data)).expect("fit");
                black_box(summary.cost);
            })
        });

        group.bench_with_input(BenchmarkId::new("dpmeans_fit", n), &data, |b, data| {
            b.iter(|| {
                let mut dp = DpMeans::with_lambda(20.0).expect("valid lambda");
                let summary = dp.fit(black_box(data)).expect("fit");
                black_box(summary.n_clusters);
            })
        });
    }

    group.finish();
}

fn bench_transition_model(c: &mut Criterion) {
    let stream = labeled_stream(2_000);
    let mut group = c.benchmark_group("transition_model");

    for window in [5usize, 20] {
        group.bench_with_input(
            BenchmarkId::new("partial_fit_2k", window),
            &window,
            |b, &window| {
                b.iter(|| {
                    let mut model = TransitionModel::new(
                        vec!["temp", "pressure"],
                        window,
                        Box::new(HoeffdingTree::default()),
                    )
                    .expect("valid model");
                    let report = model.partial_fit(black_box(&stream)).expect("partial fit");
                    black_box(report.correct);
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_clustering, bench_transition_model);
criterion_main!(benches);
