//! Property-based tests for state discovery and transition modeling invariants.

use proptest::prelude::*;
use ss_common::Frame;
use ss_config::ScalingKind;
use ss_core::classifier::GaussianNaiveBayes;
use ss_core::cluster::DpMeans;
use ss_core::transition_model::window_features;
use ss_core::{Clusterer, Normalizer, TransitionMatrix, TransitionModel};

fn rows_strategy(width: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-100.0f64..100.0, width), 1..60)
}

fn labeled_frame(values: &[f64], labels: &[usize], start: usize) -> Frame {
    let n = values.len();
    Frame::new(vec!["x"], values.iter().map(|&v| vec![v]).collect())
        .expect("frame")
        .with_timestamps((start..start + n).map(|i| i as i64).collect())
        .expect("timestamps")
        .with_labels(labels.to_vec())
        .expect("labels")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn transition_rows_are_distributions(
        labels in prop::collection::vec(0usize..6, 0..200),
    ) {
        let tm = TransitionMatrix::from_labels(&labels, 6).expect("labels in range");
        for i in 0..6 {
            prop_assert_eq!(tm.get(i, i), 0.0);
            let row = tm.row(i).expect("row");
            prop_assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
            let sum: f64 = row.iter().sum();
            prop_assert!(sum == 0.0 || (sum - 1.0).abs() < 1e-9, "row {} sums to {}", i, sum);
        }
        let changes = labels.windows(2).filter(|w| w[0] != w[1]).count() as u64;
        prop_assert_eq!(tm.total_transitions(), changes);
    }

    #[test]
    fn standardized_columns_are_centered(data in rows_strategy(3)) {
        let mut norm = Normalizer::new(ScalingKind::Standard);
        let out = norm.fit_transform(&data).expect("fit");
        for j in 0..3 {
            let mean = out.iter().map(|r| r[j]).sum::<f64>() / out.len() as f64;
            prop_assert!(mean.abs() < 1e-6, "column {} mean {}", j, mean);
        }
    }

    #[test]
    fn min_max_output_in_unit_interval(data in rows_strategy(2)) {
        let mut norm = Normalizer::new(ScalingKind::MinMax);
        let out = norm.fit_transform(&data).expect("fit");
        for v in out.iter().flatten() {
            prop_assert!(*v >= -1e-12 && *v <= 1.0 + 1e-12, "value {} outside [0, 1]", v);
        }
    }

    #[test]
    fn dpmeans_labels_are_dense_and_centroids_bounded(
        data in rows_strategy(2),
        lambda in 50.0f64..5_000.0,
    ) {
        let mut dp = DpMeans::with_lambda(lambda).expect("lambda");
        // Caps may legitimately trip on adversarial inputs; only check successful fits.
        if let Ok(summary) = dp.fit(&data) {
            let labels = dp.predict(&data).expect("predict");
            prop_assert!(labels.iter().all(|&l| l < summary.n_clusters));

            let bounds = ss_math::column_bounds(&data).expect("bounds");
            for centroid in dp.centroids().expect("fitted") {
                for (v, (lo, hi)) in centroid.iter().zip(&bounds) {
                    prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
                }
            }
            prop_assert!(summary.cost.is_finite() && summary.cost >= 0.0);
        }
    }

    #[test]
    fn window_feature_count(
        n in 0usize..80,
        window in 2usize..12,
        drop_last in any::<bool>(),
    ) {
        let values: Vec<f64> = (0..n).map(|i| (i as f64).sqrt()).collect();
        let labels: Vec<usize> = (0..n).map(|i| i % 3).collect();
        let frame = labeled_frame(&values, &labels, 0);
        let rows = window_features(&frame, window, drop_last).expect("features");

        let expected = (n + 1).saturating_sub(window).saturating_sub(usize::from(drop_last));
        let expected = if n >= window { expected } else { 0 };
        prop_assert_eq!(rows.len(), expected);
        if drop_last {
            prop_assert!(rows.iter().all(|r| r.next_state.is_some()));
        }
    }

    #[test]
    fn batching_does_not_change_prediction_count(
        sizes in prop::collection::vec(1usize..25, 1..8),
        window in 2usize..8,
    ) {
        let mut model = TransitionModel::new(vec!["x"], window, Box::new(GaussianNaiveBayes::new()))
            .expect("model");
        let mut start = 0;
        for &size in &sizes {
            let values: Vec<f64> = (start..start + size).map(|i| (i % 5) as f64).collect();
            let labels: Vec<usize> = (start..start + size).map(|i| (i / 4) % 2).collect();
            model.partial_fit(&labeled_frame(&values, &labels, start)).expect("partial fit");
            prop_assert!(model.history_len() <= window);
            start += size;
        }

        prop_assert_eq!(model.predictions(), start.saturating_sub(window) as u64);
        if let Some(acc) = model.accuracy() {
            prop_assert!((0.0..=1.0).contains(&acc));
        }
    }
}
