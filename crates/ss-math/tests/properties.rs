//! Property-based tests for ss-math numerical kernels.
//!
//! Uses proptest to verify the incremental kernels agree with their direct
//! definitions across many random inputs.

use proptest::prelude::*;
use ss_math::{
    column_bounds, entropy, information_gain, least_squares_slope, mean_vector, nearest,
    rolling_stats, squared_euclidean, GaussianEstimator,
};

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-7;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// Rolling window properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The O(1) sliding update agrees with a direct fit on every window.
    #[test]
    fn rolling_matches_direct_fit(
        values in prop::collection::vec(-1000.0..1000.0f64, 2..120),
        window in 2usize..12,
    ) {
        let stats = rolling_stats(&values, window);
        prop_assert_eq!(stats.len(), values.len());
        for i in 0..values.len() {
            if i + 1 < window {
                prop_assert!(stats[i].is_none());
                continue;
            }
            let slice = &values[i + 1 - window..=i];
            let got = stats[i].unwrap();
            let mean = slice.iter().sum::<f64>() / window as f64;
            prop_assert!(approx_eq(got.mean, mean, TOL), "mean {} vs {}", got.mean, mean);
            let slope = least_squares_slope(slice);
            prop_assert!(approx_eq(got.slope, slope, TOL), "slope {} vs {}", got.slope, slope);
        }
    }

    /// Adding a constant shifts the mean but leaves the slope untouched.
    #[test]
    fn slope_is_shift_invariant(
        values in prop::collection::vec(-100.0..100.0f64, 3..40),
        shift in -1e3..1e3f64,
    ) {
        let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
        prop_assert!(approx_eq(
            least_squares_slope(&values),
            least_squares_slope(&shifted),
            1e-6
        ));
    }
}

// ============================================================================
// Vector kernel properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Squared distance is symmetric and zero only on identical points.
    #[test]
    fn squared_euclidean_symmetric(
        a in prop::collection::vec(-50.0..50.0f64, 3),
        b in prop::collection::vec(-50.0..50.0f64, 3),
    ) {
        prop_assert_eq!(squared_euclidean(&a, &b), squared_euclidean(&b, &a));
        prop_assert_eq!(squared_euclidean(&a, &a), 0.0);
    }

    /// The mean of a set lies within its per-column bounds.
    #[test]
    fn mean_within_bounds(rows in prop::collection::vec(prop::collection::vec(-1e4..1e4f64, 2), 1..50)) {
        let mean = mean_vector(&rows).unwrap();
        let bounds = column_bounds(&rows).unwrap();
        for (m, (lo, hi)) in mean.iter().zip(bounds) {
            prop_assert!(*m >= lo - 1e-9 && *m <= hi + 1e-9);
        }
    }

    /// The nearest centroid is never farther than any other centroid.
    #[test]
    fn nearest_is_minimal(
        point in prop::collection::vec(-10.0..10.0f64, 2),
        centroids in prop::collection::vec(prop::collection::vec(-10.0..10.0f64, 2), 1..8),
    ) {
        let (idx, dist) = nearest(&point, &centroids).unwrap();
        for (j, c) in centroids.iter().enumerate() {
            let d = squared_euclidean(&point, c);
            prop_assert!(dist <= d);
            if d == dist {
                prop_assert!(idx <= j);
            }
        }
    }
}

// ============================================================================
// Distribution properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Entropy of k classes is bounded by log2(k).
    #[test]
    fn entropy_bounded(weights in prop::collection::vec(0.0..100.0f64, 1..10)) {
        let h = entropy(&weights);
        prop_assert!(h >= -1e-12);
        prop_assert!(h <= (weights.len() as f64).log2() + 1e-9);
    }

    /// Information gain of any binary split is non-negative.
    #[test]
    fn information_gain_non_negative(
        left in prop::collection::vec(0.0..50.0f64, 3),
        right in prop::collection::vec(0.0..50.0f64, 3),
    ) {
        let pre: Vec<f64> = left.iter().zip(&right).map(|(l, r)| l + r).collect();
        let gain = information_gain(&pre, &[left, right]);
        prop_assert!(gain >= -1e-9, "gain {}", gain);
    }

    /// CDF is monotone non-decreasing.
    #[test]
    fn gaussian_cdf_monotone(
        xs in prop::collection::vec(-20.0..20.0f64, 3..30),
        a in -5.0..5.0f64,
        b in -5.0..5.0f64,
    ) {
        let mut est = GaussianEstimator::new();
        for x in &xs {
            est.update(*x, 1.0);
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(est.cdf(lo) <= est.cdf(hi) + 1e-12);
    }
}
