//! Per-feature, per-class Gaussian statistics.
//!
//! Shared by the naive Bayes scorer and the Hoeffding tree split search.

use ss_common::Label;
use ss_math::{information_gain, GaussianEstimator};

/// Candidate thresholds evaluated per feature.
const N_SPLIT_POINTS: usize = 10;

/// Variance floor for likelihoods, so single-valued classes stay finite.
const MIN_VARIANCE: f64 = 1e-9;

const LOG_2PI: f64 = 1.837_877_066_409_345_3;

#[derive(Debug, Clone, Default)]
struct ClassStats {
    estimator: GaussianEstimator,
    min: f64,
    max: f64,
}

/// Gaussian attribute observer for one numeric feature.
#[derive(Debug, Clone, Default)]
pub struct GaussianObserver {
    per_class: Vec<Option<ClassStats>>,
}

/// Best binary split found on one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitCandidate {
    pub feature: usize,
    pub threshold: f64,
    pub merit: f64,
    /// Estimated class weights for `x <= threshold`.
    pub left: Vec<f64>,
    /// Estimated class weights for `x > threshold`.
    pub right: Vec<f64>,
}

impl GaussianObserver {
    pub fn update(&mut self, x: f64, class: Label, weight: f64) {
        if !x.is_finite() {
            return;
        }
        if self.per_class.len() <= class {
            self.per_class.resize(class + 1, None);
        }
        let stats = self.per_class[class].get_or_insert_with(|| ClassStats {
            estimator: GaussianEstimator::new(),
            min: x,
            max: x,
        });
        stats.estimator.update(x, weight);
        stats.min = stats.min.min(x);
        stats.max = stats.max.max(x);
    }

    /// Log density of `x` under the class-conditional Gaussian.
    ///
    /// `None` when the class was never observed for this feature.
    pub fn log_likelihood(&self, x: f64, class: Label) -> Option<f64> {
        let stats = self.per_class.get(class)?.as_ref()?;
        let est = &stats.estimator;
        let var = est.variance().max(MIN_VARIANCE);
        let d = x - est.mean();
        Some(-0.5 * (d * d / var + var.ln() + LOG_2PI))
    }

    fn range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for stats in self.per_class.iter().flatten() {
            lo = lo.min(stats.min);
            hi = hi.max(stats.max);
        }
        (lo < hi).then_some((lo, hi))
    }

    /// Split class weights at `threshold` using each class's Gaussian CDF.
    fn split_distributions(&self, threshold: f64, n_classes: usize) -> (Vec<f64>, Vec<f64>) {
        let mut left = vec![0.0; n_classes];
        let mut right = vec![0.0; n_classes];
        for (c, stats) in self.per_class.iter().enumerate() {
            let Some(stats) = stats else { continue };
            let w = stats.estimator.weight();
            if threshold < stats.min {
                right[c] += w;
            } else if threshold >= stats.max {
                left[c] += w;
            } else {
                let below = (stats.estimator.cdf(threshold) * w).clamp(0.0, w);
                left[c] += below;
                right[c] += w - below;
            }
        }
        (left, right)
    }

    /// Highest-gain threshold among evenly spaced candidates inside the
    /// observed range.
    pub fn best_split(&self, feature: usize, pre: &[f64]) -> Option<SplitCandidate> {
        let (lo, hi) = self.range()?;
        let n_classes = pre.len().max(self.per_class.len());
        let step = (hi - lo) / (N_SPLIT_POINTS + 1) as f64;

        let mut best: Option<SplitCandidate> = None;
        for i in 1..=N_SPLIT_POINTS {
            let threshold = lo + step * i as f64;
            let (left, right) = self.split_distributions(threshold, n_classes);
            let merit = information_gain(pre, &[left.clone(), right.clone()]);
            if best.as_ref().is_none_or(|b| merit > b.merit) {
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    merit,
                    left,
                    right,
                });
            }
        }
        best
    }
}

/// Naive Bayes class choice from class weights and per-feature observers.
///
/// Returns `None` when nothing has been observed. If every class scores
/// `-inf`, falls back to the majority class.
pub fn naive_bayes_predict(
    class_weights: &[f64],
    observers: &[GaussianObserver],
    x: &[f64],
) -> Option<Label> {
    let total: f64 = class_weights.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let scores: Vec<f64> = class_weights
        .iter()
        .enumerate()
        .map(|(c, &w)| {
            if w <= 0.0 {
                return f64::NEG_INFINITY;
            }
            let mut score = (w / total).ln();
            for (observer, &value) in observers.iter().zip(x) {
                if let Some(ll) = observer.log_likelihood(value, c) {
                    score += ll;
                }
            }
            score
        })
        .collect();

    if scores.iter().all(|s| !s.is_finite()) {
        return majority_class(class_weights);
    }
    ss_math::argmax(&scores)
}

/// Heaviest class, lowest id on ties; `None` with no weight.
pub fn majority_class(class_weights: &[f64]) -> Option<Label> {
    if class_weights.iter().all(|&w| w <= 0.0) {
        return None;
    }
    ss_math::argmax(class_weights)
}
