//! Numerically stable reductions over probability vectors.

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Normalize log-weights into probabilities.
///
/// Returns `None` when every weight is -inf (or the input is empty).
pub fn softmax_from_log(log_weights: &[f64]) -> Option<Vec<f64>> {
    let norm = log_sum_exp(log_weights);
    if !norm.is_finite() {
        return None;
    }
    Some(log_weights.iter().map(|w| (w - norm).exp()).collect())
}

/// Shannon entropy in bits of an unnormalized non-negative distribution.
pub fn entropy(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return 0.0;
    }
    weights
        .iter()
        .filter(|w| **w > 0.0)
        .map(|w| {
            let p = w / total;
            -p * p.log2()
        })
        .sum()
}

/// Information gain of splitting `pre` into the `branches` distributions.
///
/// Each distribution is an unnormalized vector of class weights.
pub fn information_gain(pre: &[f64], branches: &[Vec<f64>]) -> f64 {
    let total: f64 = branches.iter().map(|b| b.iter().sum::<f64>()).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let post: f64 = branches
        .iter()
        .map(|b| {
            let w: f64 = b.iter().sum();
            (w / total) * entropy(b)
        })
        .sum();
    entropy(pre) - post
}

/// Argmax index of a slice, preferring the lowest index on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
