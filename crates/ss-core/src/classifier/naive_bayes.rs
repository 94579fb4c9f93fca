//! Incremental Gaussian naive Bayes.

use ss_common::Label;

use super::observer::{naive_bayes_predict, GaussianObserver};
use super::OnlineClassifier;

#[derive(Debug, Clone, Default)]
pub struct GaussianNaiveBayes {
    class_weights: Vec<f64>,
    observers: Vec<GaussianObserver>,
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observed weight per class.
    pub fn class_weights(&self) -> &[f64] {
        &self.class_weights
    }
}

impl OnlineClassifier for GaussianNaiveBayes {
    fn predict_one(&self, x: &[f64]) -> Option<Label> {
        naive_bayes_predict(&self.class_weights, &self.observers, x)
    }

    fn learn_one(&mut self, x: &[f64], y: Label) {
        if self.class_weights.len() <= y {
            self.class_weights.resize(y + 1, 0.0);
        }
        self.class_weights[y] += 1.0;
        if self.observers.len() < x.len() {
            self.observers.resize_with(x.len(), GaussianObserver::default);
        }
        for (observer, &value) in self.observers.iter_mut().zip(x) {
            observer.update(value, y, 1.0);
        }
    }

    fn samples_seen(&self) -> f64 {
        self.class_weights.iter().sum()
    }

    fn name(&self) -> &'static str {
        "naive_bayes"
    }
}
