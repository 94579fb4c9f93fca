//! Incremental classifiers for next-state prediction.

pub mod hoeffding;
pub mod naive_bayes;
pub mod observer;

pub use hoeffding::HoeffdingTree;
pub use naive_bayes::GaussianNaiveBayes;

use ss_common::Label;
use ss_config::ClassifierConfig;

/// A classifier trained one sample at a time.
pub trait OnlineClassifier: Send + std::fmt::Debug {
    /// Predicted class, or `None` before anything has been learned.
    fn predict_one(&self, x: &[f64]) -> Option<Label>;

    fn learn_one(&mut self, x: &[f64], y: Label);

    /// Total weight of the samples learned so far.
    fn samples_seen(&self) -> f64;

    fn name(&self) -> &'static str;
}

/// Build the classifier named by configuration.
pub fn from_config(config: &ClassifierConfig) -> Box<dyn OnlineClassifier> {
    match config {
        ClassifierConfig::HoeffdingTree(ht) => Box::new(HoeffdingTree::new(ht.clone())),
        ClassifierConfig::NaiveBayes => Box::new(GaussianNaiveBayes::new()),
    }
}
