//! Prequential (test-then-train) classification metrics.

use serde::Serialize;
use ss_common::Label;
use std::collections::{BTreeMap, BTreeSet};

/// Confusion tally keyed by `(true, predicted)`; a missing prediction is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrequentialMetrics {
    #[serde(serialize_with = "serialize_confusion")]
    confusion: BTreeMap<(Label, Option<Label>), u64>,
    total: u64,
    correct: u64,
}

fn serialize_confusion<S: serde::Serializer>(
    confusion: &BTreeMap<(Label, Option<Label>), u64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(confusion.len()))?;
    for ((truth, predicted), count) in confusion {
        seq.serialize_element(&(truth, predicted, count))?;
    }
    seq.end()
}

impl PrequentialMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, truth: Label, predicted: Option<Label>) {
        *self.confusion.entry((truth, predicted)).or_insert(0) += 1;
        self.total += 1;
        if predicted == Some(truth) {
            self.correct += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn correct(&self) -> u64 {
        self.correct
    }

    pub fn count(&self, truth: Label, predicted: Option<Label>) -> u64 {
        self.confusion.get(&(truth, predicted)).copied().unwrap_or(0)
    }

    /// `None` before the first record.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }

    /// Classes that appeared as truth.
    pub fn classes(&self) -> Vec<Label> {
        self.confusion
            .keys()
            .map(|(truth, _)| *truth)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Of the rows predicted as `class`, the fraction that were `class`.
    pub fn precision(&self, class: Label) -> Option<f64> {
        let predicted: u64 = self
            .confusion
            .iter()
            .filter(|((_, p), _)| *p == Some(class))
            .map(|(_, c)| c)
            .sum();
        (predicted > 0).then(|| self.count(class, Some(class)) as f64 / predicted as f64)
    }

    /// Of the rows whose truth was `class`, the fraction predicted as `class`.
    pub fn recall(&self, class: Label) -> Option<f64> {
        let actual: u64 = self
            .confusion
            .iter()
            .filter(|((t, _), _)| *t == class)
            .map(|(_, c)| c)
            .sum();
        (actual > 0).then(|| self.count(class, Some(class)) as f64 / actual as f64)
    }

    pub fn f1(&self, class: Label) -> Option<f64> {
        let p = self.precision(class).unwrap_or(0.0);
        let r = self.recall(class)?;
        if p + r == 0.0 {
            Some(0.0)
        } else {
            Some(2.0 * p * r / (p + r))
        }
    }

    /// Unweighted mean over truth classes; undefined precision counts as 0.
    pub fn macro_precision(&self) -> Option<f64> {
        self.macro_average(|c| self.precision(c).unwrap_or(0.0))
    }

    pub fn macro_recall(&self) -> Option<f64> {
        self.macro_average(|c| self.recall(c).unwrap_or(0.0))
    }

    pub fn macro_f1(&self) -> Option<f64> {
        self.macro_average(|c| self.f1(c).unwrap_or(0.0))
    }

    fn macro_average(&self, f: impl Fn(Label) -> f64) -> Option<f64> {
        let classes = self.classes();
        if classes.is_empty() {
            return None;
        }
        Some(classes.iter().map(|&c| f(c)).sum::<f64>() / classes.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PrequentialMetrics {
        let mut m = PrequentialMetrics::new();
        m.record(0, Some(0));
        m.record(0, Some(0));
        m.record(0, Some(1));
        m.record(1, Some(1));
        m.record(1, None);
        m
    }

    #[test]
    fn test_empty_metrics() {
        let m = PrequentialMetrics::new();
        assert_eq!(m.accuracy(), None);
        assert_eq!(m.macro_f1(), None);
        assert_eq!(m.precision(0), None);
    }

    #[test]
    fn test_accuracy_counts_missing_prediction_as_wrong() {
        let m = sample();
        assert_eq!(m.total(), 5);
        assert_eq!(m.correct(), 3);
        assert!((m.accuracy().unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_precision_recall_f1() {
        let m = sample();
        assert!((m.precision(0).unwrap() - 1.0).abs() < 1e-12);
        assert!((m.recall(0).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.precision(1).unwrap() - 0.5).abs() < 1e-12);
        assert!((m.recall(1).unwrap() - 0.5).abs() < 1e-12);
        assert!((m.f1(0).unwrap() - 0.8).abs() < 1e-12);
        assert!((m.macro_recall().unwrap() - (2.0 / 3.0 + 0.5) / 2.0).abs() < 1e-12);
        assert_eq!(m.classes(), vec![0, 1]);
    }

    #[test]
    fn test_serializes_confusion_as_triples() {
        let mut m = PrequentialMetrics::new();
        m.record(2, None);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["confusion"], serde_json::json!([[2, null, 1]]));
        assert_eq!(json["total"], 1);
    }
}
