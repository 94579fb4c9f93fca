//! Hoeffding tree (VFDT) over numeric features.
//!
//! Leaves accumulate class weights and Gaussian attribute observers. Every
//! `grace_period` samples a leaf compares its best binary split against the
//! runner-up (the "no split" option competes with merit 0) and splits once
//! the gap exceeds the Hoeffding bound
//!
//! ```text
//! eps = sqrt(R^2 * ln(1/delta) / (2 n)),   R = log2(n_classes)
//! ```
//!
//! or the bound itself drops below the tie threshold.

use ss_common::Label;
use ss_config::{HoeffdingTreeConfig, LeafPrediction};
use tracing::debug;

use super::observer::{majority_class, naive_bayes_predict, GaussianObserver, SplitCandidate};
use super::OnlineClassifier;
use crate::logging::{event_names, Stage};

#[derive(Debug, Clone, Default)]
struct LeafStats {
    depth: usize,
    class_weights: Vec<f64>,
    observers: Vec<GaussianObserver>,
    weight_at_last_attempt: f64,
    majority_correct: f64,
    naive_bayes_correct: f64,
}

impl LeafStats {
    fn with_distribution(depth: usize, class_weights: Vec<f64>) -> Self {
        let weight: f64 = class_weights.iter().sum();
        LeafStats {
            depth,
            class_weights,
            weight_at_last_attempt: weight,
            ..Default::default()
        }
    }

    fn total_weight(&self) -> f64 {
        self.class_weights.iter().sum()
    }

    fn observed_classes(&self) -> usize {
        self.class_weights.iter().filter(|&&w| w > 0.0).count()
    }

    fn predict(&self, mode: LeafPrediction, x: &[f64]) -> Option<Label> {
        match mode {
            LeafPrediction::MajorityClass => majority_class(&self.class_weights),
            LeafPrediction::NaiveBayes => {
                naive_bayes_predict(&self.class_weights, &self.observers, x)
            }
            LeafPrediction::NaiveBayesAdaptive => {
                if self.naive_bayes_correct > self.majority_correct {
                    naive_bayes_predict(&self.class_weights, &self.observers, x)
                } else {
                    majority_class(&self.class_weights)
                }
            }
        }
    }

    fn learn(&mut self, x: &[f64], y: Label, mode: LeafPrediction) {
        if mode == LeafPrediction::NaiveBayesAdaptive {
            if majority_class(&self.class_weights) == Some(y) {
                self.majority_correct += 1.0;
            }
            if naive_bayes_predict(&self.class_weights, &self.observers, x) == Some(y) {
                self.naive_bayes_correct += 1.0;
            }
        }

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
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(LeafStats),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Incremental decision tree with Hoeffding-bound split decisions.
#[derive(Debug, Clone)]
pub struct HoeffdingTree {
    config: HoeffdingTreeConfig,
    nodes: Vec<Node>,
    /// Class weights over every learned sample, for leaves that saw nothing yet.
    class_totals: Vec<f64>,
    samples_seen: f64,
}

impl Default for HoeffdingTree {
    fn default() -> Self {
        HoeffdingTree::new(HoeffdingTreeConfig::default())
    }
}

impl HoeffdingTree {
    pub fn new(config: HoeffdingTreeConfig) -> Self {
        HoeffdingTree {
            config,
            nodes: vec![Node::Leaf(LeafStats::default())],
            class_totals: Vec::new(),
            samples_seen: 0.0,
        }
    }

    pub fn config(&self) -> &HoeffdingTreeConfig {
        &self.config
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf(_)))
            .count()
    }

    pub fn depth(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Leaf(stats) => Some(stats.depth),
                Node::Split { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Split decisions as `(feature, threshold)`, in creation order.
    pub fn splits(&self) -> Vec<(usize, f64)> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Split {
                    feature, threshold, ..
                } => Some((*feature, *threshold)),
                Node::Leaf(_) => None,
            })
            .collect()
    }

    fn leaf_index(&self, x: &[f64]) -> usize {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(_) => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // Missing features route left.
                    let value = x.get(*feature).copied().unwrap_or(f64::NEG_INFINITY);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn hoeffding_bound(&self, range: f64, n: f64) -> f64 {
        (range * range * (1.0 / self.config.split_confidence).ln() / (2.0 * n)).sqrt()
    }

    fn attempt_split(&mut self, idx: usize) {
        let Node::Leaf(leaf) = &self.nodes[idx] else {
            return;
        };
        if leaf.depth >= self.config.max_depth || leaf.observed_classes() < 2 {
            return;
        }

        let pre = &leaf.class_weights;
        let mut candidates: Vec<SplitCandidate> = leaf
            .observers
            .iter()
            .enumerate()
            .filter_map(|(f, obs)| obs.best_split(f, pre))
            .collect();
        candidates.sort_by(|a, b| b.merit.total_cmp(&a.merit));

        let Some(best) = candidates.first() else {
            return;
        };
        // The null split has merit 0 and always competes.
        let second_merit = candidates.get(1).map_or(0.0, |c| c.merit).max(0.0);

        let n = leaf.total_weight();
        let range = (leaf.class_weights.len().max(2) as f64).log2();
        let eps = self.hoeffding_bound(range, n);
        let depth = leaf.depth;

        if best.merit <= 0.0 {
            return;
        }
        if best.merit - second_merit <= eps && eps >= self.config.tie_threshold {
            return;
        }

        let best = best.clone();
        debug!(
            event = event_names::TREE_SPLIT,
            stage = %Stage::Learn,
            feature = best.feature,
            threshold = best.threshold,
            merit = best.merit,
            bound = eps,
            samples = n,
            depth,
            "hoeffding tree split"
        );

        let left = self.nodes.len();
        let right = left + 1;
        self.nodes
            .push(Node::Leaf(LeafStats::with_distribution(depth + 1, best.left)));
        self.nodes
            .push(Node::Leaf(LeafStats::with_distribution(depth + 1, best.right)));
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
    }
}

impl OnlineClassifier for HoeffdingTree {
    fn predict_one(&self, x: &[f64]) -> Option<Label> {
        let leaf = match &self.nodes[self.leaf_index(x)] {
            Node::Leaf(stats) => stats.predict(self.config.leaf_prediction, x),
            Node::Split { .. } => None,
        };
        leaf.or_else(|| majority_class(&self.class_totals))
    }

    fn learn_one(&mut self, x: &[f64], y: Label) {
        self.samples_seen += 1.0;
        if self.class_totals.len() <= y {
            self.class_totals.resize(y + 1, 0.0);
        }
        self.class_totals[y] += 1.0;
        let idx = self.leaf_index(x);
        let mode = self.config.leaf_prediction;
        let grace = f64::from(self.config.grace_period);

        let due = match &mut self.nodes[idx] {
            Node::Leaf(stats) => {
                stats.learn(x, y, mode);
                let weight = stats.total_weight();
                if weight - stats.weight_at_last_attempt >= grace {
                    stats.weight_at_last_attempt = weight;
                    true
                } else {
                    false
                }
            }
            Node::Split { .. } => false,
        };
        if due {
            self.attempt_split(idx);
        }
    }

    fn samples_seen(&self) -> f64 {
        self.samples_seen
    }

    fn name(&self) -> &'static str {
        "hoeffding_tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn small_grace() -> HoeffdingTreeConfig {
        HoeffdingTreeConfig {
            grace_period: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_untrained_tree_predicts_nothing() {
        let tree = HoeffdingTree::default();
        assert_eq!(tree.predict_one(&[0.0]), None);
        assert_eq!(tree.n_leaves(), 1);
    }

    #[test]
    fn test_learns_threshold_concept() {
        let mut tree = HoeffdingTree::new(HoeffdingTreeConfig {
            leaf_prediction: LeafPrediction::MajorityClass,
            ..small_grace()
        });
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2_000 {
            let x = rng.random_range(0.0..10.0);
            let noise = rng.random_range(0.0..1.0);
            tree.learn_one(&[x, noise], usize::from(x > 5.0));
        }

        let splits = tree.splits();
        assert!(!splits.is_empty());
        assert_eq!(splits[0].0, 0);

        let mut correct = 0;
        for i in 0..100 {
            let x = i as f64 * 0.1 + 0.05;
            if tree.predict_one(&[x, 0.5]) == Some(usize::from(x > 5.0)) {
                correct += 1;
            }
        }
        assert!(correct >= 85, "only {} of 100 correct", correct);
    }

    #[test]
    fn test_pure_stream_never_splits() {
        let mut tree = HoeffdingTree::new(small_grace());
        for i in 0..500 {
            tree.learn_one(&[i as f64], 2);
        }
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_one(&[3.0]), Some(2));
        assert_eq!(tree.samples_seen(), 500.0);
    }

    #[test]
    fn test_max_depth_caps_growth() {
        let mut tree = HoeffdingTree::new(HoeffdingTreeConfig {
            max_depth: 0,
            ..small_grace()
        });
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..1_000 {
            let x = rng.random_range(0.0..10.0);
            tree.learn_one(&[x], usize::from(x > 5.0));
        }
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_adaptive_leaf_uses_features_before_split() {
        let mut tree = HoeffdingTree::default();
        for i in 0..60 {
            let jitter = (i % 6) as f64 * 0.1;
            tree.learn_one(&[jitter], 0);
            tree.learn_one(&[9.0 + jitter], 1);
        }
        // No split yet (grace 200), but naive Bayes separates the classes.
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_one(&[0.2]), Some(0));
        assert_eq!(tree.predict_one(&[9.2]), Some(1));
    }
}
