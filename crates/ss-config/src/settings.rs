//! Typed configuration for the state-discovery pipeline.
//!
//! Every section defaults independently, so a file only needs to name the
//! values it changes:
//!
//! ```toml
//! [clustering]
//! method = "dpmeans"
//! lambda = 4.0
//!
//! [transition]
//! window_size = 20
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::validate::{validate_config, ValidationError, ValidationResult};
use crate::CONFIG_SCHEMA_VERSION;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Feature scaling applied before clustering
    pub normalizer: NormalizerConfig,

    /// State discovery algorithm
    pub clustering: ClusteringConfig,

    /// Online next-state model
    pub transition: TransitionConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            normalizer: NormalizerConfig::default(),
            clustering: ClusteringConfig::default(),
            transition: TransitionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(content: &str) -> ValidationResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a JSON document and validate it.
    pub fn from_json_str(content: &str) -> ValidationResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| ValidationError::ParseError(e.to_string()))?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> ValidationResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Semantic validation.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }
}

/// Per-feature scaling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingKind {
    /// Zero mean, unit (population) standard deviation.
    #[default]
    Standard,
    /// Map the observed [min, max] onto [0, 1].
    MinMax,
}

impl std::fmt::Display for ScalingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalingKind::Standard => write!(f, "standard"),
            ScalingKind::MinMax => write!(f, "min_max"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    pub scaling: ScalingKind,
}

/// Clustering algorithm and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ClusteringConfig {
    /// Fixed cluster count.
    #[serde(rename = "kmeans")]
    KMeans(KMeansConfig),
    /// Cluster count emerges from the distance penalty.
    #[serde(rename = "dpmeans")]
    DpMeans(DpMeansConfig),
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        ClusteringConfig::KMeans(KMeansConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KMeansConfig {
    /// Number of clusters K
    pub n_clusters: usize,
    /// Seed for k-means++ initialisation
    pub seed: u64,
    /// Independent restarts; the lowest-inertia run is kept
    pub n_init: usize,
    /// Lloyd iteration cap per restart
    pub max_iterations: usize,
    /// Convergence threshold on total squared centroid shift
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        KMeansConfig {
            n_clusters: 5,
            seed: 0,
            n_init: 10,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DpMeansConfig {
    /// Squared-distance penalty for opening a new cluster
    pub lambda: f64,
    /// Convergence threshold on the change in total cost
    pub tolerance: f64,
    /// Iteration cap; 0 means uncapped and is rejected
    pub max_iterations: usize,
    /// Upper bound on the emergent cluster count
    pub max_clusters: usize,
}

impl Default for DpMeansConfig {
    fn default() -> Self {
        DpMeansConfig {
            lambda: 1.0,
            tolerance: 1e-5,
            max_iterations: 100,
            max_clusters: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    /// Rolling window size W in samples
    pub window_size: usize,
    /// Incremental classifier
    pub classifier: ClassifierConfig,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        TransitionConfig {
            window_size: 5,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Incremental classifier used for next-state prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierConfig {
    HoeffdingTree(HoeffdingTreeConfig),
    NaiveBayes,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig::HoeffdingTree(HoeffdingTreeConfig::default())
    }
}

/// How a Hoeffding tree leaf turns its statistics into a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafPrediction {
    MajorityClass,
    NaiveBayes,
    /// Whichever of the two has been more accurate at this leaf.
    #[default]
    NaiveBayesAdaptive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoeffdingTreeConfig {
    /// Samples a leaf observes between split attempts
    pub grace_period: u32,
    /// Allowed probability of choosing the wrong split (delta)
    pub split_confidence: f64,
    /// Hoeffding bound below which near-tied splits are broken (tau)
    pub tie_threshold: f64,
    pub leaf_prediction: LeafPrediction,
    /// Maximum tree depth; leaves at this depth never split
    pub max_depth: usize,
}

impl Default for HoeffdingTreeConfig {
    fn default() -> Self {
        HoeffdingTreeConfig {
            grace_period: 200,
            split_confidence: 1e-7,
            tie_threshold: 0.05,
            leaf_prediction: LeafPrediction::default(),
            max_depth: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error, off
    pub level: String,
    /// human or jsonl
    pub format: String,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: "human".to_string(),
            timestamps: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transition.window_size, 5);
        assert!(matches!(config.clustering, ClusteringConfig::KMeans(_)));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
            [clustering]
            method = "dpmeans"
            lambda = 2.5

            [transition]
            window_size = 12
            "#,
        )
        .unwrap();
        match config.clustering {
            ClusteringConfig::DpMeans(dp) => {
                assert_eq!(dp.lambda, 2.5);
                assert_eq!(dp.max_iterations, 100);
                assert_eq!(dp.max_clusters, 256);
            }
            other => panic!("expected dpmeans, got {:?}", other),
        }
        assert_eq!(config.transition.window_size, 12);
        assert_eq!(config.normalizer.scaling, ScalingKind::Standard);
    }

    #[test]
    fn test_classifier_tagging() {
        let config = Config::from_json_str(
            r#"{"transition": {"window_size": 8, "classifier": {"type": "naive_bayes"}}}"#,
        )
        .unwrap();
        assert_eq!(config.transition.classifier, ClassifierConfig::NaiveBayes);

        let config = Config::from_toml_str(
            r#"
            [transition.classifier]
            type = "hoeffding_tree"
            grace_period = 50
            leaf_prediction = "majority_class"
            "#,
        )
        .unwrap();
        match config.transition.classifier {
            ClassifierConfig::HoeffdingTree(ht) => {
                assert_eq!(ht.grace_period, 50);
                assert_eq!(ht.leaf_prediction, LeafPrediction::MajorityClass);
                assert_eq!(ht.split_confidence, 1e-7);
            }
            other => panic!("expected hoeffding tree, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_toml_str("[transition]\nwindow = 3\n").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }
}
