//! Stream Story core library.
//!
//! Discretizes multivariate sensor telemetry into recurring process states
//! and learns to forecast the next state online:
//! - Feature normalization ([`normalizer`])
//! - Fixed-K and adaptive clustering ([`cluster`])
//! - State labeling and the transition matrix ([`state_graph`], [`transition_matrix`])
//! - Rolling-window features and test-then-train learning ([`transition_model`])
//! - Incremental classifiers and prequential metrics ([`classifier`], [`metrics`])
//! - The wired-up pipeline ([`pipeline`])

pub mod classifier;
pub mod cluster;
pub mod logging;
pub mod metrics;
pub mod normalizer;
pub mod pipeline;
pub mod state_graph;
pub mod transition_matrix;
pub mod transition_model;

pub use classifier::OnlineClassifier;
pub use cluster::{ClusterModel, Clusterer, FitSummary};
pub use metrics::PrequentialMetrics;
pub use normalizer::{NormalizationParams, Normalizer};
pub use pipeline::{IngestOutcome, StreamStory};
pub use state_graph::{CentroidTable, StateGraph};
pub use transition_matrix::TransitionMatrix;
pub use transition_model::{FeatureFrame, FeatureRow, PartialFitReport, TransitionModel};
