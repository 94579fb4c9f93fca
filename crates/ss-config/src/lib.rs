//! Stream Story configuration loading and validation.
//!
//! This crate provides:
//! - Typed serde structs for the normalizer, clustering, transition model and logging sections
//! - TOML/JSON loading
//! - Config resolution (explicit path → env → defaults)
//! - Semantic validation

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{ConfigResolution, ConfigResolver, ENV_CONFIG_PATH};
pub use settings::{
    ClassifierConfig, ClusteringConfig, Config, DpMeansConfig, HoeffdingTreeConfig,
    KMeansConfig, LeafPrediction, LoggingConfig, NormalizerConfig, ScalingKind, TransitionConfig,
};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
