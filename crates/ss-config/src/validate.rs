//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::settings::{
    ClassifierConfig, ClusteringConfig, Config, DpMeansConfig, HoeffdingTreeConfig, KMeansConfig,
    LoggingConfig,
};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("No iteration cap for {field}: adaptive clustering could run forever")]
    Uncapped { field: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 40,
            ValidationError::ParseError(_) => 31,
            ValidationError::InvalidValue { .. } => 30,
            ValidationError::VersionMismatch { .. } => 30,
            ValidationError::Uncapped { .. } => 22,
        }
    }
}

impl From<ValidationError> for ss_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) => ss_common::Error::Io(std::io::Error::other(msg)),
            ValidationError::ParseError(msg) => ss_common::Error::Parse(msg),
            ValidationError::Uncapped { .. } => ss_common::Error::NonTerminationRisk(err.to_string()),
            other => ss_common::Error::InvalidConfig(other.to_string()),
        }
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    }
}

/// Validate the whole configuration semantically.
pub fn validate_config(config: &Config) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    match &config.clustering {
        ClusteringConfig::KMeans(km) => validate_kmeans(km)?,
        ClusteringConfig::DpMeans(dp) => validate_dpmeans(dp)?,
    }

    validate_window_size(config.transition.window_size)?;
    if let ClassifierConfig::HoeffdingTree(ht) = &config.transition.classifier {
        validate_hoeffding(ht)?;
    }

    validate_logging(&config.logging)?;
    Ok(())
}

/// Validate fixed-K clustering parameters.
pub fn validate_kmeans(km: &KMeansConfig) -> ValidationResult<()> {
    if km.n_clusters == 0 {
        return Err(invalid(
            "clustering.n_clusters",
            "Must be at least 1".to_string(),
        ));
    }
    if km.n_init == 0 {
        return Err(invalid("clustering.n_init", "Must be at least 1".to_string()));
    }
    if km.max_iterations == 0 {
        return Err(invalid(
            "clustering.max_iterations",
            "Must be at least 1".to_string(),
        ));
    }
    if !(km.tolerance >= 0.0) || !km.tolerance.is_finite() {
        return Err(invalid(
            "clustering.tolerance",
            format!("Must be finite and >= 0, got {}", km.tolerance),
        ));
    }
    Ok(())
}

/// Validate adaptive clustering parameters, including the termination caps.
pub fn validate_dpmeans(dp: &DpMeansConfig) -> ValidationResult<()> {
    if !(dp.lambda > 0.0) || !dp.lambda.is_finite() {
        return Err(invalid(
            "clustering.lambda",
            format!("Must be finite and > 0, got {}", dp.lambda),
        ));
    }
    if !(dp.tolerance >= 0.0) || !dp.tolerance.is_finite() {
        return Err(invalid(
            "clustering.tolerance",
            format!("Must be finite and >= 0, got {}", dp.tolerance),
        ));
    }
    if dp.max_iterations == 0 {
        return Err(ValidationError::Uncapped {
            field: "clustering.max_iterations".to_string(),
        });
    }
    // Convergence compares the costs of two consecutive passes.
    if dp.max_iterations < 2 {
        return Err(invalid(
            "clustering.max_iterations",
            format!("Must be at least 2, got {}", dp.max_iterations),
        ));
    }
    if dp.max_clusters == 0 {
        return Err(ValidationError::Uncapped {
            field: "clustering.max_clusters".to_string(),
        });
    }
    Ok(())
}

/// A slope needs at least two points.
pub fn validate_window_size(window_size: usize) -> ValidationResult<()> {
    if window_size < 2 {
        return Err(invalid(
            "transition.window_size",
            format!("Must be at least 2, got {}", window_size),
        ));
    }
    Ok(())
}

/// Validate Hoeffding tree parameters.
pub fn validate_hoeffding(ht: &HoeffdingTreeConfig) -> ValidationResult<()> {
    if ht.grace_period == 0 {
        return Err(invalid(
            "transition.classifier.grace_period",
            "Must be at least 1".to_string(),
        ));
    }
    if !(ht.split_confidence > 0.0 && ht.split_confidence < 1.0) {
        return Err(invalid(
            "transition.classifier.split_confidence",
            format!("Must be in (0, 1), got {}", ht.split_confidence),
        ));
    }
    if !(ht.tie_threshold >= 0.0) || !ht.tie_threshold.is_finite() {
        return Err(invalid(
            "transition.classifier.tie_threshold",
            format!("Must be finite and >= 0, got {}", ht.tie_threshold),
        ));
    }
    Ok(())
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error", "off"];
const LOG_FORMATS: &[&str] = &["human", "console", "pretty", "jsonl", "json"];

fn validate_logging(logging: &LoggingConfig) -> ValidationResult<()> {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!("Unknown level '{}'", logging.level),
        ));
    }
    if !LOG_FORMATS.contains(&logging.format.to_lowercase().as_str()) {
        return Err(invalid(
            "logging.format",
            format!("Unknown format '{}'", logging.format),
        ));
    }
    Ok(())
}
