//! Error types for Stream Story.
//!
//! Every failure surfaces at a component call boundary as a typed error with:
//! - A stable error code for machine parsing
//! - A category for grouping
//! - A recoverability hint
//! - A remediation suggestion for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Model Not Fitted
//!   Reason: state graph used before fit
//!   Fix: Call fit() on a training batch before transform() or predict().
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 20,
//!   "category": "model",
//!   "message": "insufficient data: need at least 10 rows, got 4",
//!   "recoverable": true,
//!   "context": { "required": 10, "available": 4 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Stream Story operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input table contract violations (columns, shapes, time axis).
    Input,
    /// Model lifecycle and algorithmic failures.
    Model,
    /// Configuration errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Model => write!(f, "model"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Stream Story.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("missing required column: {column}")]
    MissingColumn { column: String },

    #[error("dimension mismatch: expected {expected} values per row, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("time column is not strictly ascending at row {index}")]
    NonMonotonicTime { index: usize },

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("state {state} out of range for {n_states} states")]
    InvalidState { state: usize, n_states: usize },

    // Model errors (20-29)
    #[error("insufficient data: need at least {required} rows, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("{0} used before fit")]
    UnfittedModel(&'static str),

    #[error("clustering may not terminate: {0}")]
    NonTerminationRisk(String),

    // Configuration errors (30-39)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    Parse(String),

    // I/O errors (40-49)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Model errors
    /// - 30-39: Configuration errors
    /// - 40-49: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::MissingColumn { .. } => 10,
            Error::DimensionMismatch { .. } => 11,
            Error::NonMonotonicTime { .. } => 12,
            Error::EmptyInput(_) => 13,
            Error::InvalidState { .. } => 14,
            Error::InsufficientData { .. } => 20,
            Error::UnfittedModel(_) => 21,
            Error::NonTerminationRisk(_) => 22,
            Error::InvalidConfig(_) => 30,
            Error::Parse(_) => 31,
            Error::Io(_) => 40,
            Error::Json(_) => 41,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingColumn { .. }
            | Error::DimensionMismatch { .. }
            | Error::NonMonotonicTime { .. }
            | Error::EmptyInput(_)
            | Error::InvalidState { .. } => ErrorCategory::Input,

            Error::InsufficientData { .. }
            | Error::UnfittedModel(_)
            | Error::NonTerminationRisk(_) => ErrorCategory::Model,

            Error::InvalidConfig(_) | Error::Parse(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether the caller can recover by changing its inputs.
    ///
    /// Input-contract and configuration errors are fixed by the caller;
    /// an unfitted model is fixed by calling `fit` first.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::MissingColumn { .. } => true,
            Error::DimensionMismatch { .. } => true,
            Error::NonMonotonicTime { .. } => true,
            Error::EmptyInput(_) => true,
            Error::InvalidState { .. } => false,

            // More rows arrive with the next batch
            Error::InsufficientData { .. } => true,
            Error::UnfittedModel(_) => true,
            // Needs a different lambda or cap, not a retry
            Error::NonTerminationRisk(_) => false,

            Error::InvalidConfig(_) => true,
            Error::Parse(_) => true,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::MissingColumn { .. } => {
                "Check that the frame carries the time column, the label column and every configured sensor."
            }
            Error::DimensionMismatch { .. } => {
                "Use the same sensor set for fit and transform/predict."
            }
            Error::NonMonotonicTime { .. } => {
                "Sort samples by time and remove duplicate timestamps before ingesting."
            }
            Error::EmptyInput(_) => "Provide at least one sample.",
            Error::InvalidState { .. } => {
                "Labels must come from the state graph that produced the transition matrix."
            }

            Error::InsufficientData { .. } => {
                "Supply at least one full window of rows, or enable history so earlier batches are carried over."
            }
            Error::UnfittedModel(_) => {
                "Call fit() on a training batch before transform() or predict()."
            }
            Error::NonTerminationRisk(_) => {
                "Increase lambda or raise max_iterations/max_clusters in the dpmeans configuration."
            }

            Error::InvalidConfig(_) => "Fix the reported configuration field and reload.",
            Error::Parse(_) => "Check the configuration file syntax (TOML or JSON).",

            Error::Io(_) => "Check that the configuration path exists and is readable.",
            Error::Json(_) => "Check the JSON payload for syntax errors.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::MissingColumn { .. } => "Missing Column",
            Error::DimensionMismatch { .. } => "Dimension Mismatch",
            Error::NonMonotonicTime { .. } => "Time Axis Not Ascending",
            Error::EmptyInput(_) => "Empty Input",
            Error::InvalidState { .. } => "Unknown State",
            Error::InsufficientData { .. } => "Insufficient Data",
            Error::UnfittedModel(_) => "Model Not Fitted",
            Error::NonTerminationRisk(_) => "Clustering Did Not Converge",
            Error::InvalidConfig(_) => "Configuration Error",
            Error::Parse(_) => "Configuration Parse Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., column name, row counts).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MissingColumn { column } => {
                context.insert("column".to_string(), serde_json::json!(column));
            }
            Error::DimensionMismatch { expected, actual } => {
                context.insert("expected".to_string(), serde_json::json!(expected));
                context.insert("actual".to_string(), serde_json::json!(actual));
            }
            Error::NonMonotonicTime { index } => {
                context.insert("row".to_string(), serde_json::json!(index));
            }
            Error::InvalidState { state, n_states } => {
                context.insert("state".to_string(), serde_json::json!(state));
                context.insert("n_states".to_string(), serde_json::json!(n_states));
            }
            Error::InsufficientData {
                required,
                available,
            } => {
                context.insert("required".to_string(), serde_json::json!(required));
                context.insert("available".to_string(), serde_json::json!(available));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            Error::MissingColumn {
                column: "timestamp".into()
            }
            .code(),
            10
        );
        assert_eq!(
            Error::InsufficientData {
                required: 5,
                available: 2
            }
            .code(),
            20
        );
        assert_eq!(Error::UnfittedModel("normalizer").code(), 21);
        assert_eq!(Error::NonTerminationRisk("cap".into()).code(), 22);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::NonMonotonicTime { index: 3 }.category(),
            ErrorCategory::Input
        );
        assert_eq!(
            Error::UnfittedModel("normalizer").category(),
            ErrorCategory::Model
        );
        assert_eq!(
            Error::InvalidConfig("window".into()).category(),
            ErrorCategory::Config
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::UnfittedModel("state graph").is_recoverable());
        assert!(!Error::NonTerminationRisk("cap".into()).is_recoverable());
        assert!(Error::InsufficientData {
            required: 5,
            available: 1
        }
        .is_recoverable());
    }

    #[test]
    fn test_unfitted_message_names_component() {
        let err = Error::UnfittedModel("transition model");
        assert_eq!(err.to_string(), "transition model used before fit");
    }

    #[test]
    fn test_structured_error_context() {
        let err = Error::InsufficientData {
            required: 10,
            available: 4,
        };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 20);
        assert_eq!(structured.category, ErrorCategory::Model);
        assert_eq!(structured.context["required"], serde_json::json!(10));
        assert_eq!(structured.context["available"], serde_json::json!(4));

        let json = structured.to_json();
        assert!(json.contains("\"category\":\"model\""));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::MissingColumn {
            column: "label".into(),
        };
        let output = format_error_human(&err, false);
        assert!(output.contains("Missing Column"));
        assert!(output.contains("missing required column: label"));
        assert!(output.contains("Fix:"));
    }
}
