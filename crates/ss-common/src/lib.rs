//! Stream Story common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - The unified error taxonomy
//! - The time-ordered sensor [`Frame`]
//! - Feature descriptors for the transition model schema

pub mod error;
pub mod feature;
pub mod frame;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use feature::{FeatureDescriptor, FeatureKind, FeatureSchema};
pub use frame::{Frame, Label, Timestamp, LABEL_COLUMN, TIME_COLUMN};
