//! Feature descriptors for the transition model input schema.

use serde::{Deserialize, Serialize};

/// Derived feature kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Trailing rolling mean of a sensor.
    Mean,
    /// Trailing least-squares slope of a sensor against sample index.
    Slope,
    /// State label of the row itself.
    CurrentState,
}

impl FeatureKind {
    fn suffix(&self) -> &'static str {
        match self {
            FeatureKind::Mean => "mean",
            FeatureKind::Slope => "delta",
            FeatureKind::CurrentState => "state",
        }
    }
}

/// One column of the feature schema: where it comes from and how it is derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub source: String,
    pub kind: FeatureKind,
}

impl FeatureDescriptor {
    pub fn new(source: impl Into<String>, kind: FeatureKind) -> Self {
        FeatureDescriptor {
            source: source.into(),
            kind,
        }
    }

    /// Column name, e.g. `pressure_mean`, `pressure_delta`, `current_state`.
    pub fn name(&self) -> String {
        match self.kind {
            FeatureKind::CurrentState => "current_state".to_string(),
            _ => format!("{}_{}", self.source, self.kind.suffix()),
        }
    }
}

/// Ordered, immutable feature schema.
///
/// For each sensor (in the given order) a `Mean` then a `Slope` column,
/// followed by a single `CurrentState` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    descriptors: Vec<FeatureDescriptor>,
}

impl FeatureSchema {
    pub fn for_sensors<S: AsRef<str>>(sensors: &[S]) -> Self {
        let mut descriptors = Vec::with_capacity(sensors.len() * 2 + 1);
        for sensor in sensors {
            descriptors.push(FeatureDescriptor::new(sensor.as_ref(), FeatureKind::Mean));
            descriptors.push(FeatureDescriptor::new(sensor.as_ref(), FeatureKind::Slope));
        }
        descriptors.push(FeatureDescriptor::new(
            crate::frame::LABEL_COLUMN,
            FeatureKind::CurrentState,
        ));
        FeatureSchema { descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    pub fn names(&self) -> Vec<String> {
        self.descriptors.iter().map(FeatureDescriptor::name).collect()
    }

    /// Sensors feeding the schema, in schema order.
    pub fn sensors(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .filter(|d| d.kind == FeatureKind::Mean)
            .map(|d| d.source.as_str())
            .collect()
    }
}
