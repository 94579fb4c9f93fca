//! Online next-state model.
//!
//! Turns a labeled sensor stream into rolling-window feature rows and trains
//! an incremental classifier on them, test-then-train. The last W labeled
//! rows of every history-enabled call are retained so that windows spanning
//! a batch boundary see the same samples as an unsplit stream would.

pub mod features;

pub use features::{window_features, FeatureFrame, FeatureRow};

use serde::Serialize;
use ss_common::{Error, FeatureSchema, Frame, Label, Result};
use ss_config::validate::{validate_hoeffding, validate_window_size};
use ss_config::{ClassifierConfig, TransitionConfig};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::classifier::{self, OnlineClassifier};
use crate::logging::{event_names, Stage};
use crate::metrics::PrequentialMetrics;

/// Outcome of one `partial_fit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartialFitReport {
    /// Feature rows evaluated and learned.
    pub rows: usize,
    /// Rows whose next state was predicted correctly before learning.
    pub correct: usize,
}

#[derive(Debug)]
pub struct TransitionModel {
    window_size: usize,
    sensors: Vec<String>,
    schema: FeatureSchema,
    history: Option<Frame>,
    classifier: Box<dyn OnlineClassifier>,
    metrics: PrequentialMetrics,
}

impl TransitionModel {
    /// Model over `sensors` (feature order follows this list) with window W.
    ///
    /// W must be at least 2 and the sensor list non-empty and duplicate-free.
    pub fn new<S: Into<String>>(
        sensors: Vec<S>,
        window_size: usize,
        classifier: Box<dyn OnlineClassifier>,
    ) -> Result<Self> {
        validate_window_size(window_size)?;
        let sensors: Vec<String> = sensors.into_iter().map(Into::into).collect();
        if sensors.is_empty() {
            return Err(Error::InvalidConfig(
                "transition model needs at least one sensor".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = sensors.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(Error::InvalidConfig(format!("duplicate sensor '{}'", dup)));
        }

        let schema = FeatureSchema::for_sensors(&sensors);
        Ok(TransitionModel {
            window_size,
            sensors,
            schema,
            history: None,
            classifier,
            metrics: PrequentialMetrics::new(),
        })
    }

    pub fn from_config<S: Into<String>>(sensors: Vec<S>, config: &TransitionConfig) -> Result<Self> {
        if let ClassifierConfig::HoeffdingTree(ht) = &config.classifier {
            validate_hoeffding(ht)?;
        }
        TransitionModel::new(
            sensors,
            config.window_size,
            classifier::from_config(&config.classifier),
        )
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    /// Rows currently buffered (at most W).
    pub fn history_len(&self) -> usize {
        self.history.as_ref().map_or(0, Frame::len)
    }

    pub fn classifier(&self) -> &dyn OnlineClassifier {
        self.classifier.as_ref()
    }

    /// Total test-then-train predictions.
    pub fn predictions(&self) -> u64 {
        self.metrics.total()
    }

    pub fn correct_predictions(&self) -> u64 {
        self.metrics.correct()
    }

    /// Running accuracy; `None` before the first prediction.
    pub fn accuracy(&self) -> Option<f64> {
        self.metrics.accuracy()
    }

    pub fn metrics(&self) -> &PrequentialMetrics {
        &self.metrics
    }

    /// Rolling-window feature rows for `frame`.
    ///
    /// With `use_history` the buffered rows are prepended and the buffer is
    /// refreshed to the trailing W rows of the combined sequence. An empty
    /// frame with history yields the rows still computable from the buffer.
    pub fn prepare_features(
        &mut self,
        frame: &Frame,
        use_history: bool,
        drop_last: bool,
    ) -> Result<FeatureFrame> {
        let combined = match (&self.history, use_history && frame.is_empty()) {
            (Some(history), true) => history.clone(),
            _ => {
                frame.require_labels()?;
                let selected = frame.select(&self.sensors)?;
                match (&self.history, use_history) {
                    (Some(history), true) => history.concat(&selected)?,
                    _ => selected,
                }
            }
        };

        if use_history {
            self.history = Some(combined.tail(self.window_size));
        }

        let rows = window_features(&combined, self.window_size, drop_last)?;
        debug!(
            event = event_names::FEATURES_PREPARED,
            stage = %Stage::Features,
            input_rows = frame.len(),
            combined_rows = combined.len(),
            feature_rows = rows.len(),
            use_history,
            drop_last,
            "features prepared"
        );
        Ok(FeatureFrame {
            schema: self.schema.clone(),
            rows,
        })
    }

    /// Test-then-train on a labeled batch.
    ///
    /// Each feature row is first predicted and scored against its true next
    /// state, then learned. A missing prediction counts as wrong.
    pub fn partial_fit(&mut self, frame: &Frame) -> Result<PartialFitReport> {
        let prepared = self.prepare_features(frame, true, true)?;

        let mut report = PartialFitReport {
            rows: 0,
            correct: 0,
        };
        for row in &prepared.rows {
            let Some(truth) = row.next_state else {
                continue;
            };
            let predicted = self.classifier.predict_one(&row.features);
            self.metrics.record(truth, predicted);
            if predicted == Some(truth) {
                report.correct += 1;
            }
            self.classifier.learn_one(&row.features, truth);
            report.rows += 1;
        }

        info!(
            event = event_names::MODEL_BATCH,
            stage = %Stage::Learn,
            classifier = self.classifier.name(),
            rows = report.rows,
            correct = report.correct,
            total_predictions = self.metrics.total(),
            accuracy = self.metrics.accuracy().unwrap_or(0.0),
            "transition model updated"
        );
        Ok(report)
    }

    /// Predicted next state for every feature row of `frame`.
    ///
    /// Without history the frame must hold at least W rows. With history the
    /// buffer is prepended and refreshed, and the final row is kept, so the
    /// last prediction is the forecast for the sample after the batch.
    pub fn predict(&mut self, frame: &Frame, use_history: bool) -> Result<Vec<Label>> {
        if !use_history && frame.len() < self.window_size {
            return Err(Error::InsufficientData {
                required: self.window_size,
                available: frame.len(),
            });
        }
        if self.classifier.samples_seen() <= 0.0 {
            return Err(Error::UnfittedModel("transition model"));
        }

        let prepared = self.prepare_features(frame, use_history, false)?;
        let labels = prepared
            .rows
            .iter()
            .map(|row| self.classifier.predict_one(&row.features))
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::UnfittedModel("transition model"))?;

        debug!(
            event = event_names::MODEL_BATCH,
            stage = %Stage::Predict,
            rows = labels.len(),
            "next states predicted"
        );
        Ok(labels)
    }
}
