//! End-to-end pipeline: discover states, then learn to forecast them.

use serde::Serialize;
use ss_common::{Error, Frame, Label, Result};
use ss_config::Config;

use crate::cluster::FitSummary;
use crate::logging::{self, LogConfig};
use crate::state_graph::StateGraph;
use crate::transition_model::{PartialFitReport, TransitionModel};

/// Result of feeding one batch through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    /// Input batch with state labels attached.
    pub labeled: Frame,
    pub report: PartialFitReport,
}

/// State graph and transition model wired over a fixed sensor set.
#[derive(Debug)]
pub struct StreamStory {
    sensors: Vec<String>,
    graph: StateGraph,
    model: TransitionModel,
    log: LogConfig,
}

impl StreamStory {
    /// Build both stages from a validated configuration.
    pub fn from_config<S: Into<String>>(config: &Config, sensors: Vec<S>) -> Result<Self> {
        config.validate()?;
        let sensors: Vec<String> = sensors.into_iter().map(Into::into).collect();
        let graph = StateGraph::from_config(config)?;
        let model = TransitionModel::from_config(sensors.clone(), &config.transition)?;
        let log = LogConfig::from_settings(&config.logging)?;
        Ok(StreamStory {
            sensors,
            graph,
            model,
            log,
        })
    }

    /// Logging settings from the `[logging]` section, before env overrides.
    pub fn log_config(&self) -> &LogConfig {
        &self.log
    }

    /// Install a global `tracing` subscriber for the configured format and
    /// level, with `SS_LOG` / `SS_LOG_FORMAT` applied on top.
    ///
    /// Returns `false` when the process already has a subscriber; that one
    /// stays in place.
    pub fn install_logging(&self) -> bool {
        logging::try_init_logging(&self.log.with_env_overrides()).is_ok()
    }

    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    pub fn model(&self) -> &TransitionModel {
        &self.model
    }

    /// Discover states on a training batch.
    pub fn fit(&mut self, frame: &Frame) -> Result<FitSummary> {
        let selected = frame.select(&self.sensors)?;
        self.graph.fit(&selected)
    }

    /// Label a batch and train the transition model on it.
    pub fn ingest(&mut self, frame: &Frame) -> Result<IngestOutcome> {
        let labeled = self.label(frame)?;
        let report = self.model.partial_fit(&labeled)?;
        Ok(IngestOutcome { labeled, report })
    }

    /// Label a batch and predict the next state for each row, carrying history.
    ///
    /// The last element is the forecast for the sample after the batch.
    pub fn forecast(&mut self, frame: &Frame) -> Result<Vec<Label>> {
        let labeled = self.label(frame)?;
        self.model.predict(&labeled, true)
    }

    fn label(&mut self, frame: &Frame) -> Result<Frame> {
        if !self.graph.is_fitted() {
            return Err(Error::UnfittedModel("stream story"));
        }
        let selected = frame.select(&self.sensors)?;
        self.graph.transform(&selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogFormat, LogLevel};
    use ss_config::{ClusteringConfig, KMeansConfig};

    fn cyclic(n: usize, offset: usize) -> Frame {
        let rows = (offset..offset + n)
            .map(|i| {
                let phase = (i / 5) % 3;
                vec![phase as f64 * 10.0, 1.0 + phase as f64, 42.0]
            })
            .collect();
        Frame::new(vec!["temp", "pressure", "ignored"], rows)
            .unwrap()
            .with_timestamps((offset..offset + n).map(|i| i as i64 * 60).collect())
            .unwrap()
    }

    fn config() -> Config {
        Config {
            clustering: ClusteringConfig::KMeans(KMeansConfig {
                n_clusters: 3,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_before_fit() {
        let mut ss = StreamStory::from_config(&config(), vec!["temp", "pressure"]).unwrap();
        assert!(matches!(
            ss.ingest(&cyclic(10, 0)),
            Err(Error::UnfittedModel(_))
        ));
    }

    #[test]
    fn test_end_to_end() {
        let mut ss = StreamStory::from_config(&config(), vec!["temp", "pressure"]).unwrap();
        let summary = ss.fit(&cyclic(60, 0)).unwrap();
        assert_eq!(summary.n_clusters, 3);

        let outcome = ss.ingest(&cyclic(60, 0)).unwrap();
        assert_eq!(outcome.labeled.sensors(), &["temp", "pressure"]);
        assert_eq!(outcome.report.rows, 60 - 5);
        assert_eq!(ss.graph().transitions().unwrap().total_transitions(), 11);

        ss.ingest(&cyclic(60, 60)).unwrap();
        let forecast = ss.forecast(&cyclic(5, 120)).unwrap();
        assert_eq!(forecast.len(), 5 + 1);
        assert!(forecast.iter().all(|&l| l < 3));
    }

    #[test]
    fn test_logging_section_is_carried() {
        let mut cfg = config();
        cfg.logging.level = "debug".to_string();
        cfg.logging.format = "jsonl".to_string();
        let ss = StreamStory::from_config(&cfg, vec!["temp"]).unwrap();
        assert_eq!(ss.log_config().level, LogLevel::Debug);
        assert_eq!(ss.log_config().format, LogFormat::Jsonl);
    }

    #[test]
    fn test_install_logging_once() {
        let mut cfg = config();
        cfg.logging.level = "off".to_string();
        let ss = StreamStory::from_config(&cfg, vec!["temp"]).unwrap();
        // Another test may have installed first; a repeat never succeeds.
        let _ = ss.install_logging();
        assert!(!ss.install_logging());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config();
        bad.transition.window_size = 1;
        assert!(matches!(
            StreamStory::from_config(&bad, vec!["temp"]),
            Err(Error::InvalidConfig(_))
        ));
    }
}
