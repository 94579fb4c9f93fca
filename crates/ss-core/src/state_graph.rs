//! Process states and the transitions between them.
//!
//! A [`StateGraph`] normalizes sensor readings, clusters them into states and,
//! on every [`transform`](StateGraph::transform), labels a batch and rebuilds
//! the transition matrix from the label sequence.

use rand::Rng;
use serde::Serialize;
use ss_common::{Error, Frame, Label, Result};
use ss_config::{Config, ScalingKind};
use tracing::debug;

use crate::cluster::{ClusterModel, Clusterer, FitSummary};
use crate::logging::{event_names, Stage};
use crate::normalizer::Normalizer;
use crate::transition_matrix::TransitionMatrix;

/// Centroids in original sensor units, one row per state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentroidTable {
    pub sensors: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl CentroidTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone)]
enum GraphState {
    Unfitted,
    Fitted { centroids: CentroidTable },
}

#[derive(Debug, Clone)]
pub struct StateGraph {
    normalizer: Normalizer,
    model: ClusterModel,
    state: GraphState,
    transitions: Option<TransitionMatrix>,
    occupancy: Vec<usize>,
}

impl StateGraph {
    pub fn new(model: ClusterModel, scaling: ScalingKind) -> Self {
        StateGraph {
            normalizer: Normalizer::new(scaling),
            model,
            state: GraphState::Unfitted,
            transitions: None,
            occupancy: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let model = ClusterModel::from_config(&config.clustering)?;
        Ok(StateGraph::new(model, config.normalizer.scaling))
    }

    /// Fit the normalizer and the clustering on every sensor column of `frame`.
    ///
    /// Any previous fit and transition matrix are discarded.
    pub fn fit(&mut self, frame: &Frame) -> Result<FitSummary> {
        frame.require_timestamps()?;
        if frame.is_empty() {
            return Err(Error::EmptyInput("state graph fit on zero rows".to_string()));
        }

        self.normalizer.fit(frame.rows())?;
        let normalized = self.normalizer.transform(frame.rows())?;
        let summary = self.model.fit(&normalized)?;

        let centroids = self
            .model
            .centroids()
            .ok_or(Error::UnfittedModel("cluster model"))?;
        let rows = self.normalizer.inverse_transform(centroids)?;

        self.state = GraphState::Fitted {
            centroids: CentroidTable {
                sensors: frame.sensors().to_vec(),
                rows,
            },
        };
        self.transitions = None;
        self.occupancy.clear();
        Ok(summary)
    }

    /// Label each row with its state and rebuild the transition matrix.
    ///
    /// Returns a copy of `frame` with the label column attached. The frame
    /// may carry extra sensor columns; only the fitted ones are used.
    pub fn transform(&mut self, frame: &Frame) -> Result<Frame> {
        frame.require_timestamps()?;
        let sensors = match &self.state {
            GraphState::Fitted { centroids } => &centroids.sensors,
            GraphState::Unfitted => return Err(Error::UnfittedModel("state graph")),
        };

        let selected = frame.select(sensors)?;
        let normalized = self.normalizer.transform(selected.rows())?;
        let labels = self.model.predict(&normalized)?;

        let n_states = self.n_states();
        let matrix = TransitionMatrix::from_labels(&labels, n_states)?;
        let mut occupancy = vec![0; n_states];
        for &l in &labels {
            occupancy[l] += 1;
        }

        debug!(
            event = event_names::GRAPH_TRANSFORM,
            stage = %Stage::Transitions,
            rows = labels.len(),
            states = n_states,
            transitions = matrix.total_transitions(),
            "batch labeled"
        );

        self.transitions = Some(matrix);
        self.occupancy = occupancy;
        frame.clone().with_labels(labels)
    }

    pub fn fit_transform(&mut self, frame: &Frame) -> Result<Frame> {
        self.fit(frame)?;
        self.transform(frame)
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, GraphState::Fitted { .. })
    }

    pub fn centroids(&self) -> Option<&CentroidTable> {
        match &self.state {
            GraphState::Fitted { centroids } => Some(centroids),
            GraphState::Unfitted => None,
        }
    }

    /// Matrix from the most recent transform.
    pub fn transitions(&self) -> Option<&TransitionMatrix> {
        self.transitions.as_ref()
    }

    /// Samples per state in the most recent transform.
    pub fn occupancy(&self) -> &[usize] {
        &self.occupancy
    }

    pub fn n_states(&self) -> usize {
        self.centroids().map_or(0, CentroidTable::len)
    }

    pub fn sensors(&self) -> Option<&[String]> {
        self.centroids().map(|c| c.sensors.as_slice())
    }

    pub fn model(&self) -> &ClusterModel {
        &self.model
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Random walk of at most `steps` transitions starting at `start`.
    ///
    /// The walk ends early in a state that was never left. The returned path
    /// includes `start`.
    pub fn simulate<R: Rng>(&self, start: Label, steps: usize, rng: &mut R) -> Result<Vec<Label>> {
        let matrix = self
            .transitions
            .as_ref()
            .ok_or(Error::UnfittedModel("state graph transitions"))?;
        if start >= matrix.n_states() {
            return Err(Error::InvalidState {
                state: start,
                n_states: matrix.n_states(),
            });
        }

        let mut path = Vec::with_capacity(steps + 1);
        path.push(start);
        let mut current = start;
        for _ in 0..steps {
            match matrix.sample_next(current, rng)? {
                Some(next) => {
                    path.push(next);
                    current = next;
                }
                None => break,
            }
        }
        Ok(path)
    }
}
