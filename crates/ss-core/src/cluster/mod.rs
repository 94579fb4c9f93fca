//! State discovery by clustering normalized sensor vectors.
//!
//! Two algorithms share the [`Clusterer`] interface:
//! - [`KMeans`]: fixed cluster count, k-means++ seeding, restarts
//! - [`DpMeans`]: cluster count grows with the distance penalty λ
//!
//! [`ClusterModel`] picks one of them from configuration.

pub mod dpmeans;
pub mod kmeans;

pub use dpmeans::DpMeans;
pub use kmeans::KMeans;

use serde::Serialize;
use ss_common::{Error, Label, Result};
use ss_config::ClusteringConfig;
use ss_math::nearest;

/// Outcome of a clustering fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub n_clusters: usize,
    pub iterations: usize,
    /// Sum of squared distances from each sample to its centroid.
    pub cost: f64,
}

/// Common interface of the clustering algorithms.
pub trait Clusterer {
    /// Fit centroids on `data`, replacing any previous fit.
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<FitSummary>;

    /// Nearest-centroid label for each row, lowest id on ties.
    fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<Label>>;

    /// Fitted centroids, `None` before fit.
    fn centroids(&self) -> Option<&[Vec<f64>]>;

    /// Number of clusters; 0 before fit.
    fn n_clusters(&self) -> usize {
        self.centroids().map_or(0, <[Vec<f64>]>::len)
    }
}

/// Clustering model selected by configuration.
#[derive(Debug, Clone)]
pub enum ClusterModel {
    FixedK(KMeans),
    Adaptive(DpMeans),
}

impl ClusterModel {
    pub fn from_config(config: &ClusteringConfig) -> Result<Self> {
        match config {
            ClusteringConfig::KMeans(km) => Ok(ClusterModel::FixedK(KMeans::new(km.clone())?)),
            ClusteringConfig::DpMeans(dp) => Ok(ClusterModel::Adaptive(DpMeans::new(dp.clone())?)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClusterModel::FixedK(_) => "kmeans",
            ClusterModel::Adaptive(_) => "dpmeans",
        }
    }
}

impl Clusterer for ClusterModel {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<FitSummary> {
        match self {
            ClusterModel::FixedK(m) => m.fit(data),
            ClusterModel::Adaptive(m) => m.fit(data),
        }
    }

    fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<Label>> {
        match self {
            ClusterModel::FixedK(m) => m.predict(data),
            ClusterModel::Adaptive(m) => m.predict(data),
        }
    }

    fn centroids(&self) -> Option<&[Vec<f64>]> {
        match self {
            ClusterModel::FixedK(m) => m.centroids(),
            ClusterModel::Adaptive(m) => m.centroids(),
        }
    }
}

/// Width shared by every row; errors on an empty batch or ragged rows.
pub(crate) fn checked_width(data: &[Vec<f64>], what: &str) -> Result<usize> {
    let first = data
        .first()
        .ok_or_else(|| Error::EmptyInput(format!("{} fit on zero rows", what)))?;
    let width = first.len();
    if let Some(row) = data.iter().find(|r| r.len() != width) {
        return Err(Error::DimensionMismatch {
            expected: width,
            actual: row.len(),
        });
    }
    Ok(width)
}

/// Label every row with its nearest centroid.
pub(crate) fn assign_nearest(
    data: &[Vec<f64>],
    centroids: Option<&[Vec<f64>]>,
    what: &'static str,
) -> Result<Vec<Label>> {
    let centroids = centroids.ok_or(Error::UnfittedModel(what))?;
    let width = centroids.first().map_or(0, Vec::len);
    data.iter()
        .map(|row| {
            if row.len() != width {
                return Err(Error::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            nearest(row, centroids)
                .map(|(idx, _)| idx)
                .ok_or(Error::UnfittedModel(what))
        })
        .collect()
}

/// Total squared distance of each row to its assigned centroid.
pub(crate) fn total_cost(data: &[Vec<f64>], centroids: &[Vec<f64>], labels: &[Label]) -> f64 {
    data.iter()
        .zip(labels)
        .map(|(row, &l)| ss_math::squared_euclidean(row, &centroids[l]))
        .sum()
}
