//! Adaptive clustering (DP-means).
//!
//! Starts from a single cluster at the global mean and opens a new cluster
//! whenever a sample's squared distance to every centroid exceeds λ. Each
//! iteration reassigns all samples in order, recomputes centroids, drops
//! clusters that lost every member and stops once the total cost changes by
//! at most the tolerance.
//!
//! Termination is bounded by `max_iterations` and `max_clusters`; reaching
//! either bound without convergence is an error rather than a partial fit.

use ss_common::{Error, Label, Result};
use ss_config::validate::validate_dpmeans;
use ss_config::DpMeansConfig;
use ss_math::{mean_of_members, mean_vector, nearest};
use tracing::{debug, trace, warn};

use super::{assign_nearest, checked_width, total_cost, Clusterer, FitSummary};
use crate::logging::{event_names, Stage};

#[derive(Debug, Clone)]
pub struct DpMeans {
    config: DpMeansConfig,
    centroids: Option<Vec<Vec<f64>>>,
}

impl DpMeans {
    /// Build from validated parameters. A zero iteration or cluster cap is
    /// rejected as `NonTerminationRisk`; an iteration cap of 1 is
    /// `InvalidConfig` since convergence needs two passes to compare.
    pub fn new(config: DpMeansConfig) -> Result<Self> {
        validate_dpmeans(&config)?;
        Ok(DpMeans {
            config,
            centroids: None,
        })
    }

    /// Default caps and tolerance with the given penalty.
    pub fn with_lambda(lambda: f64) -> Result<Self> {
        DpMeans::new(DpMeansConfig {
            lambda,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &DpMeansConfig {
        &self.config
    }

    fn cap_hit(&self, what: &str, limit: usize) -> Error {
        warn!(
            event = event_names::CLUSTER_CAP_HIT,
            stage = %Stage::Cluster,
            cap = what,
            limit,
            lambda = self.config.lambda,
            "dpmeans stopped at a safety cap"
        );
        Error::NonTerminationRisk(format!(
            "dpmeans exceeded {} = {} (lambda = {}); raise lambda or the cap",
            what, limit, self.config.lambda
        ))
    }
}

/// Drop clusters with no members and renumber the rest in order.
fn compact(centroids: Vec<Option<Vec<f64>>>, labels: &mut [Label]) -> Vec<Vec<f64>> {
    let mut remap = vec![usize::MAX; centroids.len()];
    let mut kept = Vec::with_capacity(centroids.len());
    for (old, c) in centroids.into_iter().enumerate() {
        if let Some(c) = c {
            remap[old] = kept.len();
            kept.push(c);
        }
    }
    for l in labels.iter_mut() {
        *l = remap[*l];
    }
    kept
}

impl Clusterer for DpMeans {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<FitSummary> {
        checked_width(data, "dpmeans")?;
        let lambda = self.config.lambda;

        let start = mean_vector(data)
            .ok_or_else(|| Error::EmptyInput("dpmeans fit on zero rows".to_string()))?;
        let mut centroids = vec![start];
        let mut labels: Vec<Label> = vec![0; data.len()];
        let mut prev_cost = f64::INFINITY;
        let mut iterations = 0;

        let cost = loop {
            if iterations >= self.config.max_iterations {
                return Err(self.cap_hit("max_iterations", self.config.max_iterations));
            }
            iterations += 1;

            for (label, x) in labels.iter_mut().zip(data) {
                let (idx, d) = nearest(x, &centroids).unwrap_or((0, f64::INFINITY));
                if d > lambda {
                    if centroids.len() >= self.config.max_clusters {
                        return Err(self.cap_hit("max_clusters", self.config.max_clusters));
                    }
                    centroids.push(x.clone());
                    *label = centroids.len() - 1;
                } else {
                    *label = idx;
                }
            }

            let mut members: Vec<Vec<usize>> = vec![Vec::new(); centroids.len()];
            for (i, &l) in labels.iter().enumerate() {
                members[l].push(i);
            }
            let updated: Vec<Option<Vec<f64>>> = members
                .iter()
                .map(|idx| mean_of_members(data, idx))
                .collect();
            let empty = updated.iter().filter(|c| c.is_none()).count();
            if empty > 0 {
                debug!(
                    event = event_names::CLUSTER_EMPTY,
                    iteration = iterations,
                    removed = empty,
                    "dropping empty clusters"
                );
            }
            centroids = compact(updated, &mut labels);

            let cost = total_cost(data, &centroids, &labels);
            trace!(
                event = event_names::CLUSTER_ITERATION,
                iteration = iterations,
                clusters = centroids.len(),
                cost,
                "dpmeans iteration"
            );
            if (prev_cost - cost).abs() <= self.config.tolerance {
                break cost;
            }
            prev_cost = cost;
        };

        let summary = FitSummary {
            n_clusters: centroids.len(),
            iterations,
            cost,
        };
        debug!(
            event = event_names::CLUSTER_FIT,
            stage = %Stage::Cluster,
            method = "dpmeans",
            n_clusters = summary.n_clusters,
            iterations = summary.iterations,
            cost = summary.cost,
            lambda,
            "clustering fitted"
        );
        self.centroids = Some(centroids);
        Ok(summary)
    }

    /// Nearest existing centroid; never opens a cluster.
    fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<Label>> {
        assign_nearest(data, self.centroids(), "dpmeans")
    }

    fn centroids(&self) -> Option<&[Vec<f64>]> {
        self.centroids.as_deref()
    }
}
