//! Fixed-K clustering: k-means++ seeding followed by Lloyd iterations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ss_common::{Error, Label, Result};
use ss_config::validate::validate_kmeans;
use ss_config::KMeansConfig;
use ss_math::{mean_of_members, nearest, squared_euclidean};
use tracing::{debug, trace};

use super::{assign_nearest, checked_width, total_cost, Clusterer, FitSummary};
use crate::logging::{event_names, Stage};

/// K-means with `n_init` seeded restarts; the lowest-inertia run wins.
#[derive(Debug, Clone)]
pub struct KMeans {
    config: KMeansConfig,
    centroids: Option<Vec<Vec<f64>>>,
}

struct Run {
    centroids: Vec<Vec<f64>>,
    inertia: f64,
    iterations: usize,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Result<Self> {
        validate_kmeans(&config)?;
        Ok(KMeans {
            config,
            centroids: None,
        })
    }

    /// K clusters with default restarts and tolerance.
    pub fn with_clusters(n_clusters: usize, seed: u64) -> Result<Self> {
        KMeans::new(KMeansConfig {
            n_clusters,
            seed,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    fn seed_plus_plus(&self, data: &[Vec<f64>], rng: &mut StdRng) -> Vec<Vec<f64>> {
        let k = self.config.n_clusters;
        let mut centroids = Vec::with_capacity(k);
        centroids.push(data[rng.random_range(0..data.len())].clone());

        let mut d2: Vec<f64> = data
            .iter()
            .map(|x| squared_euclidean(x, &centroids[0]))
            .collect();

        while centroids.len() < k {
            let total: f64 = d2.iter().sum();
            let pick = if total > 0.0 {
                let target = rng.random::<f64>() * total;
                let mut acc = 0.0;
                let mut chosen = None;
                for (i, &d) in d2.iter().enumerate() {
                    acc += d;
                    if d > 0.0 && acc >= target {
                        chosen = Some(i);
                        break;
                    }
                }
                // Rounding can leave the target just past the last bucket.
                chosen.or_else(|| d2.iter().rposition(|&d| d > 0.0)).unwrap_or(0)
            } else {
                rng.random_range(0..data.len())
            };

            let next = data[pick].clone();
            for (d, x) in d2.iter_mut().zip(data) {
                *d = d.min(squared_euclidean(x, &next));
            }
            centroids.push(next);
        }
        centroids
    }

    fn run_once(&self, data: &[Vec<f64>], rng: &mut StdRng) -> Run {
        let k = self.config.n_clusters;
        let mut centroids = self.seed_plus_plus(data, rng);
        let mut labels: Vec<Label> = vec![usize::MAX; data.len()];
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let mut changed = false;
            let mut dists = Vec::with_capacity(data.len());
            for (label, x) in labels.iter_mut().zip(data) {
                let (idx, d) = nearest(x, &centroids).unwrap_or((0, 0.0));
                if *label != idx {
                    *label = idx;
                    changed = true;
                }
                dists.push(d);
            }

            let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
            for (i, &l) in labels.iter().enumerate() {
                members[l].push(i);
            }

            let mut taken = vec![false; data.len()];
            let mut shift = 0.0;
            for (c, idx) in members.iter().enumerate() {
                let updated = match mean_of_members(data, idx) {
                    Some(mean) => mean,
                    None => {
                        // Empty cluster: move it onto the worst-fit sample.
                        let far = farthest_untaken(&dists, &taken);
                        taken[far] = true;
                        dists[far] = 0.0;
                        changed = true;
                        data[far].clone()
                    }
                };
                shift += squared_euclidean(&centroids[c], &updated);
                centroids[c] = updated;
            }

            trace!(
                event = event_names::CLUSTER_ITERATION,
                iteration = iterations,
                shift,
                "kmeans iteration"
            );

            if !changed || shift <= self.config.tolerance {
                break;
            }
        }

        let labels: Vec<Label> = data
            .iter()
            .map(|x| nearest(x, &centroids).map_or(0, |(i, _)| i))
            .collect();
        let inertia = total_cost(data, &centroids, &labels);
        Run {
            centroids,
            inertia,
            iterations,
        }
    }
}

fn farthest_untaken(dists: &[f64], taken: &[bool]) -> usize {
    let mut best = 0;
    let mut best_d = f64::NEG_INFINITY;
    for (i, (&d, &t)) in dists.iter().zip(taken).enumerate() {
        if !t && d > best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

impl Clusterer for KMeans {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<FitSummary> {
        checked_width(data, "kmeans")?;
        let k = self.config.n_clusters;
        if data.len() < k {
            return Err(Error::InsufficientData {
                required: k,
                available: data.len(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut best: Option<Run> = None;
        for _ in 0..self.config.n_init {
            let run = self.run_once(data, &mut rng);
            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }
        let best = best.ok_or_else(|| Error::InvalidConfig("n_init must be at least 1".into()))?;

        let summary = FitSummary {
            n_clusters: k,
            iterations: best.iterations,
            cost: best.inertia,
        };
        debug!(
            event = event_names::CLUSTER_FIT,
            stage = %Stage::Cluster,
            method = "kmeans",
            n_clusters = summary.n_clusters,
            iterations = summary.iterations,
            cost = summary.cost,
            restarts = self.config.n_init,
            "clustering fitted"
        );
        self.centroids = Some(best.centroids);
        Ok(summary)
    }

    fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<Label>> {
        assign_nearest(data, self.centroids(), "kmeans")
    }

    fn centroids(&self) -> Option<&[Vec<f64>]> {
        self.centroids.as_deref()
    }
}
