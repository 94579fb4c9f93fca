//! Weighted Gaussian estimator and normal distribution helpers.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)

/// Complementary error function.
///
/// Chebyshev fit with fractional error below 1.2e-7 everywhere.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Running weighted mean/variance (Welford).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaussianEstimator {
    weight: f64,
    mean: f64,
    m2: f64,
}

impl GaussianEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observation with the given weight.
    pub fn update(&mut self, x: f64, weight: f64) {
        if weight <= 0.0 || !x.is_finite() {
            return;
        }
        self.weight += weight;
        let delta = x - self.mean;
        self.mean += weight * delta / self.weight;
        self.m2 += weight * delta * (x - self.mean);
    }

    /// Total weight observed.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance; 0.0 until more than one unit of weight is observed.
    pub fn variance(&self) -> f64 {
        if self.weight > 1.0 {
            (self.m2 / (self.weight - 1.0)).max(0.0)
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Log density at `x`.
    ///
    /// A zero-variance estimator is a point mass: 0.0 at the mean and
    /// `-inf` elsewhere.
    pub fn log_pdf(&self, x: f64) -> f64 {
        let sd = self.std_dev();
        if sd > 0.0 {
            let z = (x - self.mean) / sd;
            -0.5 * z * z - sd.ln() - LOG_SQRT_2PI
        } else if (x - self.mean).abs() <= f64::EPSILON * self.mean.abs().max(1.0) {
            0.0
        } else {
            f64::NEG_INFINITY
        }
    }

    pub fn pdf(&self, x: f64) -> f64 {
        self.log_pdf(x).exp()
    }

    /// Probability mass at or below `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        let sd = self.std_dev();
        if sd > 0.0 {
            normal_cdf((x - self.mean) / sd)
        } else if x < self.mean {
            0.0
        } else {
            1.0
        }
    }
}

/// Normal density with explicit parameters (used by tests and benches).
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * PI).sqrt())
}
