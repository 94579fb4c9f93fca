//! Per-feature scaling fitted once on a training batch.

use serde::Serialize;
use ss_common::{Error, Result};
use ss_config::ScalingKind;
use tracing::debug;

use crate::logging::{event_names, Stage};

/// Fitted offsets and scales, one per feature.
///
/// `transform(x) = (x - offset) / scale`. Scales are never zero: a constant
/// feature gets scale 1.0 and maps to 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationParams {
    pub kind: ScalingKind,
    pub offset: Vec<f64>,
    pub scale: Vec<f64>,
}

impl NormalizationParams {
    pub fn width(&self) -> usize {
        self.offset.len()
    }

    fn check_width(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.width() {
            return Err(Error::DimensionMismatch {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NormalizerState {
    Unfitted,
    Fitted(NormalizationParams),
}

/// Feature normalizer with an explicit fitted/unfitted lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    kind: ScalingKind,
    state: NormalizerState,
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(ScalingKind::default())
    }
}

impl Normalizer {
    pub fn new(kind: ScalingKind) -> Self {
        Normalizer {
            kind,
            state: NormalizerState::Unfitted,
        }
    }

    pub fn kind(&self) -> ScalingKind {
        self.kind
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, NormalizerState::Fitted(_))
    }

    pub fn params(&self) -> Option<&NormalizationParams> {
        match &self.state {
            NormalizerState::Fitted(params) => Some(params),
            NormalizerState::Unfitted => None,
        }
    }

    /// Compute offsets and scales from `rows`, replacing any previous fit.
    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        let first = rows
            .first()
            .ok_or_else(|| Error::EmptyInput("normalizer fit on zero rows".to_string()))?;
        let width = first.len();
        for row in rows {
            if row.len() != width {
                return Err(Error::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
        }

        let (offset, raw_scale) = match self.kind {
            ScalingKind::Standard => standard_params(rows, width),
            ScalingKind::MinMax => min_max_params(rows, width),
        };
        let constant = raw_scale.iter().filter(|&&s| s == 0.0).count();
        let scale = raw_scale
            .into_iter()
            .map(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s })
            .collect();

        debug!(
            event = event_names::NORMALIZER_FIT,
            stage = %Stage::Normalize,
            kind = %self.kind,
            rows = rows.len(),
            width,
            constant_features = constant,
            "normalizer fitted"
        );

        self.state = NormalizerState::Fitted(NormalizationParams {
            kind: self.kind,
            offset,
            scale,
        });
        Ok(())
    }

    /// Scale rows with the fitted parameters.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let params = self.params().ok_or(Error::UnfittedModel("normalizer"))?;
        rows.iter()
            .map(|row| {
                params.check_width(row)?;
                Ok(row
                    .iter()
                    .zip(params.offset.iter().zip(&params.scale))
                    .map(|(x, (o, s))| (x - o) / s)
                    .collect())
            })
            .collect()
    }

    /// Map normalized rows back to original units.
    pub fn inverse_transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let params = self.params().ok_or(Error::UnfittedModel("normalizer"))?;
        rows.iter()
            .map(|row| {
                params.check_width(row)?;
                Ok(row
                    .iter()
                    .zip(params.offset.iter().zip(&params.scale))
                    .map(|(z, (o, s))| z * s + o)
                    .collect())
            })
            .collect()
    }

    pub fn fit_transform(&mut self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.fit(rows)?;
        self.transform(rows)
    }
}

fn standard_params(rows: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let mut mean = vec![0.0; width];
    for row in rows {
        for (m, x) in mean.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    // Population variance, as in the usual standard scaler.
    let mut var = vec![0.0; width];
    for row in rows {
        for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
            let d = x - m;
            *v += d * d;
        }
    }
    let std = var.into_iter().map(|v| (v / n).sqrt()).collect();
    (mean, std)
}

fn min_max_params(rows: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let mut lo = vec![f64::INFINITY; width];
    let mut hi = vec![f64::NEG_INFINITY; width];
    for row in rows {
        for (j, &x) in row.iter().enumerate() {
            lo[j] = lo[j].min(x);
            hi[j] = hi[j].max(x);
        }
    }
    let range = lo.iter().zip(&hi).map(|(l, h)| h - l).collect();
    (lo, range)
}
