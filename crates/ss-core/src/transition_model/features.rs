//! Rolling-window feature rows for the transition model.

use serde::Serialize;
use ss_common::{Error, FeatureSchema, Frame, Label, Result, Timestamp};
use ss_math::{rolling_stats, WindowStats};

/// One classifier input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub timestamp: Option<Timestamp>,
    /// Values in schema order: mean and slope per sensor, then the current state.
    pub features: Vec<f64>,
    pub current_state: Label,
    /// Label of the following sample; unknown for the last row of a batch.
    pub next_state: Option<Label>,
}

/// Feature rows with the schema that names their columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFrame {
    pub schema: FeatureSchema,
    pub rows: Vec<FeatureRow>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature vectors only.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.features.clone()).collect()
    }
}

/// Feature rows for every full window of `frame`.
///
/// `frame` must be labeled and hold exactly the schema sensors, in schema
/// order. With `drop_last` the final row (whose next state is unknown) is
/// omitted. The first `window - 1` rows never have a full window and are
/// skipped, so `len - window + 1 - drop_last` rows come back (saturating).
pub fn window_features(frame: &Frame, window: usize, drop_last: bool) -> Result<Vec<FeatureRow>> {
    if window == 0 {
        return Err(Error::InvalidConfig("window size must be positive".to_string()));
    }
    let labels = frame.require_labels()?;
    let n = frame.len();
    let end = if drop_last { n.saturating_sub(1) } else { n };
    let start = window.saturating_sub(1);
    if start >= end {
        return Ok(Vec::new());
    }

    let per_sensor: Vec<Vec<Option<WindowStats>>> = frame
        .sensors()
        .iter()
        .map(|name| frame.column(name).map(|col| rolling_stats(&col, window)))
        .collect::<Result<_>>()?;

    let timestamps = frame.timestamps();
    let rows = (start..end)
        .map(|i| {
            let mut features = Vec::with_capacity(per_sensor.len() * 2 + 1);
            for stats in &per_sensor {
                let s = stats[i].unwrap_or_default();
                features.push(s.mean);
                features.push(s.slope);
            }
            features.push(labels[i] as f64);
            FeatureRow {
                timestamp: timestamps.map(|t| t[i]),
                features,
                current_state: labels[i],
                next_state: labels.get(i + 1).copied(),
            }
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Frame {
        let rows = (0..n).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        Frame::new(vec!["a", "b"], rows)
            .unwrap()
            .with_timestamps((0..n as i64).collect())
            .unwrap()
            .with_labels((0..n).map(|i| i % 3).collect())
            .unwrap()
    }

    #[test]
    fn test_row_count() {
        let frame = ramp(10);
        assert_eq!(window_features(&frame, 4, true).unwrap().len(), 10 - 4 + 1 - 1);
        assert_eq!(window_features(&frame, 4, false).unwrap().len(), 10 - 4 + 1);
        assert!(window_features(&ramp(3), 4, false).unwrap().is_empty());
        assert!(window_features(&ramp(4), 4, true).unwrap().is_empty());
    }

    #[test]
    fn test_values_on_ramp() {
        let rows = window_features(&ramp(6), 3, false).unwrap();
        let first = &rows[0];
        assert_eq!(first.timestamp, Some(2));
        assert!((first.features[0] - 1.0).abs() < 1e-12);
        assert!((first.features[1] - 1.0).abs() < 1e-12);
        assert!((first.features[2] - 2.0).abs() < 1e-12);
        assert!((first.features[3] - 2.0).abs() < 1e-12);
        assert_eq!(first.features[4], 2.0);
        assert_eq!(first.current_state, 2);
        assert_eq!(first.next_state, Some(0));
        assert_eq!(rows.last().unwrap().next_state, None);
    }

    #[test]
    fn test_unlabeled_frame() {
        let frame = Frame::new(vec!["a"], vec![vec![1.0]]).unwrap();
        assert!(window_features(&frame, 2, false).is_err());
    }
}
