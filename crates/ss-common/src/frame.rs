//! Time-ordered sensor table shared by every pipeline stage.
//!
//! A [`Frame`] holds named sensor columns in row-major order plus two
//! optional typed columns: the time axis and the state label. Frames are
//! values; every operation returns a new frame and never mutates its input.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Cluster id assigned to a sample.
pub type Label = usize;

/// Sample timestamp. Units are chosen by the caller (typically epoch millis).
pub type Timestamp = i64;

/// Name reported when the time column is missing.
pub const TIME_COLUMN: &str = "timestamp";

/// Name reported when the label column is missing.
pub const LABEL_COLUMN: &str = "label";

/// Time-ordered table of sensor readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    sensors: Vec<String>,
    rows: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamps: Option<Vec<Timestamp>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<Vec<Label>>,
}

impl Frame {
    /// Build a frame from sensor names and row-major values.
    ///
    /// Every row must have one value per sensor, and sensor names must be
    /// unique and distinct from the reserved time and label column names.
    pub fn new<S: Into<String>>(sensors: Vec<S>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let sensors: Vec<String> = sensors.into_iter().map(Into::into).collect();

        let mut seen = HashSet::with_capacity(sensors.len());
        for name in &sensors {
            if name == TIME_COLUMN || name == LABEL_COLUMN {
                return Err(Error::InvalidConfig(format!(
                    "sensor name '{}' is reserved",
                    name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate sensor column '{}'",
                    name
                )));
            }
        }

        for row in &rows {
            if row.len() != sensors.len() {
                return Err(Error::DimensionMismatch {
                    expected: sensors.len(),
                    actual: row.len(),
                });
            }
        }

        Ok(Frame {
            sensors,
            rows,
            timestamps: None,
            labels: None,
        })
    }

    /// Attach a time column. Timestamps must be strictly ascending.
    pub fn with_timestamps(mut self, timestamps: Vec<Timestamp>) -> Result<Self> {
        if timestamps.len() != self.rows.len() {
            return Err(Error::DimensionMismatch {
                expected: self.rows.len(),
                actual: timestamps.len(),
            });
        }
        if let Some(index) = first_non_ascending(&timestamps) {
            return Err(Error::NonMonotonicTime { index });
        }
        self.timestamps = Some(timestamps);
        Ok(self)
    }

    /// Attach a state label column, one label per row.
    pub fn with_labels(mut self, labels: Vec<Label>) -> Result<Self> {
        if labels.len() != self.rows.len() {
            return Err(Error::DimensionMismatch {
                expected: self.rows.len(),
                actual: labels.len(),
            });
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of sensor columns.
    pub fn width(&self) -> usize {
        self.sensors.len()
    }

    /// Sensor column names in storage order.
    pub fn sensors(&self) -> &[String] {
        &self.sensors
    }

    /// Row-major sensor values.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn timestamps(&self) -> Option<&[Timestamp]> {
        self.timestamps.as_deref()
    }

    pub fn labels(&self) -> Option<&[Label]> {
        self.labels.as_deref()
    }

    /// Time column, or `MissingColumn` when the frame has none.
    pub fn require_timestamps(&self) -> Result<&[Timestamp]> {
        self.timestamps().ok_or_else(|| Error::MissingColumn {
            column: TIME_COLUMN.to_string(),
        })
    }

    /// Label column, or `MissingColumn` when the frame has none.
    pub fn require_labels(&self) -> Result<&[Label]> {
        self.labels().ok_or_else(|| Error::MissingColumn {
            column: LABEL_COLUMN.to_string(),
        })
    }

    /// Position of a sensor column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.sensors
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Copy of a single sensor column.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Keep only the named sensors, in the requested order.
    ///
    /// Time and label columns are carried over unchanged.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Frame> {
        let indices = names
            .iter()
            .map(|name| self.column_index(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i]).collect())
            .collect();

        Ok(Frame {
            sensors: indices.iter().map(|&i| self.sensors[i].clone()).collect(),
            rows,
            timestamps: self.timestamps.clone(),
            labels: self.labels.clone(),
        })
    }

    /// Last `n` rows (or all rows when the frame is shorter).
    pub fn tail(&self, n: usize) -> Frame {
        let start = self.rows.len().saturating_sub(n);
        Frame {
            sensors: self.sensors.clone(),
            rows: self.rows[start..].to_vec(),
            timestamps: self.timestamps.as_ref().map(|t| t[start..].to_vec()),
            labels: self.labels.as_ref().map(|l| l[start..].to_vec()),
        }
    }

    /// Append `other` below `self`.
    ///
    /// Both frames must share the sensor schema and agree on which optional
    /// columns they carry; the joined time axis must remain strictly
    /// ascending.
    pub fn concat(&self, other: &Frame) -> Result<Frame> {
        if self.sensors != other.sensors {
            if let Some(missing) = self.sensors.iter().find(|s| !other.sensors.contains(*s)) {
                return Err(Error::MissingColumn {
                    column: missing.clone(),
                });
            }
            return Err(Error::DimensionMismatch {
                expected: self.sensors.len(),
                actual: other.sensors.len(),
            });
        }

        let timestamps = match (&self.timestamps, &other.timestamps) {
            (Some(a), Some(b)) => {
                if let (Some(last), Some(first)) = (a.last(), b.first()) {
                    if first <= last {
                        return Err(Error::NonMonotonicTime { index: a.len() });
                    }
                }
                Some(a.iter().chain(b.iter()).copied().collect())
            }
            (None, None) => None,
            _ => {
                return Err(Error::MissingColumn {
                    column: TIME_COLUMN.to_string(),
                })
            }
        };

        let labels = match (&self.labels, &other.labels) {
            (Some(a), Some(b)) => Some(a.iter().chain(b.iter()).copied().collect()),
            (None, None) => None,
            _ => {
                return Err(Error::MissingColumn {
                    column: LABEL_COLUMN.to_string(),
                })
            }
        };

        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        rows.extend(self.rows.iter().cloned());
        rows.extend(other.rows.iter().cloned());

        Ok(Frame {
            sensors: self.sensors.clone(),
            rows,
            timestamps,
            labels,
        })
    }
}

fn first_non_ascending(timestamps: &[Timestamp]) -> Option<usize> {
    timestamps
        .windows(2)
        .position(|pair| pair[1] <= pair[0])
        .map(|i| i + 1)
}
