//! Trailing-window mean and least-squares slope.
//!
//! The window keeps `Σy` and `Σ i·y_i` (with `i` the position inside the
//! window, oldest = 0) so each push is O(1):
//!
//! ```text
//! Σy'     = Σy - y_0 + y_new
//! Σi·y'_i = Σi·y_i - Σy + y_0 + (W-1)·y_new
//! ```
//!
//! The slope of the least-squares line through `(i, y_i)` is then
//! `(Σi·y_i - x̄·Σy) / Sxx` with `x̄ = (W-1)/2` and `Sxx = W(W²-1)/12`.
//! Both sums are recomputed exactly from the buffer once per `W` pushes so
//! rounding error cannot accumulate over long streams, and immediately
//! whenever a non-finite value enters or leaves the window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Mean and slope of one full window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub mean: f64,
    pub slope: f64,
}

/// Fixed-capacity sliding window over a scalar stream.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
    weighted_sum: f64,
    pushes_since_resync: usize,
}

impl RollingWindow {
    /// Create an empty window. `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling window capacity must be positive");
        RollingWindow {
            capacity,
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
            weighted_sum: 0.0,
            pushes_since_resync: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Push a value, evicting the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() < self.capacity {
            self.weighted_sum += self.values.len() as f64 * value;
            self.sum += value;
            self.values.push_back(value);
            return;
        }

        let oldest = self.values.pop_front().unwrap_or(0.0);
        self.weighted_sum =
            self.weighted_sum - self.sum + oldest + (self.capacity - 1) as f64 * value;
        self.sum = self.sum - oldest + value;
        self.values.push_back(value);

        // inf - inf in the running sums would outlive the sample that caused it.
        self.pushes_since_resync += 1;
        if self.pushes_since_resync >= self.capacity
            || !oldest.is_finite()
            || !self.sum.is_finite()
            || !self.weighted_sum.is_finite()
        {
            self.resync();
        }
    }

    /// Stats of the current window, or `None` until the window is full.
    pub fn stats(&self) -> Option<WindowStats> {
        if !self.is_full() {
            return None;
        }
        let n = self.capacity as f64;
        let mean = self.sum / n;
        let sxx = n * (n * n - 1.0) / 12.0;
        let slope = if sxx > 0.0 {
            let x_bar = (n - 1.0) / 2.0;
            (self.weighted_sum - x_bar * self.sum) / sxx
        } else {
            0.0
        };
        Some(WindowStats { mean, slope })
    }

    fn resync(&mut self) {
        self.sum = self.values.iter().sum();
        self.weighted_sum = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| i as f64 * v)
            .sum();
        self.pushes_since_resync = 0;
    }
}

/// Trailing stats for every position of `values`.
///
/// Entry `i` covers `values[i + 1 - window ..= i]`; the first `window - 1`
/// entries are `None`.
pub fn rolling_stats(values: &[f64], window: usize) -> Vec<Option<WindowStats>> {
    let mut rolling = RollingWindow::new(window);
    values
        .iter()
        .map(|&v| {
            rolling.push(v);
            rolling.stats()
        })
        .collect()
}

/// Slope of the least-squares line through `(i, values[i])`, computed directly.
///
/// Returns 0.0 for fewer than two points.
pub fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_bar = (n - 1) as f64 / 2.0;
    let y_bar = values.iter().sum::<f64>() / n as f64;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_bar;
        num += dx * (y - y_bar);
        den += dx * dx;
    }
    num / den
}
