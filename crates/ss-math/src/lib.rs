//! Stream Story math utilities.

pub mod math;

pub use math::gaussian::{erfc, normal_cdf, normal_pdf, GaussianEstimator};
pub use math::rolling::{least_squares_slope, rolling_stats, RollingWindow, WindowStats};
pub use math::stable::*;
pub use math::vector::*;
