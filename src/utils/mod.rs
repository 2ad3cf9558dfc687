//! Utility functions for forecasting models.

pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use metrics::{calculate_metrics, paired_metrics, AccuracyMetrics};
pub use ols::{ols_fit, OLSResult};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{finite_mean, mean, pearson_correlation, quantile_normal, variance};
