//! Exponential smoothing models with externally estimated initial states.
//!
//! - Holt's linear trend
//! - Holt-Winters (additive trend, multiplicative seasonality)
//! - Initial parameter estimation from a classical decomposition
//! - The seeded smoothing engine combining the above

mod engine;
mod holt;
mod holt_winters;
mod initial;

pub use engine::{SeasonalSmoothingConfig, SeasonalSmoothingEngine};
pub use holt::HoltLinearTrend;
pub use holt_winters::{HoltWinters, SmoothingState};
pub use initial::{estimate_initial_params, estimate_with_handling, InitialParameters};
