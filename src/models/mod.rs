//! Forecasting models and the end-to-end engines built on them.

mod traits;

pub mod arima;
pub mod exponential;

pub use arima::ArimaEngine;
pub use exponential::{SeasonalSmoothingConfig, SeasonalSmoothingEngine};
pub use traits::{BoxedForecaster, ForecastEngine, Forecaster};
