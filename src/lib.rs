//! # activity-forecast
//!
//! Forecasting of daily activity durations (seconds per day).
//!
//! Two engines share the [`models::ForecastEngine`] interface:
//!
//! - [`models::SeasonalSmoothingEngine`]: detects the seasonal period from the
//!   raw autocorrelation, seeds Holt-Winters (or Holt's linear trend) from a
//!   classical decomposition and forecasts one period ahead.
//! - [`models::ArimaEngine`]: selects a seasonal ARIMA order stepwise by AIC,
//!   refits it without the last week and forecasts across that week and
//!   beyond, with prediction intervals.
//!
//! # Example
//!
//! ```
//! use activity_forecast::prelude::*;
//! use chrono::NaiveDate;
//!
//! let pattern = [1.3, 1.0, 0.9, 1.1, 0.8, 0.7, 1.2];
//! let seconds: Vec<f64> = (0..56)
//!     .map(|i| (3600.0 + 20.0 * i as f64) * pattern[i % 7])
//!     .collect();
//! let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let series = TimeSeries::daily(start, seconds).unwrap().with_label("SECONDS");
//!
//! let table = SeasonalSmoothingEngine::default().forecast(&series).unwrap();
//! assert_eq!(table.len(), 56 + 7);
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod detection;
pub mod error;
pub mod io;
pub mod models;
pub mod reporting;
pub mod seasonality;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, ForecastTable, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::io::{load_daily_csv, LoaderConfig};
    pub use crate::models::{ArimaEngine, ForecastEngine, Forecaster, SeasonalSmoothingEngine};
    pub use crate::reporting::{holdout_mae_hours, ComparisonReport};
    pub use crate::utils::{calculate_metrics, quantile_normal, AccuracyMetrics};
}
