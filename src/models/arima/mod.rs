//! Seasonal ARIMA models.
//!
//! - [`SARIMA`]: a fixed-order `(p, d, q)(P, D, Q)[s]` model fitted by
//!   conditional sum of squares
//! - [`AutoARIMA`]: differencing tests plus a stepwise order search
//! - [`ArimaEngine`]: the order search wrapped in a hold-out forecast

mod auto_arima;
mod diff;
mod engine;
mod model;
mod stationarity;

pub use auto_arima::{AutoARIMA, AutoARIMAConfig};
pub use diff::{difference, integrate, ndiffs, nsdiffs, seasonal_difference, seasonal_integrate};
pub use engine::{ArimaEngine, ArimaEngineConfig};
pub use model::{ModelOrder, SARIMA};
pub use stationarity::{adf_test, CriticalValues, StationarityResult};
