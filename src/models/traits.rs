//! Capabilities shared by the forecasting models and engines.

use crate::core::{Forecast, ForecastTable, TimeSeries};
use crate::error::Result;

/// Common interface for the individual forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with confidence intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;

/// End-to-end pipeline from an observed daily series to a forecast table.
///
/// # Example
///
/// ```
/// use activity_forecast::models::{ForecastEngine, SeasonalSmoothingEngine};
/// use activity_forecast::models::arima::ArimaEngine;
///
/// let engines: Vec<Box<dyn ForecastEngine>> = vec![
///     Box::new(SeasonalSmoothingEngine::default()),
///     Box::new(ArimaEngine::default()),
/// ];
/// let names: Vec<&str> = engines.iter().map(|e| e.name()).collect();
/// assert_eq!(names, ["HoltWinters", "AutoARIMA"]);
/// ```
pub trait ForecastEngine {
    /// Engine name used in reports.
    fn name(&self) -> &str;

    /// Fit on `series` and return observed values aligned with forecasts.
    fn forecast(&self, series: &TimeSeries) -> Result<ForecastTable>;
}
