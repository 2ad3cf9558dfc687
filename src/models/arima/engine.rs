//! Auto-SARIMA pipeline with a hold-out refit.
//!
//! The order is chosen on the full series, then refitted without the last
//! `horizon` days so the forecast overlaps them for validation and runs
//! `extra_steps` days past the data.

use chrono::Duration;
use tracing::info;

use super::auto_arima::{AutoARIMA, AutoARIMAConfig};
use super::model::SARIMA;
use crate::core::{ForecastTable, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastEngine, Forecaster};

/// Configuration for [`ArimaEngine`].
#[derive(Debug, Clone)]
pub struct ArimaEngineConfig {
    pub seasonal_period: usize,
    /// Days held out of the refit.
    pub horizon: usize,
    /// Days forecast past the last observation.
    pub extra_steps: usize,
    /// Maximum of `p + q + P + Q`.
    pub max_order: usize,
    pub start_p: usize,
    pub start_q: usize,
    /// Prediction interval level.
    pub level: f64,
}

impl Default for ArimaEngineConfig {
    fn default() -> Self {
        Self {
            seasonal_period: 7,
            horizon: 7,
            extra_steps: 7,
            max_order: 4,
            start_p: 0,
            start_q: 0,
            level: 0.95,
        }
    }
}

impl ArimaEngineConfig {
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Hold-out length and forecast extension.
    pub fn with_horizon(mut self, horizon: usize, extra_steps: usize) -> Self {
        self.horizon = horizon;
        self.extra_steps = extra_steps;
        self
    }

    pub fn with_max_order(mut self, max_order: usize) -> Self {
        self.max_order = max_order;
        self
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    fn search_config(&self) -> AutoARIMAConfig {
        AutoARIMAConfig::default()
            .with_seasonal_period(self.seasonal_period)
            .with_max_order(self.max_order)
            .with_start_orders(self.start_p, self.start_q)
    }
}

/// Seasonal ARIMA engine with automatic order selection.
#[derive(Debug, Clone, Default)]
pub struct ArimaEngine {
    config: ArimaEngineConfig,
}

impl ArimaEngine {
    pub fn new(config: ArimaEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArimaEngineConfig {
        &self.config
    }
}

impl ForecastEngine for ArimaEngine {
    fn name(&self) -> &str {
        "AutoARIMA"
    }

    fn forecast(&self, series: &TimeSeries) -> Result<ForecastTable> {
        let cfg = &self.config;
        if cfg.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "hold-out horizon must be at least one day".to_string(),
            ));
        }
        let n = series.len();
        if n <= cfg.horizon {
            return Err(ForecastError::InsufficientData {
                needed: cfg.horizon + 1,
                got: n,
            });
        }

        let mut search = AutoARIMA::with_config(cfg.search_config());
        search.fit(series)?;
        let order = search.selected_order().ok_or(ForecastError::FitRequired)?;

        let training = series.slice(0, n - cfg.horizon)?;
        let mut model = SARIMA::new(order);
        model.fit(&training)?;
        let forecast = model.predict_with_intervals(cfg.horizon + cfg.extra_steps, cfg.level)?;

        let last = series.last_timestamp().ok_or(ForecastError::EmptyData)?;
        let first = last - Duration::days(cfg.horizon as i64 - 1);
        info!(%order, %first, steps = forecast.horizon(), "hold-out forecast");

        ForecastTable::overlay(series, &forecast, first)
    }
}
