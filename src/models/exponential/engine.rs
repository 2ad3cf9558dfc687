//! Seeded exponential-smoothing pipeline.
//!
//! Detects the seasonal period, estimates the initial state and runs a
//! fixed-coefficient Holt-Winters model (Holt's linear trend when there is
//! no seasonality). The forecast covers one full period past the data.

use super::initial::estimate_with_handling;
use super::{HoltLinearTrend, HoltWinters};
use crate::core::{ForecastTable, TimeSeries};
use crate::detection::{PeriodDetector, DEFAULT_CORRELATION_THRESHOLD};
use crate::error::{ForecastError, Result};
use crate::models::{ForecastEngine, Forecaster};
use crate::transform::{ZeroHandling, ZERO_SENTINEL_SECONDS};
use tracing::{debug, info};

/// Configuration for [`SeasonalSmoothingEngine`].
#[derive(Debug, Clone)]
pub struct SeasonalSmoothingConfig {
    /// Interpolate zeros and fit on log scale instead of using the sentinel.
    pub use_log_transform: bool,
    /// Level smoothing coefficient.
    pub alpha: f64,
    /// Trend smoothing coefficient.
    pub beta: f64,
    /// Seasonal smoothing coefficient.
    pub gamma: f64,
    /// Minimum lagged correlation for a detected period.
    pub corr_threshold: f64,
    /// Minimum number of cycles a candidate period must fit.
    pub min_cycles: usize,
    /// Replacement for zero days when not on log scale.
    pub zero_sentinel: f64,
}

impl Default for SeasonalSmoothingConfig {
    fn default() -> Self {
        Self {
            use_log_transform: false,
            alpha: 0.5,
            beta: 0.01,
            gamma: 0.01,
            corr_threshold: DEFAULT_CORRELATION_THRESHOLD,
            min_cycles: 2,
            zero_sentinel: ZERO_SENTINEL_SECONDS,
        }
    }
}

impl SeasonalSmoothingConfig {
    pub fn with_log_transform(mut self, enabled: bool) -> Self {
        self.use_log_transform = enabled;
        self
    }

    /// Set alpha, beta and gamma.
    pub fn with_smoothing(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    pub fn with_corr_threshold(mut self, threshold: f64) -> Self {
        self.corr_threshold = threshold;
        self
    }

    pub fn with_min_cycles(mut self, min_cycles: usize) -> Self {
        self.min_cycles = min_cycles;
        self
    }

    pub fn with_zero_sentinel(mut self, sentinel: f64) -> Self {
        self.zero_sentinel = sentinel;
        self
    }

    fn zero_handling(&self) -> ZeroHandling {
        ZeroHandling::from_flag(self.use_log_transform, self.zero_sentinel)
    }
}

/// Holt-Winters engine seeded from a decomposition of the series.
#[derive(Debug, Clone, Default)]
pub struct SeasonalSmoothingEngine {
    config: SeasonalSmoothingConfig,
}

impl SeasonalSmoothingEngine {
    pub fn new(config: SeasonalSmoothingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeasonalSmoothingConfig {
        &self.config
    }
}

impl ForecastEngine for SeasonalSmoothingEngine {
    fn name(&self) -> &str {
        "HoltWinters"
    }

    fn forecast(&self, series: &TimeSeries) -> Result<ForecastTable> {
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        let cfg = &self.config;
        let handling = cfg.zero_handling();

        let estimate = PeriodDetector::default()
            .with_threshold(cfg.corr_threshold)
            .with_min_cycles(cfg.min_cycles)
            .detect(series.primary_values());
        let period = estimate.period;
        info!(period, correlation = estimate.correlation, "seasonal period");

        let params = estimate_with_handling(series, period, handling)?;
        let prepared = series.with_values(handling.apply(series.primary_values())?)?;

        let (fitted, forecast) = if period > 1 {
            let mut model = HoltWinters::new(cfg.alpha, cfg.beta, cfg.gamma, period)
                .with_initial_state(params.level, params.trend, params.seasonal);
            model.fit(&prepared)?;
            (fitted_of(&model)?, model.predict(period)?)
        } else {
            let mut model = HoltLinearTrend::new(cfg.alpha, cfg.beta)
                .with_initial_state(params.level, params.trend);
            model.fit(&prepared)?;
            (fitted_of(&model)?, model.predict(1)?)
        };

        let mut table = ForecastTable::from_fitted(&prepared, &fitted, &forecast)?;
        if handling.is_log() {
            table = table.map_values(|v| handling.invert(v));
        }

        for row in table.tail(period).rows() {
            debug!(date = %row.date.date_naive(), forecast = ?row.forecast, "forecast row");
        }
        Ok(table)
    }
}

fn fitted_of(model: &dyn Forecaster) -> Result<Vec<f64>> {
    model
        .fitted_values()
        .map(<[f64]>::to_vec)
        .ok_or(ForecastError::FitRequired)
}
