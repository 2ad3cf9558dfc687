//! Holt-Winters (triple exponential smoothing) with additive trend and
//! multiplicative seasonality.
//!
//! The smoothing coefficients are fixed and the initial level, trend and
//! seasonal factors are seeded from an external estimate.

use super::holt::check_coefficient;
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::stats::quantile_normal;
use tracing::debug;

/// Level, trend and one cycle of seasonal factors.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingState {
    pub level: f64,
    pub trend: f64,
    pub seasonals: Vec<f64>,
}

/// Holt-Winters forecaster.
///
/// With state index `t` counting consumed observations and period `m`:
/// - Fitted: `ŷ_t = (l_t + b_t)·s_t`
/// - Level: `l_{t+1} = α·y_t/s_t + (1-α)(l_t + b_t)`
/// - Trend: `b_{t+1} = β(l_{t+1} - l_t) + (1-β)·b_t`
/// - Seasonal: `s_{t+m} = γ·y_t/(l_t + b_t) + (1-γ)·s_t`
/// - Forecast: `ŷ_{n+h-1} = (l_n + h·b_n)·s_{n+(h-1) mod m}`
#[derive(Debug, Clone)]
pub struct HoltWinters {
    alpha: f64,
    beta: f64,
    gamma: f64,
    seasonal_period: usize,
    initial: Option<SmoothingState>,
    state: Option<SmoothingState>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    n: usize,
}

impl HoltWinters {
    /// Create a Holt-Winters model with fixed smoothing parameters in `[0, 1]`.
    ///
    /// The model cannot be fitted until an initial state is seeded with
    /// [`with_initial_state`](Self::with_initial_state).
    pub fn new(alpha: f64, beta: f64, gamma: f64, seasonal_period: usize) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            seasonal_period,
            initial: None,
            state: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            n: 0,
        }
    }

    /// Seed `l_0`, `b_0` and `s_0..s_{m-1}`.
    pub fn with_initial_state(mut self, level: f64, trend: f64, seasonals: Vec<f64>) -> Self {
        self.initial = Some(SmoothingState {
            level,
            trend,
            seasonals,
        });
        self
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    /// Final state after fitting.
    pub fn state(&self) -> Option<&SmoothingState> {
        self.state.as_ref()
    }

    fn validate(&self, values: &[f64], start: &SmoothingState) -> Result<()> {
        check_coefficient("alpha", self.alpha)?;
        check_coefficient("beta", self.beta)?;
        check_coefficient("gamma", self.gamma)?;
        if start.seasonals.len() != self.seasonal_period {
            return Err(ForecastError::DimensionMismatch {
                expected: self.seasonal_period,
                got: start.seasonals.len(),
            });
        }
        if values.iter().any(|&y| y <= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "multiplicative seasonality requires strictly positive data".to_string(),
            ));
        }
        if start.seasonals.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "multiplicative seasonal factors must be finite and non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if self.seasonal_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let start = self.initial.clone().ok_or_else(|| {
            ForecastError::InvalidParameter("Holt-Winters initial state is not seeded".to_string())
        })?;
        self.validate(values, &start)?;

        let (alpha, beta, gamma) = (self.alpha, self.beta, self.gamma);
        let period = self.seasonal_period;
        let SmoothingState {
            mut level,
            mut trend,
            mut seasonals,
        } = start;

        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());

        for (t, &y) in values.iter().enumerate() {
            let idx = t % period;
            let s = seasonals[idx];
            let base = level + trend;

            let forecast = base * s;
            fitted.push(forecast);
            residuals.push(y - forecast);

            let level_prev = level;
            level = alpha * (y / s) + (1.0 - alpha) * base;
            seasonals[idx] = gamma * (y / base) + (1.0 - gamma) * s;
            trend = beta * (level - level_prev) + (1.0 - beta) * trend;
        }

        let variance = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
        debug!(
            level,
            trend,
            period,
            variance,
            "fitted Holt-Winters"
        );

        self.n = values.len();
        self.state = Some(SmoothingState {
            level,
            trend,
            seasonals,
        });
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.residual_variance = Some(variance);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        let period = self.seasonal_period;

        let predictions = (1..=horizon)
            .map(|h| {
                let s = state.seasonals[(self.n + h - 1) % period];
                (state.level + h as f64 * state.trend) * s
            })
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let point = self.predict(horizon)?;
        let variance = self.residual_variance.ok_or(ForecastError::FitRequired)?;
        let z = quantile_normal((1.0 + level) / 2.0);
        let period = self.seasonal_period;

        let (lower, upper): (Vec<f64>, Vec<f64>) = point
            .primary()
            .iter()
            .enumerate()
            .map(|(i, &pred)| {
                // Grows with the number of seasons ahead
                let k = i / period + 1;
                let se = (variance * k as f64).sqrt();
                (pred - z * se, pred + z * se)
            })
            .unzip();

        Ok(Forecast::from_values_with_intervals(
            point.primary().to_vec(),
            lower,
            upper,
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "HoltWinters"
    }
}
