//! Holt's linear trend model with a known initial state.
//!
//! Used for series without seasonality: the initial level and trend come
//! from a regression on the de-seasonalised series instead of being
//! estimated from the first observations.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::stats::quantile_normal;
use tracing::debug;

/// Holt's Linear Trend forecaster.
///
/// With state index `t` counting consumed observations:
/// - Fitted: `ŷ_t = l_t + b_t`
/// - Level: `l_{t+1} = α·y_t + (1-α)(l_t + b_t)`
/// - Trend: `b_{t+1} = β(l_{t+1} - l_t) + (1-β)·b_t`
/// - Forecast: `ŷ_{n+h-1} = l_n + h·b_n`
#[derive(Debug, Clone)]
pub struct HoltLinearTrend {
    alpha: f64,
    beta: f64,
    /// Seeded `(l_0, b_0)`.
    initial: Option<(f64, f64)>,
    level: Option<f64>,
    trend: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
}

impl HoltLinearTrend {
    /// Create a Holt model with fixed smoothing parameters in `[0, 1]`.
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            initial: None,
            level: None,
            trend: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// Seed the initial level and trend.
    pub fn with_initial_state(mut self, level: f64, trend: f64) -> Self {
        self.initial = Some((level, trend));
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Final level after fitting.
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// Final trend after fitting.
    pub fn trend(&self) -> Option<f64> {
        self.trend
    }

    fn initial_state(&self) -> Result<(f64, f64)> {
        check_coefficient("alpha", self.alpha)?;
        check_coefficient("beta", self.beta)?;
        self.initial.ok_or_else(|| {
            ForecastError::InvalidParameter("Holt initial state is not seeded".to_string())
        })
    }
}

/// Smoothing coefficients must lie in `[0, 1]`.
pub(super) fn check_coefficient(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

impl Forecaster for HoltLinearTrend {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let (mut l, mut b) = self.initial_state()?;
        let (alpha, beta) = (self.alpha, self.beta);

        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());

        for &y in values {
            let forecast = l + b;
            fitted.push(forecast);
            residuals.push(y - forecast);

            let l_prev = l;
            l = alpha * y + (1.0 - alpha) * (l_prev + b);
            b = beta * (l - l_prev) + (1.0 - beta) * b;
        }

        let variance = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
        debug!(level = l, trend = b, variance, "fitted Holt linear trend");

        self.level = Some(l);
        self.trend = Some(b);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.residual_variance = Some(variance);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let l = self.level.ok_or(ForecastError::FitRequired)?;
        let b = self.trend.ok_or(ForecastError::FitRequired)?;

        let predictions = (1..=horizon).map(|h| l + h as f64 * b).collect();
        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let point = self.predict(horizon)?;
        let variance = self.residual_variance.ok_or(ForecastError::FitRequired)?;
        let z = quantile_normal((1.0 + level) / 2.0);
        let (alpha, beta) = (self.alpha, self.beta);

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (i, &pred) in point.primary().iter().enumerate() {
            // Variance multiplier 1 + Σ_{j<h} (α + αβj)²
            let c: f64 = 1.0
                + (1..=i)
                    .map(|j| (alpha + alpha * beta * j as f64).powi(2))
                    .sum::<f64>();
            let se = (variance * c).sqrt();
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

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
        "HoltLinearTrend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn daily(values: Vec<f64>) -> TimeSeries {
        TimeSeries::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn exact_line_is_tracked_from_a_correct_seed() {
        // y_t = 5 + 3t with l_0 = 5 - 3, b_0 = 3 gives fitted == actual
        let values: Vec<f64> = (0..20).map(|i| 5.0 + 3.0 * i as f64).collect();
        let mut model = HoltLinearTrend::new(0.5, 0.01).with_initial_state(2.0, 3.0);
        model.fit(&daily(values.clone())).unwrap();

        for (f, y) in model.fitted_values().unwrap().iter().zip(values.iter()) {
            assert_relative_eq!(f, y, epsilon = 1e-9);
        }
        let forecast = model.predict(3).unwrap();
        assert_relative_eq!(forecast.primary()[0], 65.0, epsilon = 1e-9);
        assert_relative_eq!(forecast.primary()[2], 71.0, epsilon = 1e-9);
    }

    #[test]
    fn one_step_recursion_by_hand() {
        let mut model = HoltLinearTrend::new(0.5, 0.1).with_initial_state(10.0, 1.0);
        model.fit(&daily(vec![13.0])).unwrap();

        // fitted = 11; l_1 = 0.5*13 + 0.5*11 = 12; b_1 = 0.1*2 + 0.9*1 = 1.1
        assert_relative_eq!(model.fitted_values().unwrap()[0], 11.0);
        assert_relative_eq!(model.level().unwrap(), 12.0, epsilon = 1e-12);
        assert_relative_eq!(model.trend().unwrap(), 1.1, epsilon = 1e-12);
        assert_relative_eq!(model.predict(2).unwrap().primary()[1], 14.2, epsilon = 1e-12);
    }

    #[test]
    fn unseeded_model_is_rejected() {
        let mut model = HoltLinearTrend::new(0.3, 0.1);
        assert!(matches!(
            model.fit(&daily(vec![10.0, 12.0, 14.0, 16.0])),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(!model.is_fitted());
    }

    #[test]
    fn boundary_coefficients_are_used_unchanged() {
        // alpha = 1 follows the data exactly; beta = 0 keeps the seeded trend
        let mut model = HoltLinearTrend::new(1.0, 0.0).with_initial_state(10.0, 2.0);
        model.fit(&daily(vec![13.0, 20.0])).unwrap();
        assert_eq!(model.alpha(), 1.0);
        assert_relative_eq!(model.level().unwrap(), 20.0);
        assert_relative_eq!(model.trend().unwrap(), 2.0);

        let mut bad = HoltLinearTrend::new(1.2, 0.1).with_initial_state(10.0, 2.0);
        assert!(matches!(
            bad.fit(&daily(vec![13.0])),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn intervals_widen_with_horizon() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 + (i % 3) as f64).collect();
        let mut model = HoltLinearTrend::new(0.5, 0.01).with_initial_state(100.0, 1.0);
        model.fit(&daily(values)).unwrap();

        let forecast = model.predict_with_intervals(5, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        for i in 0..5 {
            assert!(lower[i] < forecast.primary()[i]);
            assert!(upper[i] > forecast.primary()[i]);
        }
        assert!(upper[4] - lower[4] > upper[0] - lower[0]);
    }

    #[test]
    fn requires_fit_before_predict() {
        let model = HoltLinearTrend::new(0.3, 0.1);
        assert!(!model.is_fitted());
        assert!(matches!(model.predict(5), Err(ForecastError::FitRequired)));
    }

    #[test]
    fn rejects_missing_values() {
        let mut model = HoltLinearTrend::new(0.3, 0.1).with_initial_state(1.0, 0.0);
        assert!(matches!(
            model.fit(&daily(vec![1.0, f64::NAN])),
            Err(ForecastError::MissingValues)
        ));
    }
}
