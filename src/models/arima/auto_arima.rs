//! Automatic seasonal ARIMA order selection.
//!
//! Differencing orders come from unit-root and variance-ratio tests; the
//! AR/MA orders from a stepwise (Hyndman-Khandakar) or exhaustive search
//! minimising AIC or BIC.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::diff::{ndiffs, nsdiffs, seasonal_difference};
use super::model::{ModelOrder, SARIMA};
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Configuration for [`AutoARIMA`].
#[derive(Debug, Clone)]
pub struct AutoARIMAConfig {
    /// Maximum non-seasonal AR order.
    pub max_p: usize,
    /// Maximum non-seasonal MA order.
    pub max_q: usize,
    /// Maximum non-seasonal differencing order.
    pub max_d: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    /// Maximum seasonal differencing order.
    pub max_cap_d: usize,
    /// Seasonal period (0 or 1 for non-seasonal).
    pub seasonal_period: usize,
    /// Maximum of `p + q + P + Q`.
    pub max_order: usize,
    /// Non-seasonal orders of the first stepwise candidate.
    pub start_p: usize,
    pub start_q: usize,
    /// Upper bound on stepwise moves.
    pub max_steps: usize,
    /// Stepwise search (faster) vs exhaustive.
    pub stepwise: bool,
    /// Select by AIC (true) or BIC (false).
    pub use_aic: bool,
}

impl Default for AutoARIMAConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_q: 5,
            max_d: 2,
            max_cap_p: 2,
            max_cap_q: 2,
            max_cap_d: 1,
            seasonal_period: 0,
            max_order: 4,
            start_p: 0,
            start_q: 0,
            max_steps: 100,
            stepwise: true,
            use_aic: true,
        }
    }
}

impl AutoARIMAConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_cap_p = max_p;
        self.max_cap_d = max_d;
        self.max_cap_q = max_q;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Cap the total number of AR and MA coefficients.
    pub fn with_max_order(mut self, max_order: usize) -> Self {
        self.max_order = max_order;
        self
    }

    /// Orders of the first stepwise candidate.
    pub fn with_start_orders(mut self, start_p: usize, start_q: usize) -> Self {
        self.start_p = start_p;
        self.start_q = start_q;
        self
    }

    /// Use BIC instead of AIC.
    pub fn with_bic(mut self) -> Self {
        self.use_aic = false;
        self
    }

    /// Use exhaustive search instead of stepwise.
    pub fn exhaustive(mut self) -> Self {
        self.stepwise = false;
        self
    }

    fn is_seasonal(&self) -> bool {
        self.seasonal_period > 1
    }

    fn admits(&self, order: &ModelOrder) -> bool {
        order.p <= self.max_p
            && order.q <= self.max_q
            && order.cap_p <= self.max_cap_p
            && order.cap_q <= self.max_cap_q
            && order.num_coefficients() <= self.max_order
    }
}

/// Automatic SARIMA model selection.
#[derive(Debug, Clone)]
pub struct AutoARIMA {
    config: AutoARIMAConfig,
    selected_model: Option<SARIMA>,
    /// Every successfully fitted order with its criterion value.
    model_scores: Vec<(ModelOrder, f64)>,
}

impl AutoARIMA {
    pub fn new() -> Self {
        Self::with_config(AutoARIMAConfig::default())
    }

    pub fn with_config(config: AutoARIMAConfig) -> Self {
        Self {
            config,
            selected_model: None,
            model_scores: Vec::new(),
        }
    }

    /// AutoARIMA with a seasonal period and default limits.
    pub fn seasonal(period: usize) -> Self {
        Self::with_config(AutoARIMAConfig::default().with_seasonal_period(period))
    }

    pub fn config(&self) -> &AutoARIMAConfig {
        &self.config
    }

    pub fn selected_order(&self) -> Option<ModelOrder> {
        self.selected_model.as_ref().map(SARIMA::order)
    }

    pub fn selected_model(&self) -> Option<&SARIMA> {
        self.selected_model.as_ref()
    }

    pub fn model_scores(&self) -> &[(ModelOrder, f64)] {
        &self.model_scores
    }

    /// Fit one candidate and record its score.
    fn evaluate(&mut self, series: &TimeSeries, order: ModelOrder) -> Option<(SARIMA, f64)> {
        let mut model = SARIMA::new(order);
        if let Err(e) = model.fit(series) {
            warn!(%order, error = %e, "dropping candidate");
            return None;
        }
        let score = if self.config.use_aic {
            model.aic()
        } else {
            model.bic()
        }
        .filter(|s| s.is_finite())?;

        debug!(%order, score, "candidate fitted");
        self.model_scores.push((order, score));
        Some((model, score))
    }

    fn stepwise_search(&mut self, series: &TimeSeries, d: usize, cap_d: usize) -> Option<SARIMA> {
        let s = self.config.seasonal_period;
        let seasonal = usize::from(self.config.is_seasonal());
        let order = |p, q, cap_p, cap_q| {
            ModelOrder::seasonal(p, d, q, cap_p * seasonal, cap_d, cap_q * seasonal, s)
        };

        let initial = [
            order(self.config.start_p, self.config.start_q, 1, 1),
            order(0, 0, 0, 0),
            order(1, 0, 1, 0),
            order(0, 1, 0, 1),
        ];

        let mut visited = HashSet::new();
        let mut best: Option<(SARIMA, f64)> = None;
        for candidate in initial {
            if !self.config.admits(&candidate) || !visited.insert(candidate) {
                continue;
            }
            if let Some((model, score)) = self.evaluate(series, candidate) {
                if best.as_ref().map_or(true, |(_, b)| score < *b) {
                    best = Some((model, score));
                }
            }
        }

        for step in 0..self.config.max_steps {
            let Some((current, current_score)) = best.as_ref() else {
                break;
            };
            let current_score = *current_score;
            let neighbours = Self::neighbours(current.order(), seasonal == 1);

            let mut improved = None;
            for candidate in neighbours {
                if !self.config.admits(&candidate) || !visited.insert(candidate) {
                    continue;
                }
                if let Some((model, score)) = self.evaluate(series, candidate) {
                    if score < current_score {
                        improved = Some((model, score));
                        break;
                    }
                }
            }

            match improved {
                Some(better) => {
                    debug!(step, order = %better.0.order(), score = better.1, "stepwise move");
                    best = Some(better);
                }
                None => break,
            }
        }

        best.map(|(model, _)| model)
    }

    /// Orders one step away: single and joint ±1 moves on (p, q) and (P, Q).
    fn neighbours(order: ModelOrder, seasonal: bool) -> Vec<ModelOrder> {
        let mut moves: Vec<[isize; 4]> = Vec::new();
        for delta in [-1, 1] {
            moves.push([delta, 0, 0, 0]);
            moves.push([0, delta, 0, 0]);
            if seasonal {
                moves.push([0, 0, delta, 0]);
                moves.push([0, 0, 0, delta]);
            }
        }
        for delta in [-1, 1] {
            moves.push([delta, delta, 0, 0]);
            if seasonal {
                moves.push([0, 0, delta, delta]);
            }
        }

        let shift = |value: usize, delta: isize| value.checked_add_signed(delta);
        moves
            .into_iter()
            .filter_map(|[dp, dq, dsp, dsq]| {
                Some(ModelOrder {
                    p: shift(order.p, dp)?,
                    q: shift(order.q, dq)?,
                    cap_p: shift(order.cap_p, dsp)?,
                    cap_q: shift(order.cap_q, dsq)?,
                    ..order
                })
            })
            .collect()
    }

    fn exhaustive_search(&mut self, series: &TimeSeries, d: usize, cap_d: usize) -> Option<SARIMA> {
        let s = self.config.seasonal_period;
        let (max_sp, max_sq) = if self.config.is_seasonal() {
            (self.config.max_cap_p, self.config.max_cap_q)
        } else {
            (0, 0)
        };

        let mut best: Option<(SARIMA, f64)> = None;
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                for cap_p in 0..=max_sp {
                    for cap_q in 0..=max_sq {
                        let candidate = ModelOrder::seasonal(p, d, q, cap_p, cap_d, cap_q, s);
                        if !self.config.admits(&candidate) {
                            continue;
                        }
                        if let Some((model, score)) = self.evaluate(series, candidate) {
                            if best.as_ref().map_or(true, |(_, b)| score < *b) {
                                best = Some((model, score));
                            }
                        }
                    }
                }
            }
        }
        best.map(|(model, _)| model)
    }
}

impl Default for AutoARIMA {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for AutoARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        let s = self.config.seasonal_period;
        let min_required = if self.config.is_seasonal() { 3 * s } else { 10 };
        if values.len() < min_required {
            return Err(ForecastError::InsufficientData {
                needed: min_required,
                got: values.len(),
            });
        }

        let cap_d = if self.config.is_seasonal() {
            nsdiffs(values, s).min(self.config.max_cap_d)
        } else {
            0
        };
        let d = ndiffs(&seasonal_difference(values, cap_d, s), self.config.max_d);
        debug!(d, cap_d, "differencing orders");

        self.model_scores.clear();
        let selected = if self.config.stepwise {
            self.stepwise_search(series, d, cap_d)
        } else {
            self.exhaustive_search(series, d, cap_d)
        };

        let model = selected.ok_or_else(|| {
            ForecastError::ComputationError("no candidate ARIMA model could be fitted".to_string())
        })?;
        info!(
            order = %model.order(),
            aic = model.aic().unwrap_or(f64::NAN),
            candidates = self.model_scores.len(),
            "selected model"
        );
        self.selected_model = Some(model);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.selected_model
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.selected_model
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.selected_model.as_ref()?.fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.selected_model.as_ref()?.residuals()
    }

    fn name(&self) -> &str {
        "AutoARIMA"
    }
}
