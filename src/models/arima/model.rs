//! Seasonal ARIMA fitted by conditional sum of squares.
//!
//! The model is `Φ(B^s) φ(B) (1-B)^d (1-B^s)^D (y_t - μ) = Θ(B^s) θ(B) e_t`.
//! A plain ARIMA is the special case with no seasonal terms.

use std::fmt;

use super::diff::{difference, integrate, seasonal_difference, seasonal_integrate};
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, quantile_normal};

/// Lower bound on the residual variance used in the likelihood.
const MIN_VARIANCE: f64 = 1e-10;

/// Bound on every AR and MA coefficient during fitting.
const COEFFICIENT_BOUND: f64 = 0.99;

/// Order of a seasonal ARIMA model: `(p, d, q)(P, D, Q)[s]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    /// Seasonal AR order (P)
    pub cap_p: usize,
    /// Seasonal differencing order (D)
    pub cap_d: usize,
    /// Seasonal MA order (Q)
    pub cap_q: usize,
    /// Seasonal period (s)
    pub s: usize,
}

impl ModelOrder {
    /// Non-seasonal `ARIMA(p, d, q)`.
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::seasonal(p, d, q, 0, 0, 0, 0)
    }

    /// `SARIMA(p, d, q)(P, D, Q)[s]`.
    #[allow(clippy::too_many_arguments)]
    pub fn seasonal(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    pub fn is_seasonal(&self) -> bool {
        self.cap_p + self.cap_d + self.cap_q > 0
    }

    /// Number of AR and MA coefficients.
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q
    }

    /// Observations consumed by differencing.
    fn differencing_loss(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Highest lag of the expanded AR polynomial.
    fn ar_span(&self) -> usize {
        self.p + self.s * self.cap_p
    }

    /// Highest lag of the expanded MA polynomial.
    fn ma_span(&self) -> usize {
        self.q + self.s * self.cap_q
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.is_seasonal() {
            write!(f, "({},{},{})[{}]", self.cap_p, self.cap_d, self.cap_q, self.s)?;
        }
        Ok(())
    }
}

/// Seasonal ARIMA forecasting model.
#[derive(Debug, Clone)]
pub struct SARIMA {
    order: ModelOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    /// Mean of the differenced series (0 when d + D >= 2).
    intercept: f64,
    original: Option<Vec<f64>>,
    differenced: Vec<f64>,
    /// Innovations on the differenced scale.
    innovations: Vec<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
}

impl SARIMA {
    /// Create an unfitted model of the given order.
    pub fn new(order: ModelOrder) -> Self {
        Self {
            order,
            ar: vec![],
            ma: vec![],
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            intercept: 0.0,
            original: None,
            differenced: vec![],
            innovations: vec![],
            fitted: None,
            residuals: None,
            residual_variance: None,
            aic: None,
            bic: None,
        }
    }

    /// Non-seasonal `ARIMA(p, d, q)`.
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(ModelOrder::arima(p, d, q))
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    fn includes_intercept(&self) -> bool {
        self.order.d + self.order.cap_d < 2
    }

    fn validate_order(&self) -> Result<()> {
        let order = &self.order;
        if order.is_seasonal() && order.s < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal terms need a period of at least 2, got {}",
                order.s
            )));
        }
        Ok(())
    }

    /// Split an optimiser vector into intercept and coefficient blocks.
    fn unpack(&self, params: &[f64]) -> (f64, Coefficients) {
        let (intercept, rest) = if self.includes_intercept() {
            (params[0], &params[1..])
        } else {
            (0.0, params)
        };
        let o = &self.order;
        let (ar, rest) = rest.split_at(o.p);
        let (ma, rest) = rest.split_at(o.q);
        let (sar, sma) = rest.split_at(o.cap_p);
        (
            intercept,
            Coefficients {
                ar: ar.to_vec(),
                ma: ma.to_vec(),
                seasonal_ar: sar.to_vec(),
                seasonal_ma: sma.to_vec(),
            },
        )
    }

    fn coefficients(&self) -> Coefficients {
        Coefficients {
            ar: self.ar.clone(),
            ma: self.ma.clone(),
            seasonal_ar: self.seasonal_ar.clone(),
            seasonal_ma: self.seasonal_ma.clone(),
        }
    }

    /// Psi weights of the integrated process, `psi[0] = 1`.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let coefficients = self.coefficients();
        let ma = coefficients.expanded_ma(self.order.s);

        // φ*(B) = A(B) (1-B)^d (1-B^s)^D, stored as 1 - Σ φ*_i B^i
        let mut full: Vec<f64> = std::iter::once(1.0)
            .chain(coefficients.expanded_ar(self.order.s).iter().skip(1).map(|a| -a))
            .collect();
        for _ in 0..self.order.d {
            full = poly_mul(&full, &[1.0, -1.0]);
        }
        if self.order.s > 0 {
            let mut seasonal = vec![0.0; self.order.s + 1];
            seasonal[0] = 1.0;
            seasonal[self.order.s] = -1.0;
            for _ in 0..self.order.cap_d {
                full = poly_mul(&full, &seasonal);
            }
        }

        let mut psi = vec![0.0; horizon.max(1)];
        psi[0] = 1.0;
        for j in 1..psi.len() {
            let mut value = ma.get(j).copied().unwrap_or(0.0);
            for i in 1..=j.min(full.len() - 1) {
                value -= full[i] * psi[j - i];
            }
            psi[j] = value;
        }
        psi
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::arima(1, 1, 1)
    }
}

/// AR and MA coefficient blocks of one parameter vector.
struct Coefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    /// `a` with `w_t = Σ a_i w_{t-i} + ...`; index 0 is unused.
    fn expanded_ar(&self, s: usize) -> Vec<f64> {
        let span = self.ar.len() + s * self.seasonal_ar.len();
        let mut a = vec![0.0; span + 1];
        for (i, phi) in self.ar.iter().enumerate() {
            a[i + 1] += phi;
        }
        for (j, big_phi) in self.seasonal_ar.iter().enumerate() {
            a[s * (j + 1)] += big_phi;
            for (i, phi) in self.ar.iter().enumerate() {
                a[i + 1 + s * (j + 1)] -= phi * big_phi;
            }
        }
        a
    }

    /// `m` with `w_t = ... + e_t + Σ m_i e_{t-i}`; index 0 is unused.
    fn expanded_ma(&self, s: usize) -> Vec<f64> {
        let span = self.ma.len() + s * self.seasonal_ma.len();
        let mut m = vec![0.0; span + 1];
        for (i, theta) in self.ma.iter().enumerate() {
            m[i + 1] += theta;
        }
        for (j, big_theta) in self.seasonal_ma.iter().enumerate() {
            m[s * (j + 1)] += big_theta;
            for (i, theta) in self.ma.iter().enumerate() {
                m[i + 1 + s * (j + 1)] += theta * big_theta;
            }
        }
        m
    }
}

/// One-step prediction of `w[t]` from its past and past innovations.
fn one_step(w: &[f64], e: &[f64], t: usize, mu: f64, a: &[f64], m: &[f64]) -> f64 {
    let ar: f64 = (1..a.len()).map(|i| a[i] * (w[t - i] - mu)).sum();
    let ma: f64 = (1..m.len().min(t + 1)).map(|i| m[i] * e[t - i]).sum();
    mu + ar + ma
}

/// Conditional innovations from `start`; earlier entries stay zero.
fn innovations(w: &[f64], start: usize, mu: f64, a: &[f64], m: &[f64]) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        e[t] = w[t] - one_step(w, &e, t, mu, a, m);
    }
    e
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.validate_order()?;
        let values = series.primary_values();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        let order = self.order;
        let start = order.ar_span();
        let needed = order.differencing_loss() + start.max(order.ma_span()) + 2;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let w = difference(&seasonal_difference(values, order.cap_d, order.s), order.d);

        let with_intercept = self.includes_intercept();
        let mut initial = Vec::with_capacity(order.num_coefficients() + 1);
        let mut bounds = Vec::with_capacity(initial.capacity());
        if with_intercept {
            initial.push(mean(&w));
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for block in [order.p, order.q, order.cap_p, order.cap_q] {
            for i in 0..block {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
            }
        }

        let s = order.s;
        let css = |params: &[f64]| {
            let (mu, coefficients) = self.unpack(params);
            let a = coefficients.expanded_ar(s);
            let m = coefficients.expanded_ma(s);
            innovations(&w, start, mu, &a, &m)
                .iter()
                .map(|e| e * e)
                .sum::<f64>()
        };

        let best = if order.num_coefficients() == 0 {
            initial
        } else {
            nelder_mead(css, &initial, Some(&bounds), NelderMeadConfig::default()).optimal_point
        };

        let (intercept, coefficients) = self.unpack(&best);
        let a = coefficients.expanded_ar(s);
        let m = coefficients.expanded_ma(s);
        let e = innovations(&w, start, intercept, &a, &m);

        let n_eff = (w.len() - start) as f64;
        let sse: f64 = e.iter().map(|x| x * x).sum();
        let sigma_sq = sse / n_eff;
        let k = (order.num_coefficients() + usize::from(with_intercept) + 1) as f64;
        let log_likelihood =
            -0.5 * n_eff * (1.0 + (2.0 * std::f64::consts::PI * sigma_sq.max(MIN_VARIANCE)).ln());

        let offset = order.differencing_loss();
        let mut fitted = vec![f64::NAN; values.len()];
        let mut residuals = vec![0.0; values.len()];
        for t in start..w.len() {
            residuals[offset + t] = e[t];
            fitted[offset + t] = values[offset + t] - e[t];
        }

        self.intercept = intercept;
        self.ar = coefficients.ar;
        self.ma = coefficients.ma;
        self.seasonal_ar = coefficients.seasonal_ar;
        self.seasonal_ma = coefficients.seasonal_ma;
        self.original = Some(values.to_vec());
        self.differenced = w;
        self.innovations = e;
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.residual_variance = Some(sigma_sq);
        self.aic = Some(-2.0 * log_likelihood + 2.0 * k);
        self.bic = Some(-2.0 * log_likelihood + k * n_eff.ln());

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(ForecastError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let order = self.order;
        let coefficients = self.coefficients();
        let a = coefficients.expanded_ar(order.s);
        let m = coefficients.expanded_ma(order.s);

        let mut w = self.differenced.clone();
        let mut e = self.innovations.clone();
        let observed = w.len();
        for _ in 0..horizon {
            let t = w.len();
            let next = one_step(&w, &e, t, self.intercept, &a, &m);
            w.push(next);
            e.push(0.0);
        }

        let seasonal_history = seasonal_difference(original, order.cap_d, order.s);
        let regular = integrate(&w[observed..], &seasonal_history, order.d);
        let values = seasonal_integrate(&regular, original, order.cap_d, order.s);

        Ok(Forecast::from_values(values))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if level <= 0.0 || level >= 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must lie in (0, 1), got {}",
                level
            )));
        }
        let forecast = self.predict(horizon)?;
        let sigma_sq = self.residual_variance.ok_or(ForecastError::FitRequired)?;
        let z = quantile_normal((1.0 + level) / 2.0);

        let psi = self.psi_weights(horizon);
        let mut cumulative = 0.0;
        let (lower, upper): (Vec<f64>, Vec<f64>) = forecast
            .primary()
            .iter()
            .zip(&psi)
            .map(|(&pred, &weight)| {
                cumulative += weight * weight;
                let half_width = z * (sigma_sq * cumulative).sqrt();
                (pred - half_width, pred + half_width)
            })
            .unzip();

        Ok(Forecast::from_values_with_intervals(
            forecast.primary().to_vec(),
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
        if self.order.is_seasonal() {
            "SARIMA"
        } else {
            "ARIMA"
        }
    }
}
