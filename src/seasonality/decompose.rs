//! Classical additive decomposition with a centred moving-average trend.

use crate::error::{ForecastError, Result};

/// Result of an additive decomposition `x = trend + seasonal + residual`.
///
/// The trend and residual are undefined (`None`) over half a window at both
/// ends of the series.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
    pub period: usize,
}

impl Decomposition {
    /// The defined trend values with their positions.
    pub fn defined_trend(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.trend
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.map(|v| (i, v)))
    }

    /// One cycle of the seasonal component.
    pub fn seasonal_cycle(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }

    /// Strength of seasonality (0 to 1) over the defined positions.
    pub fn seasonal_strength(&self) -> f64 {
        let (residual, detrended): (Vec<f64>, Vec<f64>) = self
            .residual
            .iter()
            .zip(&self.seasonal)
            .filter_map(|(r, s)| r.map(|r| (r, r + s)))
            .unzip();
        let var_sr = population_variance(&detrended);
        if var_sr < 1e-10 {
            return 0.0;
        }
        (1.0 - population_variance(&residual) / var_sr).max(0.0)
    }
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Centred moving-average weights for a seasonal period.
///
/// Odd periods average `period` points; even periods use `period + 1`
/// points with half weight at both ends.
pub fn moving_average_weights(period: usize) -> Vec<f64> {
    let p = period as f64;
    if period % 2 == 1 {
        vec![1.0 / p; period]
    } else {
        let mut weights = vec![1.0 / p; period + 1];
        weights[0] = 0.5 / p;
        weights[period] = 0.5 / p;
        weights
    }
}

/// Decompose `values` additively with the given seasonal period.
///
/// Requires at least two full cycles and finite input.
pub fn decompose(values: &[f64], period: usize) -> Result<Decomposition> {
    if period == 0 {
        return Err(ForecastError::InvalidParameter(
            "period must be at least 1".to_string(),
        ));
    }
    let n = values.len();
    if n < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: n,
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }

    let weights = moving_average_weights(period);
    let half = weights.len() / 2;

    let trend: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let window = &values[i - half..=i + half];
            Some(window.iter().zip(&weights).map(|(x, w)| x * w).sum())
        })
        .collect();

    // Per-phase mean of the detrended series
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, t) in trend.iter().enumerate() {
        if let Some(t) = t {
            sums[i % period] += values[i] - t;
            counts[i % period] += 1;
        }
    }
    let mut cycle: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let centre = cycle.iter().sum::<f64>() / period as f64;
    cycle.iter_mut().for_each(|s| *s -= centre);

    let seasonal: Vec<f64> = (0..n).map(|i| cycle[i % period]).collect();
    let residual = trend
        .iter()
        .enumerate()
        .map(|(i, t)| t.map(|t| values[i] - t - seasonal[i]))
        .collect();

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
        period,
    })
}
