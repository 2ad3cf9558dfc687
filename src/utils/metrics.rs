//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Error summary of a set of forecasts against observations.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Number of compared points
    pub count: usize,
}

impl AccuracyMetrics {
    /// Rescale both error measures, e.g. seconds to hours.
    pub fn scaled(&self, divisor: f64) -> Self {
        Self {
            mae: self.mae / divisor,
            rmse: self.rmse / divisor,
            count: self.count,
        }
    }
}

/// Calculate accuracy metrics between actual and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    Ok(summarise(actual.iter().copied().zip(predicted.iter().copied())))
}

/// Metrics over the positions where both columns hold a value.
///
/// Returns `None` when no position is comparable.
pub fn paired_metrics(actual: &[Option<f64>], predicted: &[Option<f64>]) -> Option<AccuracyMetrics> {
    let pairs: Vec<(f64, f64)> = actual
        .iter()
        .zip(predicted)
        .filter_map(|(a, p)| Some(((*a)?, (*p)?)))
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(summarise(pairs.into_iter()))
    }
}

fn summarise(pairs: impl Iterator<Item = (f64, f64)>) -> AccuracyMetrics {
    let (abs_sum, sq_sum, count) = pairs.fold((0.0, 0.0, 0usize), |(abs, sq, n), (a, p)| {
        let err = a - p;
        (abs + err.abs(), sq + err * err, n + 1)
    });
    let n = count as f64;
    AccuracyMetrics {
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        count,
    }
}
