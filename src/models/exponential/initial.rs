//! Initial state estimation for seeded exponential smoothing.
//!
//! The series is decomposed classically, the trend component is regressed
//! on the day of the year, and each seasonal factor is the average ratio of
//! the series to that regression line at its phase.

use crate::core::TimeSeries;
use crate::error::Result;
use crate::seasonality::decompose;
use crate::transform::{ZeroHandling, ZERO_SENTINEL_SECONDS};
use crate::utils::{finite_mean, ols_fit};
use tracing::{debug, info};

/// Seed values for Holt / Holt-Winters.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialParameters {
    pub period: usize,
    /// Intercept of the trend regression.
    pub level: f64,
    /// Slope of the trend regression, per day of year.
    pub trend: f64,
    /// One multiplicative factor per phase; `[1.0]` without seasonality.
    pub seasonal: Vec<f64>,
    /// Share of the detrended variance explained by the seasonal component.
    pub seasonal_strength: f64,
}

/// Estimate initial parameters, replacing zeros with the default sentinel or
/// interpolating them on log scale.
pub fn estimate_initial_params(
    series: &TimeSeries,
    period: usize,
    use_log_transform: bool,
) -> Result<InitialParameters> {
    let handling = ZeroHandling::from_flag(use_log_transform, ZERO_SENTINEL_SECONDS);
    estimate_with_handling(series, period, handling)
}

/// Estimate initial parameters with an explicit zero-handling strategy.
pub fn estimate_with_handling(
    series: &TimeSeries,
    period: usize,
    handling: ZeroHandling,
) -> Result<InitialParameters> {
    let values = handling.apply(series.primary_values())?;
    let decomposition = decompose(&values, period)?;
    let seasonal_strength = decomposition.seasonal_strength();
    debug!(cycle = ?decomposition.seasonal_cycle(), "additive seasonal cycle");
    let day_of_year = series.day_of_year();

    let (xs, ys): (Vec<f64>, Vec<f64>) = decomposition
        .defined_trend()
        .map(|(i, t)| (day_of_year[i], t))
        .unzip();
    let regression = ols_fit(&ys, &[&xs])?;
    let level = regression.intercept;
    let trend = regression.slope().unwrap_or(0.0);

    let seasonal = if period == 1 {
        vec![1.0]
    } else {
        let factors: Vec<f64> = values
            .iter()
            .zip(&day_of_year)
            .map(|(y, doy)| y / (level + trend * doy))
            .collect();
        (0..period)
            .map(|phase| finite_mean(factors[phase..].iter().step_by(period).copied()))
            .collect()
    };

    info!(
        period,
        level,
        trend,
        seasonal = ?seasonal,
        seasonal_strength,
        log = handling.is_log(),
        "initial smoothing parameters"
    );

    Ok(InitialParameters {
        period,
        level,
        trend,
        seasonal,
        seasonal_strength,
    })
}
