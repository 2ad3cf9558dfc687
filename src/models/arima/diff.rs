//! Regular and seasonal differencing, their inverses, and order selection.

use super::stationarity::adf_test;
use crate::utils::variance;

/// Difference `series` `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` rounds of lag-`period` differencing.
///
/// Stops early once the series is no longer than the period.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = result[period..]
            .iter()
            .zip(&result)
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Undo `d` rounds of regular differencing on a forecast continuation.
///
/// `history` is the series the differences were taken from; its tail seeds
/// each cumulative sum.
pub fn integrate(differenced: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let seed = difference(history, level).last().copied().unwrap_or(0.0);
        result = result
            .iter()
            .scan(seed, |acc, step| {
                *acc += step;
                Some(*acc)
            })
            .collect();
    }
    result
}

/// Undo `d` rounds of seasonal differencing on a forecast continuation.
///
/// Each level runs `y_t = u_t + y_{t-period}` over the level's own history
/// extended by the values produced so far.
pub fn seasonal_integrate(differenced: &[f64], history: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return differenced.to_vec();
    }
    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let mut extended = seasonal_difference(history, level, period);
        let offset = extended.len();
        if offset < period {
            break;
        }
        for &u in &result {
            let prior = extended[extended.len() - period];
            extended.push(u + prior);
        }
        result = extended.split_off(offset);
    }
    result
}

/// Seasonal differencing order from the variance-ratio rule.
///
/// Returns 1 when lag-`period` differencing shrinks the variance below 70%
/// of the original, 0 otherwise (or when fewer than two cycles exist).
pub fn nsdiffs(series: &[f64], period: usize) -> usize {
    if period < 2 || series.len() < 2 * period {
        return 0;
    }
    let original = variance(series);
    let differenced = variance(&seasonal_difference(series, 1, period));
    usize::from(differenced < original * 0.7)
}

/// Regular differencing order from repeated ADF tests at the 5% level.
///
/// A constant series needs no differencing.
pub fn ndiffs(series: &[f64], max_d: usize) -> usize {
    let mut current = series.to_vec();
    for d in 0..max_d {
        if current.len() < 8 || is_constant(&current) {
            return d;
        }
        if adf_test(&current, None).is_stationary {
            return d;
        }
        current = difference(&current, 1);
    }
    max_d
}

fn is_constant(series: &[f64]) -> bool {
    let scale = series.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);
    variance(series) <= (1e-10 * scale).powi(2)
}
