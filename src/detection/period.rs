//! Dominant period detection from the raw autocorrelation sequence.

use crate::utils::pearson_correlation;
use tracing::{debug, info};

/// Default minimum correlation between the series and its lagged copy.
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.2;

/// Detected period and the lagged self-correlation that supports it.
///
/// A period of 1 means no seasonality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodEstimate {
    pub period: usize,
    pub correlation: f64,
}

impl PeriodEstimate {
    /// The "no seasonality" estimate.
    pub fn none(correlation: f64) -> Self {
        Self {
            period: 1,
            correlation,
        }
    }

    pub fn is_seasonal(&self) -> bool {
        self.period > 1
    }
}

/// Autocorrelation-peak period detector.
///
/// Candidate periods are the local maxima of the non-normalised,
/// non-demeaned autocorrelation `Σ x[i]·x[i+k]`. The strongest candidate is
/// accepted when the Pearson correlation of the series with itself shifted
/// by that lag reaches the threshold.
#[derive(Debug, Clone)]
pub struct PeriodDetector {
    /// Minimum lagged correlation for a period to be accepted.
    pub correlation_threshold: f64,
    /// A candidate lag must fit at least this many times into the series.
    pub min_cycles: usize,
}

impl Default for PeriodDetector {
    fn default() -> Self {
        Self {
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            min_cycles: 2,
        }
    }
}

impl PeriodDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the correlation threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }

    /// Set the minimum number of full cycles (1 disables the check).
    pub fn with_min_cycles(mut self, min_cycles: usize) -> Self {
        self.min_cycles = min_cycles.max(1);
        self
    }

    /// Detect the dominant period of `values`.
    pub fn detect(&self, values: &[f64]) -> PeriodEstimate {
        let n = values.len();
        let acf = raw_autocorrelation(values);

        let candidates: Vec<usize> = autocorrelation_peaks(&acf)
            .into_iter()
            .filter(|&lag| lag * self.min_cycles <= n)
            .collect();
        debug!(candidates = ?candidates, "autocorrelation peaks");

        // First lag with the largest autocorrelation
        let mut best: Option<usize> = None;
        for &lag in &candidates {
            if best.map_or(true, |b| acf[lag] > acf[b]) {
                best = Some(lag);
            }
        }

        let Some(period) = best else {
            info!("no seasonality found");
            return PeriodEstimate::none(0.0);
        };

        let correlation = pearson_correlation(&values[period..], &values[..n - period]);
        debug!(period, correlation, "candidate period");

        if period == 1 || !correlation.is_finite() || correlation < self.correlation_threshold {
            info!(
                period,
                correlation,
                threshold = self.correlation_threshold,
                "no seasonality found"
            );
            return PeriodEstimate::none(correlation);
        }

        info!(period, correlation, "detected seasonal period");
        PeriodEstimate {
            period,
            correlation,
        }
    }
}

/// Detect the dominant period with the default detector and a custom
/// correlation threshold.
pub fn detect_period(values: &[f64], correlation_threshold: f64) -> PeriodEstimate {
    PeriodDetector::default()
        .with_threshold(correlation_threshold)
        .detect(values)
}

/// `acf[k] = Σ_i x[i]·x[i+k]` for every lag `k` in `0..n`.
pub fn raw_autocorrelation(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|k| {
            values[..n - k]
                .iter()
                .zip(&values[k..])
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Lags where the autocorrelation changes from rising to falling (or
/// flattening).
fn autocorrelation_peaks(acf: &[f64]) -> Vec<usize> {
    let slope: Vec<i8> = acf.windows(2).map(|w| sign(w[1] - w[0])).collect();
    slope
        .windows(2)
        .enumerate()
        .filter(|(_, s)| s[1] - s[0] < 0)
        .map(|(k, _)| k + 1)
        .collect()
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn noisy_sine(n: usize, period: usize, noise: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|t| {
                (2.0 * PI * t as f64 / period as f64).sin() + noise * rng.gen_range(-1.0..1.0)
            })
            .collect()
    }

    #[test]
    fn raw_autocorrelation_is_not_normalised() {
        let acf = raw_autocorrelation(&[1.0, 2.0, 3.0]);
        assert_eq!(acf, vec![14.0, 8.0, 3.0]);
    }

    #[test]
    fn constant_series_has_no_period() {
        let estimate = PeriodDetector::default().detect(&[5.0; 50]);
        assert_eq!(estimate, PeriodEstimate::none(0.0));
        assert!(!estimate.is_seasonal());
    }

    #[test]
    fn all_zero_series_has_no_period() {
        let estimate = detect_period(&[0.0; 30], 0.2);
        assert_eq!(estimate.period, 1);
    }

    #[test]
    fn detects_weekly_sine() {
        let values = noisy_sine(140, 7, 0.1, 7);
        let estimate = detect_period(&values, DEFAULT_CORRELATION_THRESHOLD);
        assert_eq!(estimate.period, 7);
        assert!(estimate.correlation > 0.8);
    }

    #[test]
    fn detects_longer_periods() {
        let values = noisy_sine(120, 12, 0.05, 12);
        assert_eq!(PeriodDetector::new().detect(&values).period, 12);
    }

    #[test]
    fn white_noise_has_no_period() {
        let mut rng = StdRng::seed_from_u64(42);
        let values: Vec<f64> = (0..1000).map(|_| rng.gen_range(-1.0..1.0)).collect();
        assert_eq!(PeriodDetector::new().detect(&values).period, 1);
    }

    #[test]
    fn min_cycles_limits_candidate_lags() {
        // A single bump pattern repeated once: the only peak lies past n/2
        let values = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(PeriodDetector::new().detect(&values).period, 1);

        let unrestricted = PeriodDetector::new().with_min_cycles(1).detect(&values);
        assert_eq!(unrestricted.period, 7);
        assert_relative_eq!(unrestricted.correlation, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn weak_correlation_is_rejected() {
        let values = noisy_sine(140, 7, 0.1, 3);
        let estimate = detect_period(&values, 1.1);
        assert_eq!(estimate.period, 1);
        assert!(estimate.correlation > 0.8);
    }
}
