//! Handling of zero-duration days.
//!
//! A day without activity is recorded as 0 seconds, which neither the log
//! transform nor multiplicative seasonality can work with. Zeros are either
//! replaced by a fixed sentinel or treated as missing, interpolated, and the
//! series moved to log scale.

use super::spline::interpolate_missing;
use crate::error::Result;

/// Replacement value (seconds) for zero days when no log transform is used.
pub const ZERO_SENTINEL_SECONDS: f64 = 3600.0;

/// Strategy for zero observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZeroHandling {
    /// Replace each zero with the given value.
    Sentinel(f64),
    /// Interpolate zeros with a cubic spline, then take the natural log.
    InterpolateLog,
}

impl Default for ZeroHandling {
    fn default() -> Self {
        ZeroHandling::Sentinel(ZERO_SENTINEL_SECONDS)
    }
}

impl ZeroHandling {
    /// Pick the strategy from the engine's log flag.
    pub fn from_flag(use_log_transform: bool, sentinel: f64) -> Self {
        if use_log_transform {
            ZeroHandling::InterpolateLog
        } else {
            ZeroHandling::Sentinel(sentinel)
        }
    }

    /// Whether values come out on log scale.
    pub fn is_log(&self) -> bool {
        matches!(self, ZeroHandling::InterpolateLog)
    }

    /// Transform raw values.
    ///
    /// With `InterpolateLog`, leading zeros stay missing (NaN) after the
    /// transform.
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>> {
        match *self {
            ZeroHandling::Sentinel(sentinel) => Ok(values
                .iter()
                .map(|&v| if v == 0.0 { sentinel } else { v })
                .collect()),
            ZeroHandling::InterpolateLog => {
                let gapped: Vec<f64> = values
                    .iter()
                    .map(|&v| if v == 0.0 { f64::NAN } else { v })
                    .collect();
                let filled = interpolate_missing(&gapped)?;
                Ok(filled.into_iter().map(f64::ln).collect())
            }
        }
    }

    /// Map one transformed value back to seconds.
    pub fn invert(&self, value: f64) -> f64 {
        match self {
            ZeroHandling::Sentinel(_) => value,
            ZeroHandling::InterpolateLog => value.exp(),
        }
    }
}
