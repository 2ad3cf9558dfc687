//! TimeSeries data structure for daily activity data.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// A univariate time series with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a univariate series, validating ordering and lengths.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        // Validate timestamps are strictly increasing
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Create a series with one value per calendar day starting at `start`.
    pub fn daily(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let timestamps = daily_range(start, values.len());
        Self::univariate(timestamps, values)
    }

    /// Attach a label (usually the source column name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get the observed values.
    pub fn primary_values(&self) -> &[f64] {
        &self.values
    }

    /// Last timestamp of the series.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Ordinal day of the year (1..=366) for every timestamp.
    pub fn day_of_year(&self) -> Vec<f64> {
        self.timestamps.iter().map(|t| t.ordinal() as f64).collect()
    }

    /// Same index, new values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
            label: self.label.clone(),
        })
    }

    /// Get a slice of the time series `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end || end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            label: self.label.clone(),
        })
    }

    /// Check if any value is NaN or infinite.
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Check that consecutive timestamps are exactly one day apart.
    pub fn is_daily_contiguous(&self) -> bool {
        self.timestamps
            .windows(2)
            .all(|w| w[1] - w[0] == Duration::days(1))
    }
}

/// `n` consecutive days at midnight UTC, starting at `start`.
pub fn daily_range(start: NaiveDate, n: usize) -> Vec<DateTime<Utc>> {
    let base = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default());
    (0..n).map(|i| base + Duration::days(i as i64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_daily_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    #[test]
    fn univariate_rejects_unordered_timestamps() {
        let mut timestamps = make_daily_timestamps(3);
        timestamps.swap(1, 2);
        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn univariate_rejects_length_mismatch() {
        let result = TimeSeries::univariate(make_daily_timestamps(3), vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn daily_series_is_contiguous() {
        let start = NaiveDate::from_ymd_opt(2022, 12, 30).unwrap();
        let ts = TimeSeries::daily(start, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(ts.len(), 4);
        assert!(ts.is_daily_contiguous());
        // Day of year wraps at the year boundary
        assert_eq!(ts.day_of_year(), vec![364.0, 365.0, 1.0, 2.0]);
    }

    #[test]
    fn gaps_break_contiguity() {
        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
        ];
        let ts = TimeSeries::univariate(timestamps, vec![1.0, 2.0]).unwrap();
        assert!(!ts.is_daily_contiguous());
    }

    #[test]
    fn slice_and_with_values_keep_the_index() {
        let ts = TimeSeries::univariate(make_daily_timestamps(5), vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_label("SECONDS");

        let sliced = ts.slice(1, 4).unwrap();
        assert_eq!(sliced.primary_values(), &[2.0, 3.0, 4.0]);
        assert_eq!(sliced.timestamps()[0], ts.timestamps()[1]);
        assert_eq!(sliced.label(), Some("SECONDS"));

        let doubled = ts
            .with_values(ts.primary_values().iter().map(|v| v * 2.0).collect())
            .unwrap();
        assert_eq!(doubled.timestamps(), ts.timestamps());
        assert_eq!(doubled.primary_values()[4], 10.0);

        assert!(ts.slice(3, 9).is_err());
        assert!(ts.with_values(vec![1.0]).is_err());
    }

    #[test]
    fn missing_values_are_detected() {
        let ts =
            TimeSeries::univariate(make_daily_timestamps(3), vec![1.0, f64::NAN, 3.0]).unwrap();
        assert!(ts.has_missing_values());
        assert_eq!(ts.last_timestamp(), Some(ts.timestamps()[2]));
    }
}
