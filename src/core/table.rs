//! Forecast table: an observed series aligned with a forecast column.

use crate::core::{daily_range, Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};

/// One row of a [`ForecastTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: DateTime<Utc>,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// Observed values and forecasts on a shared contiguous daily index.
///
/// Rows before the forecast starts have no forecast; rows after the last
/// observation have no actual value.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    label: String,
    dates: Vec<DateTime<Utc>>,
    actual: Vec<Option<f64>>,
    forecast: Vec<Option<f64>>,
    lower: Option<Vec<Option<f64>>>,
    upper: Option<Vec<Option<f64>>>,
}

impl ForecastTable {
    /// In-sample fitted values followed by an out-of-sample forecast.
    ///
    /// The index runs from the first observation through `forecast.horizon()`
    /// days past the last one.
    pub fn from_fitted(series: &TimeSeries, fitted: &[f64], forecast: &Forecast) -> Result<Self> {
        if fitted.len() != series.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: series.len(),
                got: fitted.len(),
            });
        }
        let start = series.timestamps().first().ok_or(ForecastError::EmptyData)?;
        let total = series.len() + forecast.horizon();

        let mut actual: Vec<Option<f64>> = series.primary_values().iter().map(|&v| Some(v)).collect();
        actual.resize(total, None);

        let forecast_column = fitted
            .iter()
            .chain(forecast.primary())
            .map(|&v| Some(v))
            .collect();

        Ok(Self {
            label: series_label(series),
            dates: daily_range(start.date_naive(), total),
            actual,
            forecast: forecast_column,
            lower: None,
            upper: None,
        })
    }

    /// Outer join of a series with a forecast whose first step falls on
    /// `first_date`.
    ///
    /// The series must be contiguous daily and `first_date` must not precede
    /// the first observation.
    pub fn overlay(series: &TimeSeries, forecast: &Forecast, first_date: DateTime<Utc>) -> Result<Self> {
        if !series.is_daily_contiguous() {
            return Err(ForecastError::TimestampError(
                "forecast tables need a contiguous daily index".to_string(),
            ));
        }
        let start = *series.timestamps().first().ok_or(ForecastError::EmptyData)?;
        let offset = (first_date - start).num_days();
        if offset < 0 || start + Duration::days(offset) != first_date {
            return Err(ForecastError::TimestampError(format!(
                "forecast start {} is not a day on or after {}",
                first_date, start
            )));
        }
        let offset = offset as usize;
        let total = series.len().max(offset + forecast.horizon());

        let mut actual: Vec<Option<f64>> = series.primary_values().iter().map(|&v| Some(v)).collect();
        actual.resize(total, None);

        let place = |values: &[f64]| {
            let mut column = vec![None; total];
            for (i, &v) in values.iter().enumerate() {
                column[offset + i] = Some(v);
            }
            column
        };

        Ok(Self {
            label: series_label(series),
            dates: daily_range(start.date_naive(), total),
            actual,
            forecast: place(forecast.primary()),
            lower: forecast.lower().map(place),
            upper: forecast.upper().map(place),
        })
    }

    /// Name of the observed column.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    pub fn actual(&self) -> &[Option<f64>] {
        &self.actual
    }

    pub fn forecast(&self) -> &[Option<f64>] {
        &self.forecast
    }

    pub fn lower(&self) -> Option<&[Option<f64>]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[Option<f64>]> {
        self.upper.as_deref()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Row `i` of the table.
    pub fn row(&self, i: usize) -> Option<ForecastRow> {
        let date = *self.dates.get(i)?;
        Some(ForecastRow {
            date,
            actual: self.actual[i],
            forecast: self.forecast[i],
            lower: self.lower.as_ref().and_then(|l| l[i]),
            upper: self.upper.as_ref().and_then(|u| u[i]),
        })
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = ForecastRow> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// The last `n` rows (or all of them).
    pub fn tail(&self, n: usize) -> ForecastTable {
        let start = self.len().saturating_sub(n);
        ForecastTable {
            label: self.label.clone(),
            dates: self.dates[start..].to_vec(),
            actual: self.actual[start..].to_vec(),
            forecast: self.forecast[start..].to_vec(),
            lower: self.lower.as_ref().map(|l| l[start..].to_vec()),
            upper: self.upper.as_ref().map(|u| u[start..].to_vec()),
        }
    }

    /// Apply `f` to every present value of every column.
    pub fn map_values(mut self, f: impl Fn(f64) -> f64) -> Self {
        let apply = |column: &mut Vec<Option<f64>>| {
            for v in column.iter_mut() {
                *v = v.map(&f);
            }
        };
        apply(&mut self.actual);
        apply(&mut self.forecast);
        if let Some(lower) = self.lower.as_mut() {
            apply(lower);
        }
        if let Some(upper) = self.upper.as_mut() {
            apply(upper);
        }
        self
    }
}

fn series_label(series: &TimeSeries) -> String {
    series.label().unwrap_or("value").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_series(n: usize) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        TimeSeries::daily(start, (0..n).map(|i| i as f64).collect())
            .unwrap()
            .with_label("SECONDS")
    }

    #[test]
    fn from_fitted_extends_the_index_by_the_horizon() {
        let ts = make_series(10);
        let fitted: Vec<f64> = (0..10).map(|i| i as f64 + 0.5).collect();
        let forecast = Forecast::from_values(vec![10.0, 11.0, 12.0]);

        let table = ForecastTable::from_fitted(&ts, &fitted, &forecast).unwrap();

        assert_eq!(table.len(), 13);
        assert_eq!(table.label(), "SECONDS");
        assert_eq!(table.actual()[9], Some(9.0));
        assert_eq!(table.actual()[10], None);
        assert_eq!(table.forecast()[0], Some(0.5));
        assert_eq!(table.forecast()[12], Some(12.0));
        assert_eq!(
            table.dates()[12].date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
        );
    }

    #[test]
    fn from_fitted_checks_lengths() {
        let ts = make_series(5);
        let result = ForecastTable::from_fitted(&ts, &[1.0], &Forecast::new());
        assert!(matches!(result, Err(ForecastError::DimensionMismatch { .. })));
    }

    #[test]
    fn overlay_places_forecast_on_the_validation_tail() {
        let ts = make_series(20);
        let forecast = Forecast::from_values_with_intervals(
            vec![1.0; 14],
            vec![0.0; 14],
            vec![2.0; 14],
        );
        // Forecast starts 6 days before the last observation
        let first = ts.timestamps()[19] - Duration::days(6);

        let table = ForecastTable::overlay(&ts, &forecast, first).unwrap();

        assert_eq!(table.len(), 27);
        assert_eq!(table.forecast()[12], None);
        assert_eq!(table.forecast()[13], Some(1.0));
        assert_eq!(table.forecast()[26], Some(1.0));
        assert_eq!(table.actual()[19], Some(19.0));
        assert_eq!(table.actual()[20], None);
        assert!(table.has_intervals());
        assert_eq!(table.row(13).unwrap().lower, Some(0.0));
        assert_eq!(table.row(0).unwrap().upper, None);
    }

    #[test]
    fn overlay_rejects_forecasts_before_the_series() {
        let ts = make_series(5);
        let first = ts.timestamps()[0] - Duration::days(1);
        assert!(ForecastTable::overlay(&ts, &Forecast::from_values(vec![1.0]), first).is_err());
    }

    #[test]
    fn tail_and_map_values() {
        let ts = make_series(4);
        let table = ForecastTable::from_fitted(
            &ts,
            &[1.0, 1.0, 1.0, 1.0],
            &Forecast::from_values(vec![2.0]),
        )
        .unwrap()
        .map_values(|v| v * 10.0);

        let tail = table.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.actual(), &[Some(30.0), None]);
        assert_eq!(tail.forecast(), &[Some(10.0), Some(20.0)]);
        assert_eq!(table.tail(100).len(), 5);
        assert_eq!(table.rows().count(), 5);
    }
}
