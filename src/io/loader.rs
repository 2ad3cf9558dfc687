//! CSV loader producing a contiguous daily series.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Which columns to read and which rows to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub date_column: String,
    pub value_column: String,
    /// Keep only rows dated strictly after this day.
    pub start_after: Option<NaiveDate>,
}

impl LoaderConfig {
    /// Read `value_column` against the `DATE` column.
    pub fn new(value_column: impl Into<String>) -> Self {
        Self {
            date_column: "DATE".to_string(),
            value_column: value_column.into(),
            start_after: None,
        }
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    pub fn with_start_after(mut self, date: NaiveDate) -> Self {
        self.start_after = Some(date);
        self
    }
}

/// Load a daily series from a CSV file.
///
/// See [`read_daily_csv`] for the parsing rules.
pub fn load_daily_csv(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<TimeSeries> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading series");
    let file = File::open(path)?;
    read_daily_csv(BufReader::new(file), config)
}

/// Read a daily series from CSV data.
///
/// Rows on or before `start_after` are dropped. The remaining dates are
/// reindexed onto every calendar day between the first and the last one,
/// with missing days filled with 0.
pub fn read_daily_csv<R: Read>(input: R, config: &LoaderConfig) -> Result<TimeSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ForecastError::DataLoad(format!("column '{}' not found", name)))
    };
    let date_idx = position(&config.date_column)?;
    let value_idx = position(&config.value_column)?;

    let mut observations = BTreeMap::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = row + 2;

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| {
            ForecastError::DataLoad(format!("line {}: unparseable date '{}'", line, raw_date))
        })?;
        if config.start_after.is_some_and(|after| date <= after) {
            continue;
        }

        let raw_value = record.get(value_idx).unwrap_or_default();
        let value: f64 = raw_value.parse().map_err(|_| {
            ForecastError::DataLoad(format!("line {}: unparseable value '{}'", line, raw_value))
        })?;

        if observations.insert(date, value).is_some() {
            return Err(ForecastError::TimestampError(format!(
                "duplicate date {}",
                date
            )));
        }
    }

    let (first, last) = match (observations.keys().next(), observations.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(ForecastError::EmptyData),
    };

    let days = (last - first).num_days() as usize + 1;
    let values: Vec<f64> = (0..days)
        .map(|i| {
            let day = first + Duration::days(i as i64);
            observations.get(&day).copied().unwrap_or(0.0)
        })
        .collect();

    info!(
        column = %config.value_column,
        %first,
        %last,
        filled = days - observations.len(),
        "loaded daily series"
    );
    Ok(TimeSeries::daily(first, values)?.with_label(config.value_column.clone()))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn gaps_are_filled_with_zero() {
        let data = "DATE,SECONDS,OTHER\n\
                    2022-08-11,3600,1\n\
                    2022-08-13,7200,2\n\
                    2022-08-14,1800,3\n";
        let series = read_daily_csv(data.as_bytes(), &LoaderConfig::new("SECONDS")).unwrap();

        assert_eq!(series.primary_values(), &[3600.0, 0.0, 7200.0, 1800.0]);
        assert_eq!(series.label(), Some("SECONDS"));
        assert_eq!(series.timestamps()[0].date_naive(), date(2022, 8, 11));
        assert!(series.is_daily_contiguous());
    }

    #[test]
    fn rows_are_sorted_and_filtered_by_start_date() {
        let data = "DATE,SECONDS\n\
                    2022-08-12,20\n\
                    2022-08-09,5\n\
                    2022-08-10,10\n\
                    2022-08-11,15\n";
        let config = LoaderConfig::new("SECONDS").with_start_after(date(2022, 8, 10));
        let series = read_daily_csv(data.as_bytes(), &config).unwrap();

        assert_eq!(series.primary_values(), &[15.0, 20.0]);
        assert_eq!(series.timestamps()[0].date_naive(), date(2022, 8, 11));
    }

    #[test]
    fn accepts_timestamp_formats() {
        let data = "day,v\n\
                    2023-01-01 00:00:00,1\n\
                    2023-01-02T00:00:00Z,2\n\
                    2023-01-03,3\n";
        let config = LoaderConfig::new("v").with_date_column("day");
        let series = read_daily_csv(data.as_bytes(), &config).unwrap();
        assert_eq!(series.primary_values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn rejects_bad_input() {
        let config = LoaderConfig::new("SECONDS");

        let duplicate = "DATE,SECONDS\n2022-01-01,1\n2022-01-01,2\n";
        assert!(matches!(
            read_daily_csv(duplicate.as_bytes(), &config),
            Err(ForecastError::TimestampError(_))
        ));

        let bad_value = "DATE,SECONDS\n2022-01-01,abc\n";
        assert!(matches!(
            read_daily_csv(bad_value.as_bytes(), &config),
            Err(ForecastError::DataLoad(_))
        ));

        let missing_column = "DATE,OTHER\n2022-01-01,1\n";
        assert!(matches!(
            read_daily_csv(missing_column.as_bytes(), &config),
            Err(ForecastError::DataLoad(_))
        ));

        let filtered = "DATE,SECONDS\n2022-01-01,1\n";
        let late = config.clone().with_start_after(date(2022, 6, 1));
        assert_eq!(
            read_daily_csv(filtered.as_bytes(), &late),
            Err(ForecastError::EmptyData)
        );
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = load_daily_csv("/nonexistent/daily_total.csv", &LoaderConfig::new("SECONDS"));
        assert!(matches!(result, Err(ForecastError::DataLoad(_))));
    }
}
