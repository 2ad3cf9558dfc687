//! Hold-out accuracy and tabular reports for forecast tables.

use std::fmt;
use std::io::Write;

use crate::core::{ForecastRow, ForecastTable};
use crate::error::Result;
use crate::utils::paired_metrics;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Rows of the table considered by the default hold-out check.
pub const DEFAULT_WINDOW: usize = 66;

/// Share of the window used as the test slice.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Mean absolute error in hours over the tail of the table.
///
/// Takes the last `window` rows, then the last `⌊len · test_fraction⌋` of
/// those, and averages `|actual - forecast|` over rows holding both.
/// Returns `None` when no row is comparable.
pub fn holdout_mae_hours(table: &ForecastTable, window: usize, test_fraction: f64) -> Option<f64> {
    let recent = table.tail(window);
    let test_size = (recent.len() as f64 * test_fraction).floor() as usize;
    let test = recent.tail(test_size);
    paired_metrics(test.actual(), test.forecast()).map(|m| m.scaled(SECONDS_PER_HOUR).mae)
}

/// Summary of one engine's forecast, in hours.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub engine: String,
    pub label: String,
    /// Trailing table rows converted to hours.
    pub rows: Vec<ForecastRow>,
    pub mae_hours: Option<f64>,
}

impl ComparisonReport {
    /// Report the last `tail` rows and the default hold-out MAE.
    pub fn new(engine: impl Into<String>, table: &ForecastTable, tail: usize) -> Self {
        let hours = |v: Option<f64>| v.map(|x| x / SECONDS_PER_HOUR);
        let rows = table
            .tail(tail)
            .rows()
            .map(|row| ForecastRow {
                actual: hours(row.actual),
                forecast: hours(row.forecast),
                lower: hours(row.lower),
                upper: hours(row.upper),
                ..row
            })
            .collect();

        Self {
            engine: engine.into(),
            label: table.label().to_string(),
            rows,
            mae_hours: holdout_mae_hours(table, DEFAULT_WINDOW, DEFAULT_TEST_FRACTION),
        }
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{:.2}", x));

        writeln!(f, "{} forecast of {} (hours)", self.engine, self.label)?;
        writeln!(
            f,
            "{:<12}{:>10}{:>10}{:>10}{:>10}",
            "date", "actual", "forecast", "lower", "upper"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<12}{:>10}{:>10}{:>10}{:>10}",
                row.date.format("%Y-%m-%d").to_string(),
                cell(row.actual),
                cell(row.forecast),
                cell(row.lower),
                cell(row.upper),
            )?;
        }
        match self.mae_hours {
            Some(mae) => write!(f, "hold-out MAE: {:.3} h", mae),
            None => write!(f, "hold-out MAE: n/a"),
        }
    }
}

/// Write the table as `date,actual,forecast` plus `lower,upper` when the
/// table carries intervals. Absent values are empty fields.
pub fn write_csv<W: Write>(table: &ForecastTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let intervals = table.has_intervals();

    let mut header = vec!["date", "actual", "forecast"];
    if intervals {
        header.extend(["lower", "upper"]);
    }
    out.write_record(&header)?;

    let field = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for row in table.rows() {
        let mut record = vec![
            row.date.format("%Y-%m-%d").to_string(),
            field(row.actual),
            field(row.forecast),
        ];
        if intervals {
            record.push(field(row.lower));
            record.push(field(row.upper));
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Forecast, TimeSeries};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn table(n: usize, error: f64, horizon: usize) -> ForecastTable {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let series = TimeSeries::daily(start, vec![7200.0; n])
            .unwrap()
            .with_label("SECONDS");
        let fitted = vec![7200.0 + error; n];
        ForecastTable::from_fitted(&series, &fitted, &Forecast::from_values(vec![7200.0; horizon]))
            .unwrap()
    }

    #[test]
    fn mae_uses_the_tail_of_the_window() {
        // 66 rows -> 13 test rows, of which 7 have actual values
        let t = table(60, 1800.0, 6);
        assert_relative_eq!(holdout_mae_hours(&t, 66, 0.2).unwrap(), 0.5);
    }

    #[test]
    fn mae_is_none_without_overlap() {
        // 10 rows -> 2 test rows, both past the data
        let t = table(5, 3600.0, 5);
        assert_eq!(holdout_mae_hours(&t, 66, 0.2), None);
        assert_eq!(holdout_mae_hours(&t, 66, 0.0), None);
    }

    #[test]
    fn report_converts_to_hours() {
        let t = table(20, 0.0, 3);
        let report = ComparisonReport::new("HoltWinters", &t, 4);

        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.rows[0].actual, Some(2.0));
        assert_eq!(report.rows[3].actual, None);
        assert_eq!(report.rows[3].forecast, Some(2.0));
        assert_eq!(report.mae_hours, Some(0.0));

        let text = report.to_string();
        assert!(text.starts_with("HoltWinters forecast of SECONDS"));
        assert!(text.contains("2024-03-26"));
        assert!(text.ends_with("hold-out MAE: 0.000 h"));
    }

    #[test]
    fn csv_export_without_intervals() {
        let t = table(2, 0.0, 1);
        let mut buffer = Vec::new();
        write_csv(&t, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "date,actual,forecast\n2024-03-04,7200,7200\n2024-03-05,7200,7200\n2024-03-06,,7200\n"
        );
    }

    #[test]
    fn csv_export_with_intervals() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = TimeSeries::daily(start, vec![1.0, 2.0]).unwrap();
        let forecast = Forecast::from_values_with_intervals(vec![3.0], vec![2.5], vec![3.5]);
        let first = series.timestamps()[1] + chrono::Duration::days(1);
        let t = ForecastTable::overlay(&series, &forecast, first).unwrap();

        let mut buffer = Vec::new();
        write_csv(&t, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,actual,forecast,lower,upper");
        assert_eq!(lines[1], "2024-01-01,1,,,");
        assert_eq!(lines[3], "2024-01-03,,3,2.5,3.5");
    }
}
