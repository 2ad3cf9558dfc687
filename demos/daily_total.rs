//! Forecast a daily activity total with both engines.
//!
//! Run with: cargo run --example daily_total -- daily_total.csv SECONDS
//!
//! Set `RUST_LOG=activity_forecast=debug` to see the fit diagnostics.

use std::error::Error;

use activity_forecast::io::{load_daily_csv, LoaderConfig};
use activity_forecast::models::arima::ArimaEngine;
use activity_forecast::models::exponential::{SeasonalSmoothingConfig, SeasonalSmoothingEngine};
use activity_forecast::models::ForecastEngine;
use activity_forecast::reporting::ComparisonReport;
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "activity_forecast=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "daily_total.csv".to_string());
    let column = args.next().unwrap_or_else(|| "SECONDS".to_string());

    let config = LoaderConfig::new(&column).with_start_after(
        NaiveDate::from_ymd_opt(2022, 8, 10).ok_or("invalid start date")?,
    );
    let series = load_daily_csv(&path, &config)?;
    println!("Loaded {} days of {} from {}\n", series.len(), column, path);

    let engines: Vec<Box<dyn ForecastEngine>> = vec![
        Box::new(ArimaEngine::default()),
        Box::new(SeasonalSmoothingEngine::default()),
        Box::new(SeasonalSmoothingEngine::new(
            SeasonalSmoothingConfig::default().with_log_transform(true),
        )),
    ];

    for engine in &engines {
        match engine.forecast(&series) {
            Ok(table) => println!("{}\n", ComparisonReport::new(engine.name(), &table, 21)),
            Err(e) => eprintln!("{} failed: {}\n", engine.name(), e),
        }
    }

    Ok(())
}
