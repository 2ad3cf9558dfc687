//! Core data structures for daily series and forecasts.

mod forecast;
mod table;
mod time_series;

pub use forecast::Forecast;
pub use table::{ForecastRow, ForecastTable};
pub use time_series::{daily_range, TimeSeries};
