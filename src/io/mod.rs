//! Loading daily series from CSV.

mod loader;

pub use loader::{load_daily_csv, read_daily_csv, LoaderConfig};
