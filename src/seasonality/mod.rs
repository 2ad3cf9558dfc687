//! Seasonal decomposition.

mod decompose;

pub use decompose::{decompose, moving_average_weights, Decomposition};
