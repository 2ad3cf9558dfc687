//! Transformations applied before fitting.
//!
//! # Example
//!
//! ```
//! use activity_forecast::transform::{ZeroHandling, ZERO_SENTINEL_SECONDS};
//!
//! let seconds = vec![5400.0, 0.0, 7200.0];
//! let prepared = ZeroHandling::Sentinel(ZERO_SENTINEL_SECONDS).apply(&seconds).unwrap();
//! assert_eq!(prepared[1], 3600.0);
//! ```

pub mod spline;
pub mod zeros;

pub use spline::{interpolate_missing, CubicSpline};
pub use zeros::{ZeroHandling, ZERO_SENTINEL_SECONDS};
