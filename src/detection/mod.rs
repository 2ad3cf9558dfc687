//! Seasonal period detection.

mod period;

pub use period::{
    detect_period, raw_autocorrelation, PeriodDetector, PeriodEstimate,
    DEFAULT_CORRELATION_THRESHOLD,
};
