//! Forecast result structure for holding predictions.

/// Point predictions for consecutive future steps with optional intervals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    /// Lower interval bounds, if computed.
    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    /// Upper interval bounds, if computed.
    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Apply `f` to the points and interval bounds.
    ///
    /// Used to move a forecast made on a transformed scale back to the
    /// original one; `f` must be monotonically increasing.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            point: self.point.into_iter().map(&f).collect(),
            lower: self.lower.map(|l| l.into_iter().map(&f).collect()),
            upper: self.upper.map(|u| u.into_iter().map(&f).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_empty_state() {
        let forecast = Forecast::new();
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
        assert!(!forecast.has_intervals());
    }

    #[test]
    fn forecast_from_values_with_intervals() {
        let forecast =
            Forecast::from_values_with_intervals(vec![2.0, 3.0], vec![1.0, 2.0], vec![3.0, 4.0]);

        assert_eq!(forecast.horizon(), 2);
        assert_eq!(forecast.primary(), &[2.0, 3.0]);
        assert_eq!(forecast.lower().unwrap(), &[1.0, 2.0]);
        assert_eq!(forecast.upper().unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn forecast_map_transforms_every_column() {
        let forecast =
            Forecast::from_values_with_intervals(vec![0.0, 1.0], vec![-1.0, 0.0], vec![1.0, 2.0])
                .map(f64::exp);

        assert_eq!(forecast.primary()[0], 1.0);
        assert_eq!(forecast.lower().unwrap()[1], 1.0);
        assert!((forecast.upper().unwrap()[0] - std::f64::consts::E).abs() < 1e-12);
    }
}
