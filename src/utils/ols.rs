//! Ordinary Least Squares (OLS) regression.
//!
//! Used to fit the de-seasonalised trend line of a series against the day
//! of the year.

use crate::error::{ForecastError, Result};

/// OLS regression coefficients and intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct OLSResult {
    /// Intercept term.
    pub intercept: f64,
    /// Regression coefficients (one per regressor column).
    pub coefficients: Vec<f64>,
}

impl OLSResult {
    /// Predict values for regressor columns laid out as in the fit.
    pub fn predict(&self, columns: &[&[f64]]) -> Result<Vec<f64>> {
        if columns.len() != self.coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: columns.len(),
            });
        }
        let n = columns.first().map_or(0, |c| c.len());
        check_lengths(n, columns)?;

        let mut predictions = vec![self.intercept; n];
        for (coef, column) in self.coefficients.iter().zip(columns) {
            for (pred, x) in predictions.iter_mut().zip(column.iter()) {
                *pred += coef * x;
            }
        }
        Ok(predictions)
    }

    /// Slope of a single-regressor fit.
    pub fn slope(&self) -> Option<f64> {
        self.coefficients.first().copied()
    }
}

fn check_lengths(n: usize, columns: &[&[f64]]) -> Result<()> {
    for column in columns {
        if column.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: column.len(),
            });
        }
    }
    Ok(())
}

/// Fit `y = intercept + Σ coefficients[j] · columns[j]`.
///
/// Solves the normal equations by Cholesky decomposition. A rank-deficient
/// design (for example a constant regressor) is a `ComputationError`.
pub fn ols_fit(y: &[f64], columns: &[&[f64]]) -> Result<OLSResult> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    check_lengths(n, columns)?;

    let k = columns.len();
    let num_params = k + 1;

    // X'X and X'y with the intercept as column 0
    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    for obs in 0..n {
        let y_obs = y[obs];
        xtx[0][0] += 1.0;
        xty[0] += y_obs;
        for i in 0..k {
            let xi = columns[i][obs];
            xtx[0][i + 1] += xi;
            xtx[i + 1][0] += xi;
            xty[i + 1] += xi * y_obs;
            for j in 0..k {
                xtx[i + 1][j + 1] += xi * columns[j][obs];
            }
        }
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError(
            "OLS regression failed: design matrix is singular".into(),
        )
    })?;

    Ok(OLSResult {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
    })
}

/// Solve a symmetric positive definite system by Cholesky decomposition.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                // Relative pivot check so near-collinear columns are rejected
                if sum <= a[i][i].abs() * 1e-12 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ols_fit_recovers_a_line() {
        // y = 2 + 3*x
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];

        let result = ols_fit(&y, &[&x]).unwrap();

        assert_relative_eq!(result.intercept, 2.0, epsilon = 1e-9);
        assert_relative_eq!(result.slope().unwrap(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn ols_fit_on_day_of_year_scale() {
        let x: Vec<f64> = (60..130).map(|d| d as f64).collect();
        let y: Vec<f64> = x.iter().map(|d| 4500.0 + 12.5 * d).collect();

        let result = ols_fit(&y, &[&x]).unwrap();

        assert_relative_eq!(result.intercept, 4500.0, epsilon = 1e-6);
        assert_relative_eq!(result.coefficients[0], 12.5, epsilon = 1e-9);
    }

    #[test]
    fn ols_fit_multiple_regressors() {
        // y = 1 + 2*x1 + 3*x2
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = vec![0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(x2.iter())
            .map(|(a, b)| 1.0 + 2.0 * a + 3.0 * b)
            .collect();

        let result = ols_fit(&y, &[&x1, &x2]).unwrap();

        assert_relative_eq!(result.intercept, 1.0, epsilon = 1e-8);
        assert_relative_eq!(result.coefficients[0], 2.0, epsilon = 1e-8);
        assert_relative_eq!(result.coefficients[1], 3.0, epsilon = 1e-8);

        let predicted = result.predict(&[&x1, &x2]).unwrap();
        for (p, t) in predicted.iter().zip(y.iter()) {
            assert_relative_eq!(p, t, epsilon = 1e-8);
        }
    }

    #[test]
    fn ols_fit_without_regressors_is_the_mean() {
        let result = ols_fit(&[1.0, 2.0, 3.0], &[]).unwrap();
        assert_relative_eq!(result.intercept, 2.0, epsilon = 1e-12);
        assert!(result.slope().is_none());
    }

    #[test]
    fn ols_fit_rejects_constant_regressor() {
        let x = vec![42.0; 5];
        let result = ols_fit(&[1.0, 2.0, 3.0, 4.0, 5.0], &[&x]);
        assert!(matches!(result, Err(ForecastError::ComputationError(_))));
    }

    #[test]
    fn ols_fit_validates_input() {
        assert!(matches!(
            ols_fit(&[], &[]),
            Err(ForecastError::InsufficientData { .. })
        ));
        assert!(matches!(
            ols_fit(&[1.0, 2.0], &[&[1.0]]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }
}
