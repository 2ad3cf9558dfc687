//! Cubic-spline interpolation of missing observations.
//!
//! Uses the not-a-knot end condition: the third derivative is continuous at
//! the second and the second-to-last knot, so the first two and the last two
//! segments are each a single cubic.

use crate::error::{ForecastError, Result};

/// Interpolating cubic spline through `(x, y)` knots.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative at every knot.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a not-a-knot spline. `x` must be strictly increasing.
    ///
    /// Two knots give a straight line and three knots the interpolating
    /// parabola.
    pub fn not_a_knot(x: &[f64], y: &[f64]) -> Result<Self> {
        let n = x.len();
        if n != y.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: y.len(),
            });
        }
        if n < 2 {
            return Err(ForecastError::InsufficientData { needed: 2, got: n });
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::InvalidParameter(
                "spline knots must be strictly increasing".to_string(),
            ));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let d: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        let m = match n {
            2 => vec![0.0; 2],
            3 => {
                let curvature = 2.0 * (d[1] - d[0]) / (h[0] + h[1]);
                vec![curvature; 3]
            }
            _ => Self::solve_second_derivatives(&h, &d)?,
        };

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Solve for the knot second derivatives with not-a-knot ends (n >= 4).
    fn solve_second_derivatives(h: &[f64], d: &[f64]) -> Result<Vec<f64>> {
        let n = h.len() + 1;
        let k = n - 2;

        // Interior equations for M_1..M_{n-2}
        let mut sub = vec![0.0; k];
        let mut diag = vec![0.0; k];
        let mut sup = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for j in 0..k {
            let i = j + 1;
            sub[j] = h[i - 1];
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            sup[j] = h[i];
            rhs[j] = 6.0 * (d[i] - d[i - 1]);
        }

        // M_0 = (1 + h0/h1) M_1 - (h0/h1) M_2
        let r0 = h[0] / h[1];
        diag[0] += h[0] * (1.0 + r0);
        sup[0] -= h[0] * r0;

        // M_{n-1} = (1 + h_{n-2}/h_{n-3}) M_{n-2} - (h_{n-2}/h_{n-3}) M_{n-3}
        let rn = h[n - 2] / h[n - 3];
        diag[k - 1] += h[n - 2] * (1.0 + rn);
        sub[k - 1] -= h[n - 2] * rn;

        let interior = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;

        let mut m = Vec::with_capacity(n);
        m.push((1.0 + r0) * interior[0] - r0 * interior[1.min(k - 1)]);
        m.extend_from_slice(&interior);
        let last = (1.0 + rn) * interior[k - 1] - rn * interior[k.saturating_sub(2)];
        m.push(last);
        Ok(m)
    }

    /// Evaluate the spline. Points outside the knots are extrapolated with
    /// the boundary cubic.
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.x.len();
        let i = match self.x.partition_point(|&xi| xi <= t) {
            0 => 0,
            p => (p - 1).min(n - 2),
        };

        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - t;
        let b = t - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

/// Thomas algorithm for a tridiagonal system.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Result<Vec<f64>> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut r = vec![0.0; n];

    let singular = || ForecastError::ComputationError("singular spline system".to_string());

    if diag[0].abs() < 1e-300 {
        return Err(singular());
    }
    c[0] = sup[0] / diag[0];
    r[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - sub[i] * c[i - 1];
        if denom.abs() < 1e-300 {
            return Err(singular());
        }
        c[i] = sup[i] / denom;
        r[i] = (rhs[i] - sub[i] * r[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = r[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = r[i] - c[i] * x[i + 1];
    }
    Ok(x)
}

/// Fill non-finite entries by cubic-spline interpolation over positions.
///
/// Gaps before the first finite value are left as NaN; gaps after the last
/// one are extrapolated.
pub fn interpolate_missing(values: &[f64]) -> Result<Vec<f64>> {
    if values.iter().all(|v| v.is_finite()) {
        return Ok(values.to_vec());
    }

    let (x, y): (Vec<f64>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| (i as f64, v))
        .unzip();
    let first_known = x.first().copied().unwrap_or(f64::INFINITY);

    let spline = CubicSpline::not_a_knot(&x, &y)?;

    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if v.is_finite() || (i as f64) < first_known {
                v
            } else {
                spline.evaluate(i as f64)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn spline_passes_through_knots() {
        let x = vec![0.0, 1.0, 2.5, 4.0, 5.0];
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0];
        let spline = CubicSpline::not_a_knot(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_relative_eq!(spline.evaluate(*xi), *yi, epsilon = 1e-10);
        }
    }

    #[test]
    fn not_a_knot_reproduces_a_cubic() {
        let f = |t: f64| t.powi(3) - 2.0 * t * t + 0.5;
        let x: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&t| f(t)).collect();
        let spline = CubicSpline::not_a_knot(&x, &y).unwrap();

        for t in [0.5, 1.7, 3.3, 4.9, 6.0, 7.0] {
            assert_relative_eq!(spline.evaluate(t), f(t), epsilon = 1e-8);
        }
    }

    #[test]
    fn three_knots_give_the_parabola() {
        let spline = CubicSpline::not_a_knot(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert_relative_eq!(spline.evaluate(1.5), 2.25, epsilon = 1e-12);
        assert_relative_eq!(spline.evaluate(3.0), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn two_knots_give_a_line() {
        let spline = CubicSpline::not_a_knot(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert_relative_eq!(spline.evaluate(1.0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(spline.evaluate(3.0), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn spline_needs_two_knots() {
        assert!(matches!(
            CubicSpline::not_a_knot(&[1.0], &[1.0]),
            Err(ForecastError::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn interpolate_missing_fills_interior_and_trailing_gaps() {
        let nan = f64::NAN;
        let values = vec![nan, 1.0, 4.0, nan, 16.0, 25.0, nan];
        let filled = interpolate_missing(&values).unwrap();

        // Leading gap is preserved
        assert!(filled[0].is_nan());
        // y = (i)^2 on the known positions, reproduced by the spline
        assert_relative_eq!(filled[3], 9.0, epsilon = 1e-9);
        assert_relative_eq!(filled[6], 36.0, epsilon = 1e-9);
        assert_eq!(filled[1], 1.0);
    }

    #[test]
    fn interpolate_missing_is_identity_without_gaps() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(interpolate_missing(&values).unwrap(), values);
    }
}
