//! Augmented Dickey-Fuller unit-root test.

use crate::utils::ols_fit;

/// Result of a stationarity test.
#[derive(Debug, Clone)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// P-value (approximate)
    pub p_value: f64,
    /// Number of lags used
    pub lags: usize,
    /// Whether series appears stationary
    pub is_stationary: bool,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undetermined(lags: usize) -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags,
            is_stationary: false,
            critical_values: CriticalValues::default(),
        }
    }
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Default)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

/// Augmented Dickey-Fuller test with a constant.
///
/// Regresses `Δy_t` on `1`, `y_{t-1}` and `lags` lagged differences; the
/// null hypothesis is a unit root. The lag count defaults to
/// `⌊(n-1)^(1/3)⌋`.
pub fn adf_test(series: &[f64], lags: Option<usize>) -> StationarityResult {
    let n = series.len();
    if n < 8 {
        return StationarityResult::undetermined(0);
    }

    let default_lags = ((n - 1) as f64).powf(1.0 / 3.0).floor() as usize;
    // Keep at least a handful of degrees of freedom
    let k = lags.unwrap_or(default_lags).min((n - 6) / 2);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let rows = k..diff.len();

    let response: Vec<f64> = rows.clone().map(|t| diff[t]).collect();
    let level: Vec<f64> = rows.clone().map(|t| series[t]).collect();
    let lagged: Vec<Vec<f64>> = (1..=k)
        .map(|i| rows.clone().map(|t| diff[t - i]).collect())
        .collect();

    let mut columns: Vec<&[f64]> = vec![&level];
    columns.extend(lagged.iter().map(Vec::as_slice));

    let Some((coefficients, rss)) = regression(&response, &columns) else {
        return StationarityResult::undetermined(k);
    };
    // Frisch-Waugh: variance of y_{t-1} left after the other regressors
    let Some((_, level_rss)) = regression(&level, &columns[1..]) else {
        return StationarityResult::undetermined(k);
    };

    let dof = response.len() as f64 - (k + 2) as f64;
    let sigma_sq = rss / dof;
    let se = (sigma_sq / level_rss).sqrt();
    if !se.is_finite() || se <= 0.0 {
        return StationarityResult::undetermined(k);
    }

    let statistic = coefficients[0] / se;
    let critical_values = CriticalValues {
        cv_1pct: -3.43,
        cv_5pct: -2.86,
        cv_10pct: -2.57,
    };

    StationarityResult {
        statistic,
        p_value: adf_p_value(statistic),
        lags: k,
        is_stationary: statistic < critical_values.cv_5pct,
        critical_values,
    }
}

/// OLS coefficients and residual sum of squares.
fn regression(y: &[f64], columns: &[&[f64]]) -> Option<(Vec<f64>, f64)> {
    let fit = ols_fit(y, columns).ok()?;
    let rss = y
        .iter()
        .enumerate()
        .map(|(i, yi)| {
            let pred: f64 = fit.intercept
                + fit
                    .coefficients
                    .iter()
                    .zip(columns)
                    .map(|(c, col)| c * col[i])
                    .sum::<f64>();
            (yi - pred).powi(2)
        })
        .sum();
    Some((fit.coefficients, rss))
}

/// Coarse p-value lookup for the ADF statistic (constant, no trend).
fn adf_p_value(t_stat: f64) -> f64 {
    const TABLE: [(f64, f64); 9] = [
        (-4.0, 0.001),
        (-3.43, 0.01),
        (-2.86, 0.05),
        (-2.57, 0.10),
        (-1.94, 0.20),
        (-1.62, 0.30),
        (-1.28, 0.40),
        (-0.84, 0.50),
        (0.0, 0.70),
    ];
    if t_stat.is_nan() {
        return f64::NAN;
    }
    TABLE
        .iter()
        .find(|(cv, _)| t_stat < *cv)
        .map(|&(_, p)| p)
        .unwrap_or(0.90 + 0.05 * (1.0 - (-t_stat).exp()))
}
