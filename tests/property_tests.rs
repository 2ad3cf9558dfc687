//! Property-based tests for the detection, estimation and model layers.

use activity_forecast::core::TimeSeries;
use activity_forecast::detection::PeriodDetector;
use activity_forecast::models::arima::{difference, integrate, SARIMA};
use activity_forecast::models::exponential::{estimate_initial_params, HoltWinters};
use activity_forecast::models::{ForecastEngine, Forecaster, SeasonalSmoothingEngine};
use activity_forecast::transform::{CubicSpline, ZeroHandling};
use chrono::NaiveDate;
use proptest::prelude::*;

fn make_ts(values: &[f64]) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    TimeSeries::daily(start, values.to_vec()).unwrap()
}

/// Positive durations in seconds with some variation.
fn durations_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(600.0..20_000.0_f64, len).prop_map(|mut v| {
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.5;
            }
            v
        })
    })
}

/// A positive multiplicative cycle on a rising base, at least two cycles long.
fn seasonal_strategy() -> impl Strategy<Value = (Vec<f64>, usize)> {
    (3usize..9).prop_flat_map(|period| {
        (
            2 * period..8 * period,
            prop::collection::vec(0.5..1.5_f64, period),
            1000.0..5000.0_f64,
        )
            .prop_map(move |(len, factors, base)| {
                let values = (0..len)
                    .map(|i| (base + 3.0 * i as f64) * factors[i % period])
                    .collect();
                (values, period)
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn detected_period_fits_twice_in_the_series(values in durations_strategy(4, 120)) {
        let estimate = PeriodDetector::default().detect(&values);
        prop_assert!(estimate.period >= 1);
        prop_assert!(estimate.period == 1 || 2 * estimate.period <= values.len());
        if estimate.is_seasonal() {
            prop_assert!(estimate.correlation >= 0.2);
        }
    }

    #[test]
    fn initial_seasonal_has_one_factor_per_phase((values, period) in seasonal_strategy()) {
        let params = estimate_initial_params(&make_ts(&values), period, false).unwrap();
        prop_assert_eq!(params.seasonal.len(), period);
        prop_assert!(params.level.is_finite());
        prop_assert!(params.seasonal.iter().all(|s| s.is_finite() && *s > 0.0));
        let mean = params.seasonal.iter().sum::<f64>() / period as f64;
        prop_assert!((mean - 1.0).abs() < 0.05, "mean seasonal factor {}", mean);
    }

    #[test]
    fn smoothing_table_extends_by_one_period((values, _) in seasonal_strategy()) {
        let series = make_ts(&values);
        let table = SeasonalSmoothingEngine::default().forecast(&series).unwrap();

        let horizon = table.len() - values.len();
        prop_assert!(horizon >= 1);
        prop_assert!(horizon == 1 || 2 * horizon <= values.len());
        prop_assert!(table.forecast().iter().all(|f| f.is_some()));
    }

    #[test]
    fn holt_winters_fitted_matches_input_length((values, period) in seasonal_strategy()) {
        let series = make_ts(&values);
        let params = estimate_initial_params(&series, period, false).unwrap();
        let mut model = HoltWinters::new(0.5, 0.01, 0.01, period)
            .with_initial_state(params.level, params.trend, params.seasonal);
        model.fit(&series).unwrap();
        prop_assert_eq!(model.fitted_values().unwrap().len(), values.len());
        prop_assert_eq!(model.predict(period).unwrap().horizon(), period);
    }

    #[test]
    fn sentinel_removes_every_zero(
        values in prop::collection::vec(prop_oneof![Just(0.0), 1.0..10_000.0_f64], 1..60)
    ) {
        let prepared = ZeroHandling::default().apply(&values).unwrap();
        prop_assert!(prepared.iter().all(|v| *v > 0.0));
    }

    #[test]
    fn log_handling_inverts_nonzero_values(values in durations_strategy(2, 60)) {
        let handling = ZeroHandling::InterpolateLog;
        let prepared = handling.apply(&values).unwrap();
        for (raw, transformed) in values.iter().zip(&prepared) {
            let restored = handling.invert(*transformed);
            prop_assert!((restored - raw).abs() <= 1e-9 * raw);
        }
    }

    #[test]
    fn spline_hits_every_knot(ys in prop::collection::vec(-100.0..100.0_f64, 2..30)) {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64 * 1.5).collect();
        let spline = CubicSpline::not_a_knot(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            prop_assert!((spline.evaluate(*x) - y).abs() < 1e-6);
        }
    }

    #[test]
    fn integrate_undoes_difference(values in durations_strategy(10, 60), d in 1usize..3, split in 5usize..9) {
        let (head, tail) = values.split_at(split);
        let diffs = difference(&values, d);
        // Differences of the tail start at index split - d
        let restored = integrate(&diffs[split - d..], head, d);
        for (got, want) in restored.iter().zip(tail) {
            prop_assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn sarima_intervals_bracket_the_forecast(
        values in durations_strategy(30, 80),
        horizon in 1usize..14
    ) {
        let mut model = SARIMA::arima(1, 0, 1);
        model.fit(&make_ts(&values)).unwrap();
        let forecast = model.predict_with_intervals(horizon, 0.95).unwrap();

        prop_assert_eq!(forecast.horizon(), horizon);
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        for ((l, p), u) in lower.iter().zip(forecast.primary()).zip(upper) {
            prop_assert!(p.is_finite());
            prop_assert!(l <= p && p <= u);
        }
    }
}
