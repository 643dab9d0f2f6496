use chrono::NaiveDate;
use rstest::rstest;
use sales_forecast::data::SalesSeries;
use sales_forecast::error::ForecastError;
use sales_forecast::models::holt_winters::HoltWinters;
use sales_forecast::models::seasonal_arima::SeasonalArima;
use sales_forecast::models::trend_season::TrendSeason;
use sales_forecast::models::{FittedModel, ForecastModel};
use std::f64::consts::PI;

/// Daily series starting 2024-03-01 with the given values
fn daily_series(values: Vec<f64>) -> SalesSeries {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let dates = (0..values.len())
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();
    SalesSeries::new(dates, values).unwrap()
}

#[test]
fn test_holt_winters_forecasts_requested_horizon() {
    let values: Vec<f64> = (0..21)
        .map(|i| 100.0 + 2.0 * i as f64 + 15.0 * ((i % 7) as f64))
        .collect();
    let fitted = HoltWinters::weekly().fit(&daily_series(values)).unwrap();

    let forecast = fitted.forecast(7).unwrap();

    assert_eq!(forecast.len(), 7);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_holt_winters_constant_series_stays_constant() {
    let fitted = HoltWinters::weekly()
        .fit(&daily_series(vec![100.0; 14]))
        .unwrap();

    let forecast = fitted.forecast(7).unwrap();

    for value in forecast.values() {
        assert!((value - 100.0).abs() < 1e-9);
    }
}

#[test]
fn test_holt_winters_two_week_minimum() {
    let result = HoltWinters::weekly().fit(&daily_series(vec![10.0; 13]));

    match result {
        Err(ForecastError::InsufficientData { required, actual }) => {
            assert_eq!(required, 14);
            assert_eq!(actual, 13);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[rstest]
#[case(0.0, 0.3, 0.2)]
#[case(1.0, 0.3, 0.2)]
#[case(0.5, -0.1, 0.2)]
#[case(0.5, 0.3, 1.5)]
fn test_holt_winters_rejects_out_of_range_parameters(
    #[case] alpha: f64,
    #[case] beta: f64,
    #[case] gamma: f64,
) {
    let result = HoltWinters::new(alpha, beta, gamma);
    assert!(matches!(result, Err(ForecastError::InvalidParameter { .. })));
}

#[test]
fn test_holt_winters_interval_bounds_bracket_the_forecast() {
    let values: Vec<f64> = (0..28)
        .map(|i| 50.0 + ((i * 13) % 7) as f64 * 4.0)
        .collect();
    let fitted = HoltWinters::weekly().fit(&daily_series(values)).unwrap();

    let forecast = fitted.forecast(14).unwrap();
    let intervals = forecast.intervals().expect("intervals expected");

    assert_eq!(intervals.len(), 14);
    for (value, (lower, upper)) in forecast.values().iter().zip(intervals) {
        assert!(lower <= value && value <= upper);
    }
}

#[test]
fn test_trend_season_continues_a_linear_trend() {
    // Ten points keep the fit trend-only
    let values: Vec<f64> = (0..10).map(|i| 10.0 + 2.0 * i as f64).collect();
    let fitted = TrendSeason::weekly().fit(&daily_series(values)).unwrap();

    let forecast = fitted.forecast(5).unwrap();

    for (h, value) in forecast.values().iter().enumerate() {
        let expected = 10.0 + 2.0 * (9 + h + 1) as f64;
        assert!(
            (value - expected).abs() < 1e-6,
            "step {}: {} vs {}",
            h,
            value,
            expected
        );
    }
}

#[test]
fn test_trend_season_pure_trend_with_seasonal_block_active() {
    // Four weeks of data enable the seasonal block; on trendy data
    // with no cycle its coefficients stay at zero
    let values: Vec<f64> = (0..28).map(|i| 50.0 + 2.0 * i as f64).collect();
    let fitted = TrendSeason::weekly().fit(&daily_series(values)).unwrap();

    let forecast = fitted.forecast(7).unwrap();

    for (h, value) in forecast.values().iter().enumerate() {
        let expected = 50.0 + 2.0 * (28 + h) as f64;
        assert!(
            (value - expected).abs() < 1e-6,
            "step {}: {} vs {}",
            h,
            value,
            expected
        );
    }
}

#[test]
fn test_trend_season_forecast_repeats_weekly() {
    // Whatever the fitted coefficients are, the seasonal block has a
    // seven day period, so week-apart forecast steps differ by a
    // constant trend increment
    let truth = |i: usize| 50.0 + 2.0 * i as f64 + 10.0 * (2.0 * PI * i as f64 / 7.0).sin();
    let values: Vec<f64> = (0..28).map(truth).collect();
    let fitted = TrendSeason::weekly().fit(&daily_series(values)).unwrap();

    let forecast = fitted.forecast(14).unwrap();
    let f = forecast.values();

    let week_step = f[7] - f[0];
    for h in 1..7 {
        assert!(
            ((f[h + 7] - f[h]) - week_step).abs() < 1e-9,
            "step {} breaks the weekly period",
            h
        );
    }
}

#[test]
fn test_trend_season_minimum_points() {
    let result = TrendSeason::weekly().fit(&daily_series(vec![5.0, 6.0]));

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData {
            required: 3,
            actual: 2
        })
    ));
}

#[test]
fn test_trend_season_interval_width_grows_with_leverage() {
    let values: Vec<f64> = (0..21).map(|i| 30.0 + (i % 5) as f64).collect();
    let fitted = TrendSeason::weekly().fit(&daily_series(values)).unwrap();

    let forecast = fitted.forecast(10).unwrap();
    let intervals = forecast.intervals().expect("intervals expected");

    let width = |(lower, upper): &(f64, f64)| upper - lower;
    assert!(width(&intervals[9]) >= width(&intervals[0]));
}

#[test]
fn test_seasonal_arima_three_rows_is_insufficient() {
    let result = SeasonalArima::new(7)
        .unwrap()
        .fit(&daily_series(vec![1.0, 2.0, 3.0]));

    match result {
        Err(ForecastError::InsufficientData { required, actual }) => {
            assert_eq!(required, 14);
            assert_eq!(actual, 3);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[rstest]
#[case(0)]
#[case(1)]
fn test_seasonal_arima_rejects_degenerate_periods(#[case] period: usize) {
    let result = SeasonalArima::new(period);
    assert!(matches!(result, Err(ForecastError::InvalidParameter { .. })));
}

#[test]
fn test_seasonal_arima_constant_series_stays_constant() {
    let fitted = SeasonalArima::new(7)
        .unwrap()
        .fit(&daily_series(vec![100.0; 28]))
        .unwrap();

    let forecast = fitted.forecast(7).unwrap();

    for value in forecast.values() {
        assert!((value - 100.0).abs() < 1e-9);
    }
}

#[test]
fn test_seasonal_arima_extends_a_linear_trend_exactly() {
    // Differencing removes a linear trend completely, so the
    // reintegrated forecast continues it
    let values: Vec<f64> = (0..28).map(|i| 10.0 + 2.0 * i as f64).collect();
    let fitted = SeasonalArima::new(7)
        .unwrap()
        .fit(&daily_series(values))
        .unwrap();

    let forecast = fitted.forecast(7).unwrap();

    for (h, value) in forecast.values().iter().enumerate() {
        let expected = 10.0 + 2.0 * (28 + h) as f64;
        assert!(
            (value - expected).abs() < 1e-9,
            "step {}: {} vs {}",
            h,
            value,
            expected
        );
    }
}

#[rstest]
#[case(4)]
#[case(7)]
#[case(12)]
fn test_seasonal_arima_fits_at_two_cycles(#[case] period: usize) {
    let values: Vec<f64> = (0..period * 2)
        .map(|i| 20.0 + (i % period) as f64)
        .collect();
    let fitted = SeasonalArima::new(period)
        .unwrap()
        .fit(&daily_series(values))
        .unwrap();

    let forecast = fitted.forecast(period).unwrap();

    assert_eq!(forecast.len(), period);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_model_names_identify_the_backend() {
    assert!(HoltWinters::weekly().name().contains("Holt-Winters"));
    assert!(SeasonalArima::new(7).unwrap().name().contains("SARIMA"));
    assert!(TrendSeason::weekly().name().contains("Additive"));
}
