use assert_approx_eq::assert_approx_eq;
use demand_forecast::config::ForecastConfig;
use demand_forecast::models::arima::{Arima, AutoArima};
use demand_forecast::models::croston::Croston;
use demand_forecast::models::exponential_smoothing::Holt;
use demand_forecast::models::moving_average::SimpleMovingAverage;
use demand_forecast::models::sarima::SeasonalArima;
use demand_forecast::models::seasonal::SeasonalDecomposition;
use demand_forecast::models::theta::Theta;
use demand_forecast::models::{DemandModel, ModelKind, ModelRegistry};

fn trending(n: usize) -> Vec<f64> {
    (0..n).map(|i| 50.0 + i as f64 * 2.0).collect()
}

#[test]
fn test_sma_uses_trailing_window() {
    let model = SimpleMovingAverage::default();
    let forecast = model
        .fit_forecast(&[10.0, 20.0, 30.0, 40.0], 6)
        .unwrap();
    assert_eq!(forecast.len(), 6);
    for value in &forecast {
        assert_approx_eq!(*value, 30.0);
    }
}

#[test]
fn test_sma_short_and_empty_train() {
    let model = SimpleMovingAverage::default();
    let forecast = model.fit_forecast(&[8.0], 3).unwrap();
    assert_eq!(forecast, vec![8.0, 8.0, 8.0]);

    // degenerate case: no history at all forecasts zero demand
    let empty = model.fit_forecast(&[], 2).unwrap();
    assert_eq!(empty, vec![0.0, 0.0]);
}

#[test]
fn test_sma_rejects_zero_window() {
    assert!(SimpleMovingAverage::new(0).is_err());
}

#[test]
fn test_holt_follows_a_linear_trend() {
    let model = Holt::default();
    let forecast = model.fit_forecast(&trending(24), 6).unwrap();

    assert_eq!(forecast.len(), 6);
    let last = trending(24)[23];
    for pair in forecast.windows(2) {
        assert!(pair[1] > pair[0], "trend forecast should keep rising");
    }
    assert!(forecast[0] > last - 5.0);
}

#[test]
fn test_holt_needs_two_observations() {
    let model = Holt::default();
    assert!(model.fit_forecast(&[10.0], 3).is_err());
    assert!(model.fit_forecast(&[], 3).is_err());
}

#[test]
fn test_holt_parameter_validation() {
    assert!(Holt::new(1.5, 0.1).is_err());
    assert!(Holt::new(0.3, 0.0).is_err());
    assert!(Holt::new(0.3, 0.1).is_ok());
}

#[test]
fn test_croston_flat_rate() {
    // non-zero demand of 5 every second month: rate = 5 / 2
    let train = [5.0, 0.0, 5.0, 0.0, 5.0, 0.0];
    let forecast = Croston.fit_forecast(&train, 4).unwrap();
    assert_eq!(forecast.len(), 4);
    for value in &forecast {
        assert_approx_eq!(*value, 2.5);
    }
}

#[test]
fn test_croston_dense_demand_floors_the_gap() {
    // consecutive non-zero months: average gap 1, rate equals the size
    let forecast = Croston.fit_forecast(&[4.0, 4.0, 4.0, 4.0], 2).unwrap();
    for value in &forecast {
        assert_approx_eq!(*value, 4.0);
    }
}

#[test]
fn test_croston_needs_two_nonzero_months() {
    assert!(Croston.fit_forecast(&[5.0, 0.0, 0.0], 3).is_err());
    assert!(Croston.fit_forecast(&[0.0; 12], 3).is_err());
}

#[test]
fn test_theta_on_trending_data() {
    let model = Theta::default();
    let forecast = model.fit_forecast(&trending(24), 12).unwrap();

    assert_eq!(forecast.len(), 12);
    assert!(forecast.iter().all(|value| value.is_finite()));
    // a clear upward trend should survive the decomposition
    assert!(forecast[11] > forecast[0]);
}

#[test]
fn test_theta_parameter_validation() {
    assert!(Theta::new(0.5).is_err());
    assert!(Theta::new(2.0).is_ok());
}

#[test]
fn test_arima_fit_and_predict() {
    let data: Vec<f64> = (1..=50)
        .map(|x| x as f64 + (x as f64 * 0.1).sin())
        .collect();
    let mut model = Arima::new(1, 1, 0).unwrap();

    assert!(model.fit(&data).is_ok());
    assert!(model.is_fitted());
    assert!(model.aic().unwrap().is_finite());

    let forecast = model.predict(5).unwrap();
    assert_eq!(forecast.len(), 5);
    assert!(forecast.iter().all(|value| value.is_finite()));
}

#[test]
fn test_arima_order_validation() {
    assert!(Arima::new(11, 0, 0).is_err());
    assert!(Arima::new(1, 2, 1).is_err());
    assert!(Arima::new(0, 0, 11).is_err());
}

#[test]
fn test_arima_unfitted_predict_fails() {
    let model = Arima::new(1, 0, 0).unwrap();
    assert!(model.predict(3).is_err());
}

#[test]
fn test_auto_arima_on_constant_series() {
    let forecast = AutoArima.fit_forecast(&[100.0; 24], 12).unwrap();
    assert_eq!(forecast.len(), 12);
    for value in &forecast {
        assert_approx_eq!(*value, 100.0, 1e-6);
    }
}

#[test]
fn test_auto_arima_selection_is_deterministic() {
    let data: Vec<f64> = (0..36).map(|i| 20.0 + (i as f64 * 0.7).sin() * 4.0).collect();
    let first = AutoArima::search(&data).unwrap();
    let second = AutoArima::search(&data).unwrap();
    assert_eq!(first.order(), second.order());
    assert_eq!(first.predict(6).unwrap(), second.predict(6).unwrap());
}

#[test]
fn test_sarima_needs_two_cycles() {
    assert!(SeasonalArima.fit_forecast(&trending(23), 12).is_err());
    assert!(SeasonalArima.fit_forecast(&trending(24), 12).is_ok());
}

#[test]
fn test_sarima_repeats_a_pure_seasonal_pattern() {
    let pattern = [12.0, 8.0, 5.0, 9.0, 14.0, 20.0, 25.0, 22.0, 18.0, 15.0, 11.0, 9.0];
    let train: Vec<f64> = (0..36).map(|i| pattern[i % 12]).collect();

    let forecast = SeasonalArima.fit_forecast(&train, 12).unwrap();
    assert_eq!(forecast.len(), 12);
    for (h, value) in forecast.iter().enumerate() {
        assert_approx_eq!(*value, pattern[h % 12], 1e-6);
    }
}

#[test]
fn test_seasonal_decomposition_needs_history() {
    let model = SeasonalDecomposition::default();
    assert!(model.fit_forecast(&trending(13), 6).is_err());
    assert!(model.fit_forecast(&trending(18), 6).is_ok());
}

#[test]
fn test_seasonal_decomposition_intervals() {
    let pattern = [3.0, -4.0, 1.0, 6.0, -2.0, 0.0, 5.0, -1.0, 2.0, -3.0, 4.0, 1.0];
    let train: Vec<f64> = (0..24)
        .map(|i| 100.0 + i as f64 * 0.5 + pattern[i % 12])
        .collect();

    let model = SeasonalDecomposition::new(0.9);
    let (values, intervals) = model.forecast_with_interval(&train, 12).unwrap();

    assert_eq!(values.len(), 12);
    assert_eq!(intervals.len(), 12);
    for (value, (lower, upper)) in values.iter().zip(&intervals) {
        assert!(lower < value && value < upper);
    }
}

#[test]
fn test_registry_order_and_chains() {
    let cfg = ForecastConfig::default();
    let registry = ModelRegistry::from_config(&cfg);

    assert_eq!(
        registry.kinds(),
        vec![
            ModelKind::Sma,
            ModelKind::Holt,
            ModelKind::Croston,
            ModelKind::Theta,
            ModelKind::Arima,
            ModelKind::Sarima,
            ModelKind::Seasonal,
        ]
    );

    // every chain terminates at the moving average
    for entry in registry.entries() {
        let chain = registry.chain(entry.kind);
        assert_eq!(chain.last(), Some(&ModelKind::Sma));
    }

    // sarima defers to arima before the universal fallback
    assert_eq!(
        registry.chain(ModelKind::Sarima),
        vec![ModelKind::Sarima, ModelKind::Arima, ModelKind::Sma]
    );
}

#[test]
fn test_restricted_registry() {
    let mut cfg = ForecastConfig::default();
    cfg.use_advanced_models = false;
    let registry = ModelRegistry::from_config(&cfg);
    assert_eq!(registry.kinds(), vec![ModelKind::Sma, ModelKind::Holt]);
}

#[test]
fn test_registry_fallback_resolution() {
    let cfg = ForecastConfig::default();
    let registry = ModelRegistry::from_config(&cfg);

    // far below sarima's minimum: the chain walks down to a usable model
    let short = [5.0, 6.0, 7.0, 8.0];
    let forecast = registry.forecast(ModelKind::Sarima, &short, 3).unwrap();
    assert_eq!(forecast.len(), 3);
    assert!(forecast.iter().all(|value| value.is_finite()));

    // croston with a single non-zero month falls back to the moving average
    let sparse = [0.0, 0.0, 9.0];
    let fallback = registry.forecast(ModelKind::Croston, &sparse, 2).unwrap();
    let sma = registry.forecast(ModelKind::Sma, &sparse, 2).unwrap();
    assert_eq!(fallback, sma);
}
