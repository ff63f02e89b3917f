//! Forecast error metrics
//!
//! Shared by the tournament (holdout scoring) and the accuracy tracker
//! (reconciliation against realized sales). All functions take paired
//! forecast/actual slices of equal length.

/// |tracking signal| above which a forecast is flagged for systematic bias
pub const TRACKING_SIGNAL_RED_FLAG: f64 = 3.0;

/// Root mean squared error
pub fn rmse(forecast: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    let sse: f64 = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).powi(2))
        .sum();
    (sse / forecast.len() as f64).sqrt()
}

/// Mean absolute error
pub fn mae(forecast: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    let sum: f64 = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).abs())
        .sum();
    sum / forecast.len() as f64
}

/// Mean signed error, forecast minus actual; positive means over-forecast
pub fn bias(forecast: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(forecast.len(), actual.len());
    if forecast.is_empty() {
        return 0.0;
    }
    let sum: f64 = forecast.iter().zip(actual).map(|(f, a)| f - a).sum();
    sum / forecast.len() as f64
}

/// Mean absolute percentage error over months with non-zero actuals.
///
/// Months where the actual is zero are excluded from the percentage;
/// returns None when no month qualifies.
pub fn mape(forecast: &[f64], actual: &[f64]) -> Option<f64> {
    debug_assert_eq!(forecast.len(), actual.len());
    let mut sum = 0.0;
    let mut count = 0usize;
    for (f, a) in forecast.iter().zip(actual) {
        if *a != 0.0 {
            sum += ((f - a) / a).abs() * 100.0;
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

/// Cumulative signed error divided by MAE; None when MAE is zero.
///
/// Values beyond [`TRACKING_SIGNAL_RED_FLAG`] in magnitude indicate the
/// forecast is persistently biased in one direction.
pub fn tracking_signal(forecast: &[f64], actual: &[f64]) -> Option<f64> {
    let mean_abs = mae(forecast, actual);
    if mean_abs == 0.0 {
        return None;
    }
    let cumulative: f64 = forecast.iter().zip(actual).map(|(f, a)| f - a).sum();
    Some(cumulative / mean_abs)
}
