//! Additive trend plus yearly seasonality decomposition

use crate::error::{ForecastError, Result};
use crate::models::DemandModel;
use statrs::distribution::{ContinuousCDF, Normal};

/// Months per seasonal cycle
const PERIOD: usize = 12;
/// Default uncertainty interval width
const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;

/// Additive seasonal-trend decomposition.
///
/// Fits a least-squares linear trend plus a seasonal offset per cycle
/// position; forecasts extend the trend and repeat the seasonal pattern.
/// Uncertainty intervals follow the residual spread at a configurable
/// coverage.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    interval_width: f64,
}

impl SeasonalDecomposition {
    /// Create a decomposition model with the given interval width (0..1)
    pub fn new(interval_width: f64) -> Self {
        Self {
            interval_width: interval_width.clamp(0.01, 0.99),
        }
    }

    /// Point forecast plus (lower, upper) uncertainty bounds
    pub fn forecast_with_interval(
        &self,
        train: &[f64],
        horizon: usize,
    ) -> Result<(Vec<f64>, Vec<(f64, f64)>)> {
        let fitted = fit(train)?;
        let values = fitted.project(horizon);

        let normal = Normal::new(0.0, 1.0)
            .map_err(|err| ForecastError::FitFailure(err.to_string()))?;
        let z = normal.inverse_cdf(0.5 + self.interval_width / 2.0);

        let intervals = values
            .iter()
            .map(|value| (value - z * fitted.sigma, value + z * fitted.sigma))
            .collect();
        Ok((values, intervals))
    }
}

impl Default for SeasonalDecomposition {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_WIDTH)
    }
}

impl DemandModel for SeasonalDecomposition {
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        Ok(fit(train)?.project(horizon))
    }
}

struct FittedSeasonal {
    intercept: f64,
    slope: f64,
    seasonal: Vec<f64>,
    sigma: f64,
    n: usize,
}

impl FittedSeasonal {
    fn project(&self, horizon: usize) -> Vec<f64> {
        (0..horizon)
            .map(|k| {
                let t = self.n + k;
                self.intercept + self.slope * t as f64 + self.seasonal[t % PERIOD]
            })
            .collect()
    }
}

fn fit(train: &[f64]) -> Result<FittedSeasonal> {
    // one full cycle plus enough extra to separate trend from seasonality
    if train.len() < PERIOD + 2 {
        return Err(ForecastError::InsufficientData {
            required: PERIOD + 2,
            actual: train.len(),
        });
    }

    let n = train.len();
    let (intercept, slope) = ols_line(train);

    let mut sums = [0.0_f64; PERIOD];
    let mut counts = [0_usize; PERIOD];
    for (i, &value) in train.iter().enumerate() {
        let detrended = value - (intercept + slope * i as f64);
        sums[i % PERIOD] += detrended;
        counts[i % PERIOD] += 1;
    }
    let seasonal: Vec<f64> = (0..PERIOD)
        .map(|j| {
            if counts[j] > 0 {
                sums[j] / counts[j] as f64
            } else {
                0.0
            }
        })
        .collect();

    let mut sse = 0.0;
    for (i, &value) in train.iter().enumerate() {
        let fitted = intercept + slope * i as f64 + seasonal[i % PERIOD];
        sse += (value - fitted).powi(2);
    }
    let sigma = (sse / n as f64).sqrt();

    if !intercept.is_finite() || !slope.is_finite() || !sigma.is_finite() {
        return Err(ForecastError::FitFailure(
            "trend/seasonality estimation diverged".to_string(),
        ));
    }

    Ok(FittedSeasonal {
        intercept,
        slope,
        seasonal,
        sigma,
        n,
    })
}

/// Least-squares line through the series: (intercept, slope)
fn ols_line(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        ss_xx += (x - x_mean).powi(2);
        ss_xy += (x - x_mean) * (y - y_mean);
    }

    let slope = if ss_xx > 0.0 { ss_xy / ss_xx } else { 0.0 };
    (y_mean - slope * x_mean, slope)
}
