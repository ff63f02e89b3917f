//! Standard theta method

use crate::error::{ForecastError, Result};
use crate::models::DemandModel;

const DEFAULT_THETA: f64 = 2.0;
/// Smoothing parameters scanned when fitting the theta line (0.01..=0.99)
const ALPHA_GRID_STEPS: usize = 99;

/// Standard theta method.
///
/// Decomposes the series into a linear trend and a double-curvature theta
/// line smoothed by SES; the h-step forecast is the SES level plus a trend
/// term damped by the smoothing parameter:
/// `level + (1 - 1/theta) * b * (1/alpha + h - 1)`.
#[derive(Debug, Clone)]
pub struct Theta {
    theta: f64,
}

impl Theta {
    /// Create a theta model with an explicit theta parameter
    pub fn new(theta: f64) -> Result<Self> {
        if theta < 1.0 {
            return Err(ForecastError::InvalidParameter(
                "theta must be at least 1".to_string(),
            ));
        }
        Ok(Self { theta })
    }
}

impl Default for Theta {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
        }
    }
}

impl DemandModel for Theta {
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        if train.len() < 3 {
            return Err(ForecastError::InsufficientData {
                required: 3,
                actual: train.len(),
            });
        }

        let slope = ols_slope(train);
        let alpha = best_alpha(train);

        let mut level = train[0];
        for &value in &train[1..] {
            level = alpha * value + (1.0 - alpha) * level;
        }

        let damp = 1.0 - 1.0 / self.theta;
        let values: Vec<f64> = (1..=horizon)
            .map(|h| level + damp * slope * (1.0 / alpha + (h as f64 - 1.0)))
            .collect();
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ForecastError::FitFailure(
                "theta projection is not finite".to_string(),
            ));
        }
        Ok(values)
    }
}

/// Least-squares slope of the series against its 0-based index
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        ss_xx += (x - x_mean).powi(2);
        ss_xy += (x - x_mean) * (y - y_mean);
    }

    if ss_xx > 0.0 {
        ss_xy / ss_xx
    } else {
        0.0
    }
}

/// Bounded grid scan for the SES smoothing parameter minimizing one-step SSE
fn best_alpha(values: &[f64]) -> f64 {
    let mut best_alpha = 0.5;
    let mut best_sse = f64::MAX;

    for step in 1..=ALPHA_GRID_STEPS {
        let alpha = step as f64 / 100.0;
        let mut level = values[0];
        let mut sse = 0.0;
        for &value in &values[1..] {
            let error = value - level;
            sse += error * error;
            level = alpha * value + (1.0 - alpha) * level;
        }
        if sse < best_sse {
            best_sse = sse;
            best_alpha = alpha;
        }
    }

    best_alpha
}
