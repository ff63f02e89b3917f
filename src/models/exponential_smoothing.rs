//! Double exponential smoothing (Holt's linear trend method)

use crate::error::{ForecastError, Result};
use crate::models::DemandModel;

const DEFAULT_ALPHA: f64 = 0.3;
const DEFAULT_BETA: f64 = 0.1;

/// Holt's linear trend method.
///
/// Extends simple exponential smoothing with a trend component; the h-step
/// forecast is the fitted level plus h times the fitted trend. There is no
/// hard history minimum, but the trend cannot be initialized from fewer
/// than two observations and very short series fit unstably; both cases
/// surface as errors that ride the declared fallback.
#[derive(Debug, Clone)]
pub struct Holt {
    alpha: f64,
    beta: f64,
}

impl Holt {
    /// Create a Holt model with explicit smoothing parameters
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if !(0.0 < alpha && alpha < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "alpha must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if !(0.0 < beta && beta < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "beta must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        Ok(Self { alpha, beta })
    }

    /// Smoothing parameters (alpha, beta)
    pub fn params(&self) -> (f64, f64) {
        (self.alpha, self.beta)
    }
}

impl Default for Holt {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
        }
    }
}

impl DemandModel for Holt {
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        if train.len() < 2 {
            return Err(ForecastError::InsufficientData {
                required: 2,
                actual: train.len(),
            });
        }

        let mut level = train[0];
        let mut trend = train[1] - train[0];
        for &value in &train[1..] {
            let prev_level = level;
            level = self.alpha * value + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - prev_level) + (1.0 - self.beta) * trend;
        }

        if !level.is_finite() || !trend.is_finite() {
            return Err(ForecastError::FitFailure(
                "level/trend smoothing diverged".to_string(),
            ));
        }

        Ok((1..=horizon)
            .map(|h| level + h as f64 * trend)
            .collect())
    }
}
