//! Simple moving average, the universal fallback model

use crate::error::{ForecastError, Result};
use crate::models::DemandModel;

/// Default trailing window; the effective window is min(window, len)
const DEFAULT_WINDOW: usize = 3;

/// Simple Moving Average model.
///
/// Forecasts the mean of the most recent observations, flat across the
/// horizon. Works on any training length (an empty window forecasts zero
/// demand), which is why every fallback chain terminates here.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    window: usize,
}

impl SimpleMovingAverage {
    /// Create a moving average with an explicit window size
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "window size must be positive".to_string(),
            ));
        }
        Ok(Self { window })
    }

    /// Window size
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for SimpleMovingAverage {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl DemandModel for SimpleMovingAverage {
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        let window = self.window.min(train.len());
        let level = if window == 0 {
            0.0
        } else {
            train[train.len() - window..].iter().sum::<f64>() / window as f64
        };
        Ok(vec![level; horizon])
    }
}
