//! Engine configuration

use serde::{Deserialize, Serialize};

/// Per-model minimum history thresholds, in months of training data.
///
/// A model whose threshold exceeds an item's training length is skipped by
/// the tournament pre-filter before any fitting is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelThresholds {
    /// Theta decomposition
    pub theta: usize,
    /// Auto-order ARIMA
    pub arima: usize,
    /// Seasonal ARIMA
    pub sarima: usize,
    /// Seasonal/trend additive decomposition
    pub seasonal: usize,
    /// Croston's method
    pub croston: usize,
}

impl Default for ModelThresholds {
    fn default() -> Self {
        Self {
            theta: 12,
            arima: 12,
            sarima: 24,
            seasonal: 18,
            croston: 2,
        }
    }
}

/// Tournament configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Months to forecast (record slots cap at 12)
    pub horizon: usize,
    /// Share of each item's series used for training
    pub train_ratio: f64,
    /// When false, only the moving-average and Holt models compete
    pub use_advanced_models: bool,
    /// Per-model minimum history
    pub thresholds: ModelThresholds,
    /// Uncertainty interval width for the seasonal model, in (0, 1)
    pub interval_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 12,
            train_ratio: 0.8,
            use_advanced_models: true,
            thresholds: ModelThresholds::default(),
            interval_width: 0.8,
        }
    }
}

/// Batch scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Allow parallel execution at all
    pub parallel: bool,
    /// Worker pool size; None uses one worker per available core
    pub workers: Option<usize>,
    /// Item count above which parallel execution activates
    pub parallel_threshold: usize,
    /// Run on a reproducible sample of the catalog instead of all items
    pub sample_size: Option<usize>,
    /// Seed for catalog sampling
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: None,
            parallel_threshold: 50,
            sample_size: None,
            seed: 42,
        }
    }
}
