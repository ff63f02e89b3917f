//! Forecasting model variants and the tournament registry
//!
//! Every variant implements one capability: fit on a training window and
//! forecast a number of future months. Holdout error is computed centrally
//! by the orchestrator, and so is sanitization; models return raw values.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub mod arima;
pub mod croston;
pub mod exponential_smoothing;
pub mod moving_average;
pub mod sarima;
pub mod seasonal;
pub mod theta;

use self::arima::AutoArima;
use self::croston::Croston;
use self::exponential_smoothing::Holt;
use self::moving_average::SimpleMovingAverage;
use self::sarima::SeasonalArima;
use self::seasonal::SeasonalDecomposition;
use self::theta::Theta;

/// The closed set of model variants that can compete in a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Simple moving average
    Sma,
    /// Double exponential smoothing
    Holt,
    /// Croston's method for intermittent demand
    Croston,
    /// Theta decomposition
    Theta,
    /// Auto-order ARIMA
    Arima,
    /// Seasonal ARIMA
    Sarima,
    /// Seasonal/trend additive decomposition
    Seasonal,
}

impl ModelKind {
    /// Stable lowercase name used in output tables and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Sma => "sma",
            ModelKind::Holt => "holt",
            ModelKind::Croston => "croston",
            ModelKind::Theta => "theta",
            ModelKind::Arima => "arima",
            ModelKind::Sarima => "sarima",
            ModelKind::Seasonal => "seasonal",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform forecasting capability implemented by every variant.
pub trait DemandModel: fmt::Debug + Send + Sync {
    /// Fit on the training window and forecast `horizon` future months.
    ///
    /// Returns an error on insufficient history or a failed fit; the caller
    /// decides whether to walk the fallback chain.
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>>;
}

/// One registered variant together with its declared fallback chain.
#[derive(Debug)]
pub struct ModelEntry {
    /// Which variant this is
    pub kind: ModelKind,
    /// Training months below which the tournament pre-filter skips this
    /// variant entirely
    pub min_history: usize,
    /// Variant this one defers to on insufficient history or fit failure
    pub fallback: Option<ModelKind>,
    /// Competes only on intermittent demand (zero-month share above the
    /// documented threshold)
    pub only_intermittent: bool,
    model: Box<dyn DemandModel>,
}

impl ModelEntry {
    /// The variant's implementation
    pub fn model(&self) -> &dyn DemandModel {
        self.model.as_ref()
    }
}

/// Ordered, immutable set of competing models.
///
/// Iteration order is fixed at construction, simplest model first, and it
/// is the tie-break rule: when two variants score the same holdout error,
/// the one registered earlier wins. The same order applies to every item,
/// which keeps tie-breaks and logs reproducible across runs.
#[derive(Debug)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    /// All seven variants, ordered simplest-first
    pub fn full(cfg: &ForecastConfig) -> Self {
        let thresholds = &cfg.thresholds;
        Self {
            entries: vec![
                ModelEntry {
                    kind: ModelKind::Sma,
                    min_history: 0,
                    fallback: None,
                    only_intermittent: false,
                    model: Box::new(SimpleMovingAverage::default()),
                },
                ModelEntry {
                    kind: ModelKind::Holt,
                    min_history: 0,
                    fallback: Some(ModelKind::Sma),
                    only_intermittent: false,
                    model: Box::new(Holt::default()),
                },
                ModelEntry {
                    kind: ModelKind::Croston,
                    min_history: thresholds.croston,
                    fallback: Some(ModelKind::Sma),
                    only_intermittent: true,
                    model: Box::new(Croston::default()),
                },
                ModelEntry {
                    kind: ModelKind::Theta,
                    min_history: thresholds.theta,
                    fallback: Some(ModelKind::Sma),
                    only_intermittent: false,
                    model: Box::new(Theta::default()),
                },
                ModelEntry {
                    kind: ModelKind::Arima,
                    min_history: thresholds.arima,
                    fallback: Some(ModelKind::Sma),
                    only_intermittent: false,
                    model: Box::new(AutoArima::default()),
                },
                ModelEntry {
                    kind: ModelKind::Sarima,
                    min_history: thresholds.sarima,
                    fallback: Some(ModelKind::Arima),
                    only_intermittent: false,
                    model: Box::new(SeasonalArima::default()),
                },
                ModelEntry {
                    kind: ModelKind::Seasonal,
                    min_history: thresholds.seasonal,
                    fallback: Some(ModelKind::Sma),
                    only_intermittent: false,
                    model: Box::new(SeasonalDecomposition::new(cfg.interval_width)),
                },
            ],
        }
    }

    /// The restricted set used when advanced models are disabled
    pub fn restricted() -> Self {
        Self {
            entries: vec![
                ModelEntry {
                    kind: ModelKind::Sma,
                    min_history: 0,
                    fallback: None,
                    only_intermittent: false,
                    model: Box::new(SimpleMovingAverage::default()),
                },
                ModelEntry {
                    kind: ModelKind::Holt,
                    min_history: 0,
                    fallback: Some(ModelKind::Sma),
                    only_intermittent: false,
                    model: Box::new(Holt::default()),
                },
            ],
        }
    }

    /// Build the registry selected by the configuration
    pub fn from_config(cfg: &ForecastConfig) -> Self {
        if cfg.use_advanced_models {
            Self::full(cfg)
        } else {
            Self::restricted()
        }
    }

    /// Registered variants in competition order
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Look up one variant's registration
    pub fn entry(&self, kind: ModelKind) -> Option<&ModelEntry> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    /// Registered variant kinds in competition order
    pub fn kinds(&self) -> Vec<ModelKind> {
        self.entries.iter().map(|entry| entry.kind).collect()
    }

    /// Forecast with `kind`, walking its declared fallback chain on
    /// insufficient history or fit failure.
    ///
    /// The chain terminates at the moving average, which accepts any
    /// training length; an error here means the starting variant is not
    /// registered or its chain is broken.
    pub fn forecast(&self, kind: ModelKind, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        let mut current = kind;
        loop {
            let entry = self.entry(current).ok_or_else(|| {
                ForecastError::FitFailure(format!("model {current} is not registered"))
            })?;
            if train.len() >= entry.min_history {
                match entry.model.fit_forecast(train, horizon) {
                    Ok(values) => return Ok(values),
                    Err(err) => {
                        debug!(model = %current, %err, "model fit failed, following fallback");
                    }
                }
            } else {
                debug!(
                    model = %current,
                    have = train.len(),
                    need = entry.min_history,
                    "insufficient history, following fallback"
                );
            }
            match entry.fallback {
                Some(next) => current = next,
                None => {
                    return Err(ForecastError::FitFailure(format!(
                        "model {kind} and its fallback chain produced no forecast"
                    )))
                }
            }
        }
    }

    /// The declared fallback chain starting at `kind`, for inspection
    pub fn chain(&self, kind: ModelKind) -> Vec<ModelKind> {
        let mut chain = vec![kind];
        let mut current = kind;
        while let Some(entry) = self.entry(current) {
            match entry.fallback {
                Some(next) => {
                    chain.push(next);
                    current = next;
                }
                None => break,
            }
        }
        chain
    }
}
