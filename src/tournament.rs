//! Per-item tournament orchestration
//!
//! For one item: build the monthly series, split it, run every eligible
//! model variant against the holdout window, keep the best performer, and
//! emit one record. Nothing in here propagates an error past the per-item
//! boundary; failures become data on the record.

use crate::config::ForecastConfig;
use crate::data::SalesHistory;
use crate::error::Result;
use crate::metrics;
use crate::models::{ModelKind, ModelRegistry};
use crate::series::DemandSeries;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Forecast slots carried on every record
pub const FORECAST_SLOTS: usize = 12;

/// Terminal state of one item's tournament. Exactly one holds per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentOutcome {
    /// A winner was selected and a forecast produced
    Success,
    /// The item's history is too short to score any model
    InsufficientData,
    /// Every eligible model failed to produce a scorable forecast
    AllModelsFailed,
}

impl fmt::Display for TournamentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TournamentOutcome::Success => "success",
            TournamentOutcome::InsufficientData => "insufficient_data",
            TournamentOutcome::AllModelsFailed => "all_models_failed",
        };
        f.write_str(label)
    }
}

/// Per-item tournament result.
///
/// Produced once per item per batch run and handed downstream by value;
/// consumers key by `item_code` rather than row position.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentRecord {
    pub item_code: String,
    pub outcome: TournamentOutcome,
    pub winning_model: Option<ModelKind>,
    pub forecast_horizon: usize,
    pub forecast_confidence_pct: Option<f64>,
    pub history_months: usize,
    pub train_months: usize,
    pub test_months: usize,
    pub avg_monthly_demand: Option<f64>,
    pub demand_cv: Option<f64>,
    /// Twelve forecast slots; months beyond the forecast horizon stay null.
    /// Null means "no forecast", which is distinct from forecasting zero
    /// demand.
    pub forecast: [Option<f64>; FORECAST_SLOTS],
    /// Holdout RMSE per scored model, in registry order
    pub model_errors: Vec<(ModelKind, f64)>,
    /// Present only on non-success outcomes
    pub failure_reason: Option<String>,
}

impl TournamentRecord {
    /// Whether the tournament selected a winner
    pub fn is_success(&self) -> bool {
        self.outcome == TournamentOutcome::Success
    }

    /// Holdout RMSE for one model, if it was scored
    pub fn error_for(&self, kind: ModelKind) -> Option<f64> {
        self.model_errors
            .iter()
            .find(|(model, _)| *model == kind)
            .map(|(_, error)| *error)
    }

    /// The populated forecast values, in month order
    pub fn forecast_values(&self) -> Vec<f64> {
        self.forecast.iter().filter_map(|slot| *slot).collect()
    }

    /// Serialize the record as a JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Replace non-finite values with zero and clamp negatives, in place.
///
/// Applied once, centrally, to every model's output; no variant is
/// trusted to sanitize itself. Demand forecasts are never negative and
/// never NaN/Inf downstream of this.
pub fn sanitize(values: &mut [f64]) {
    for value in values.iter_mut() {
        if !value.is_finite() || *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// Run the tournament for one item.
///
/// Always returns a record; the terminal state and failure reason encode
/// anything that went wrong.
pub fn run_item(
    item_code: &str,
    history: &SalesHistory,
    registry: &ModelRegistry,
    cfg: &ForecastConfig,
) -> TournamentRecord {
    let series = DemandSeries::build(history, item_code);
    let horizon = cfg.horizon.min(FORECAST_SLOTS);

    let mut record = TournamentRecord {
        item_code: item_code.to_string(),
        outcome: TournamentOutcome::InsufficientData,
        winning_model: None,
        forecast_horizon: horizon,
        forecast_confidence_pct: None,
        history_months: series.len(),
        train_months: 0,
        test_months: 0,
        avg_monthly_demand: (!series.is_empty()).then(|| series.mean()),
        demand_cv: series.cv(),
        forecast: [None; FORECAST_SLOTS],
        model_errors: Vec::new(),
        failure_reason: None,
    };

    if series.len() < 3 {
        record.failure_reason = Some(format!("only {} months of history", series.len()));
        debug!(item = item_code, months = series.len(), "insufficient history");
        return record;
    }

    let split = series.split(cfg.train_ratio);
    record.train_months = split.train.len();
    record.test_months = split.test.len();
    if split.test.is_empty() {
        record.failure_reason = Some("empty holdout window".to_string());
        return record;
    }

    // score every eligible variant against the holdout window
    let intermittent = series.is_intermittent();
    let mut scored: Vec<(ModelKind, f64)> = Vec::new();
    for entry in registry.entries() {
        if split.train.len() < entry.min_history {
            debug!(
                item = item_code,
                model = %entry.kind,
                "pre-filtered: not enough training history"
            );
            continue;
        }
        if entry.only_intermittent && !intermittent {
            debug!(
                item = item_code,
                model = %entry.kind,
                "pre-filtered: demand is not intermittent"
            );
            continue;
        }
        match registry.forecast(entry.kind, split.train, split.test.len()) {
            Ok(mut forecast) => {
                sanitize(&mut forecast);
                scored.push((entry.kind, metrics::rmse(&forecast, split.test)));
            }
            Err(err) => {
                debug!(item = item_code, model = %entry.kind, %err, "model dropped");
            }
        }
    }
    record.model_errors = scored.clone();

    if scored.is_empty() {
        record.outcome = TournamentOutcome::AllModelsFailed;
        record.failure_reason = Some("no model produced a scorable forecast".to_string());
        warn!(item = item_code, "all models failed");
        return record;
    }

    // minimum holdout error wins; strict comparison keeps the
    // earliest-registered variant on ties
    let mut winner = scored[0];
    for &(kind, error) in &scored[1..] {
        if error < winner.1 {
            winner = (kind, error);
        }
    }

    let train_mean = mean(split.train);
    let confidence = if train_mean > 0.0 {
        (100.0 - winner.1 / train_mean * 100.0).clamp(0.0, 100.0)
    } else {
        50.0
    };

    match registry.forecast(winner.0, split.train, horizon) {
        Ok(mut forecast) => {
            sanitize(&mut forecast);
            for (slot, value) in record.forecast.iter_mut().zip(forecast.iter()) {
                *slot = Some(*value);
            }
            record.outcome = TournamentOutcome::Success;
            record.winning_model = Some(winner.0);
            record.forecast_confidence_pct = Some(confidence);
        }
        Err(err) => {
            record.outcome = TournamentOutcome::AllModelsFailed;
            record.failure_reason = Some(format!(
                "winner {} failed on the forecast horizon: {err}",
                winner.0
            ));
            warn!(item = item_code, model = %winner.0, %err, "winner re-forecast failed");
        }
    }
    record
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
