//! Forecast accuracy tracking and reconciliation
//!
//! Snapshots of tournament forecasts are stored append-only and later
//! compared against realized sales, once enough calendar time has passed
//! for forecast months to complete.

use crate::data::SalesHistory;
use crate::error::Result;
use crate::metrics::{self, TRACKING_SIGNAL_RED_FLAG};
use crate::models::ModelKind;
use crate::series::{add_months, month_floor};
use crate::tournament::TournamentRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A stored forecast awaiting reconciliation
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSnapshot {
    pub item_code: String,
    /// Day the forecast was generated; month offsets count from its month
    pub generated_on: NaiveDate,
    pub winning_model: ModelKind,
    pub forecast: Vec<f64>,
}

/// Reconciliation of one snapshot against realized sales
#[derive(Debug, Clone, Serialize)]
pub struct AccuracyRecord {
    pub item_code: String,
    pub generated_on: NaiveDate,
    pub winning_model: ModelKind,
    /// Fully elapsed forecast months that were compared
    pub months_compared: usize,
    /// None when every compared month had zero actual demand
    pub mape: Option<f64>,
    pub rmse: f64,
    /// Mean signed error; positive means over-forecast
    pub bias: f64,
    pub mae: f64,
    /// None when MAE is zero (a perfect forecast has no signal to track)
    pub tracking_signal: Option<f64>,
    pub total_forecast: f64,
    pub total_actual: f64,
}

impl AccuracyRecord {
    /// Whether the tracking signal indicates systematic bias
    pub fn is_flagged(&self) -> bool {
        self.tracking_signal
            .map_or(false, |signal| signal.abs() > TRACKING_SIGNAL_RED_FLAG)
    }

    /// Serialize the record as a JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Append-only store of forecast snapshots with reconciliation against
/// later sales.
#[derive(Debug, Clone, Default)]
pub struct AccuracyTracker {
    snapshots: Vec<ForecastSnapshot>,
}

impl AccuracyTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a successful tournament record's forecast, keyed by
    /// (item, generation date).
    ///
    /// Returns false (and stores nothing) for records without a winner.
    pub fn snapshot(&mut self, record: &TournamentRecord, generated_on: NaiveDate) -> bool {
        let Some(winning_model) = record.winning_model else {
            return false;
        };
        self.snapshots.push(ForecastSnapshot {
            item_code: record.item_code.clone(),
            generated_on,
            winning_model,
            forecast: record.forecast_values(),
        });
        true
    }

    /// Stored snapshots, oldest first
    pub fn snapshots(&self) -> &[ForecastSnapshot] {
        &self.snapshots
    }

    /// Compare every snapshot with at least one fully elapsed forecast
    /// month against realized sales as of `as_of`.
    ///
    /// Snapshots too recent to have a complete forecast month produce no
    /// record; reconciliation being unavailable is absence, not an error.
    pub fn reconcile(&self, history: &SalesHistory, as_of: NaiveDate) -> Vec<AccuracyRecord> {
        self.snapshots
            .iter()
            .filter_map(|snapshot| reconcile_snapshot(snapshot, history, as_of))
            .collect()
    }
}

fn reconcile_snapshot(
    snapshot: &ForecastSnapshot,
    history: &SalesHistory,
    as_of: NaiveDate,
) -> Option<AccuracyRecord> {
    let current_month = month_floor(as_of);
    let base_month = month_floor(snapshot.generated_on);
    let actuals = monthly_actuals(history, &snapshot.item_code);

    // forecast month k (1-based offset from the snapshot month) is
    // comparable once the calendar has moved past it entirely
    let mut forecast = Vec::new();
    let mut actual = Vec::new();
    for (k, &value) in snapshot.forecast.iter().enumerate() {
        let month = add_months(base_month, k as u32 + 1);
        if month >= current_month {
            break;
        }
        forecast.push(value);
        actual.push(actuals.get(&month).copied().unwrap_or(0.0));
    }

    if forecast.is_empty() {
        debug!(
            item = %snapshot.item_code,
            generated_on = %snapshot.generated_on,
            "no fully elapsed forecast months to reconcile"
        );
        return None;
    }

    Some(AccuracyRecord {
        item_code: snapshot.item_code.clone(),
        generated_on: snapshot.generated_on,
        winning_model: snapshot.winning_model,
        months_compared: forecast.len(),
        mape: metrics::mape(&forecast, &actual),
        rmse: metrics::rmse(&forecast, &actual),
        bias: metrics::bias(&forecast, &actual),
        mae: metrics::mae(&forecast, &actual),
        tracking_signal: metrics::tracking_signal(&forecast, &actual),
        total_forecast: forecast.iter().sum(),
        total_actual: actual.iter().sum(),
    })
}

/// Realized demand summed by calendar month; months with no transactions
/// are simply absent and read as zero demand
fn monthly_actuals(history: &SalesHistory, item_code: &str) -> BTreeMap<NaiveDate, f64> {
    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, quantity) in history.transactions(item_code) {
        *by_month.entry(month_floor(*date)).or_insert(0.0) += quantity;
    }
    by_month
}
