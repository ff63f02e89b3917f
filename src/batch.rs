//! Batch scheduling across an item catalog
//!
//! Runs the per-item tournament across many items, sequentially or on a
//! fixed-size worker pool. Each item is an independent, side-effect-free
//! unit of work reading the shared read-only sales index, so the execution
//! mode is purely a throughput choice and never changes per-item results.

use crate::config::{BatchConfig, ForecastConfig};
use crate::data::{SalesHistory, SalesTable};
use crate::error::Result;
use crate::models::ModelRegistry;
use crate::tournament::{self, TournamentRecord, FORECAST_SLOTS};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::io::Write;
use tracing::{info, warn};

/// How a batch is executed. Always chosen explicitly from configuration,
/// never inferred from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel,
}

/// Pick the execution mode for `item_count` items under `cfg`
pub fn execution_mode(item_count: usize, cfg: &BatchConfig) -> ExecutionMode {
    if cfg.parallel && item_count > cfg.parallel_threshold {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    }
}

/// Reproducible sample of an item list; the full list when `size` covers it
pub fn sample_items(items: &[String], size: usize, seed: u64) -> Vec<String> {
    if size >= items.len() {
        return items.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sampled: Vec<String> = items
        .choose_multiple(&mut rng, size)
        .cloned()
        .collect();
    sampled.sort();
    sampled
}

/// Run the tournament for every requested item.
///
/// Returns one record per item, failed items included as data. No item's
/// failure aborts the batch.
pub fn run_batch(
    items: &[String],
    history: &SalesHistory,
    cfg: &ForecastConfig,
    batch: &BatchConfig,
) -> Vec<TournamentRecord> {
    let selected: Vec<String> = match batch.sample_size {
        Some(size) => sample_items(items, size, batch.seed),
        None => items.to_vec(),
    };

    let registry = ModelRegistry::from_config(cfg);
    let mode = execution_mode(selected.len(), batch);
    info!(items = selected.len(), ?mode, "starting forecast batch");

    let records = match mode {
        ExecutionMode::Sequential => selected
            .iter()
            .map(|item| tournament::run_item(item, history, &registry, cfg))
            .collect(),
        ExecutionMode::Parallel => {
            run_parallel(&selected, history, &registry, cfg, batch.workers)
        }
    };

    info!(items = records.len(), "forecast batch complete");
    records
}

fn run_parallel(
    items: &[String],
    history: &SalesHistory,
    registry: &ModelRegistry,
    cfg: &ForecastConfig,
    workers: Option<usize>,
) -> Vec<TournamentRecord> {
    let run = || -> Vec<TournamentRecord> {
        items
            .par_iter()
            .map(|item| tournament::run_item(item, history, registry, cfg))
            .collect()
    };
    match workers {
        Some(count) => match rayon::ThreadPoolBuilder::new().num_threads(count).build() {
            Ok(pool) => pool.install(run),
            Err(err) => {
                warn!(%err, "could not build worker pool, using the global pool");
                run()
            }
        },
        None => run(),
    }
}

/// Validate a transaction table, index it, and run the tournament across
/// every item in the catalog.
///
/// The only fatal condition is a malformed table; everything after that
/// point is recorded per item.
pub fn run_batch_from_table(
    table: &SalesTable,
    cfg: &ForecastConfig,
    batch: &BatchConfig,
) -> Result<Vec<TournamentRecord>> {
    let history = SalesHistory::from_table(table)?;
    let items = history.item_codes();
    Ok(run_batch(&items, &history, cfg, batch))
}

/// Write the batch result table as CSV: one row per record, the fixed
/// record columns, twelve forecast slots, and one `error_<model>` column
/// per registered model.
pub fn write_csv<W: Write>(
    records: &[TournamentRecord],
    registry: &ModelRegistry,
    writer: W,
) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = [
        "item_code",
        "outcome",
        "winning_model",
        "forecast_horizon",
        "forecast_confidence_pct",
        "history_months",
        "train_months",
        "test_months",
        "avg_monthly_demand",
        "demand_cv",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect();
    for month in 1..=FORECAST_SLOTS {
        header.push(format!("forecast_month_{month}"));
    }
    for entry in registry.entries() {
        header.push(format!("error_{}", entry.kind));
    }
    header.push("failure_reason".to_string());
    out.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = vec![
            record.item_code.clone(),
            record.outcome.to_string(),
            record
                .winning_model
                .map(|kind| kind.to_string())
                .unwrap_or_default(),
            record.forecast_horizon.to_string(),
            format_opt(record.forecast_confidence_pct),
            record.history_months.to_string(),
            record.train_months.to_string(),
            record.test_months.to_string(),
            format_opt(record.avg_monthly_demand),
            format_opt(record.demand_cv),
        ];
        for slot in &record.forecast {
            row.push(format_opt(*slot));
        }
        for entry in registry.entries() {
            row.push(format_opt(record.error_for(entry.kind)));
        }
        row.push(record.failure_reason.clone().unwrap_or_default());
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

fn format_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
