//! End-to-end: synthetic catalog -> batch tournament -> snapshot ->
//! reconciliation against later sales.

use chrono::NaiveDate;
use demand_forecast::accuracy::AccuracyTracker;
use demand_forecast::batch::{run_batch_from_table, write_csv};
use demand_forecast::config::{BatchConfig, ForecastConfig};
use demand_forecast::data::{SalesHistory, SalesTable};
use demand_forecast::models::ModelRegistry;
use demand_forecast::series::add_months;
use demand_forecast::tournament::TournamentOutcome;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Three years of synthetic transactions for a small catalog: steady,
/// trending, seasonal, and intermittent demand shapes.
fn synthetic_rows() -> Vec<(NaiveDate, String, f64, String)> {
    let mut rng = StdRng::seed_from_u64(2024);
    let start = date(2021, 1, 1);
    let mut rows = Vec::new();

    for i in 0..36u32 {
        let month = add_months(start, i);

        let steady = Poisson::new(40.0).unwrap();
        rows.push((month, "STEADY".to_string(), steady.sample(&mut rng), "WH1".to_string()));

        let trending = Poisson::new(10.0 + i as f64).unwrap();
        rows.push((month, "TRENDING".to_string(), trending.sample(&mut rng), "WH1".to_string()));

        let level = 30.0 + 20.0 * (i as f64 * std::f64::consts::TAU / 12.0).sin().abs();
        let seasonal = Poisson::new(level).unwrap();
        rows.push((month, "SEASONAL".to_string(), seasonal.sample(&mut rng), "WH2".to_string()));

        if i % 3 == 0 {
            let sparse = Poisson::new(6.0).unwrap();
            rows.push((month, "SPARSE".to_string(), 1.0 + sparse.sample(&mut rng), "WH2".to_string()));
        }
    }
    rows
}

#[test]
fn test_full_pipeline() {
    let rows = synthetic_rows();
    let borrowed: Vec<(NaiveDate, &str, f64, &str)> = rows
        .iter()
        .map(|(day, item, quantity, warehouse)| {
            (*day, item.as_str(), *quantity, warehouse.as_str())
        })
        .collect();
    let table = SalesTable::from_rows(&borrowed).unwrap();

    let cfg = ForecastConfig::default();
    let batch = BatchConfig::default();
    let records = run_batch_from_table(&table, &cfg, &batch).unwrap();

    // one row per item, everything in the catalog succeeds
    assert_eq!(records.len(), 4);
    for record in &records {
        assert_eq!(record.outcome, TournamentOutcome::Success);
        assert!(record.winning_model.is_some());
        let confidence = record.forecast_confidence_pct.unwrap();
        assert!((0.0..=100.0).contains(&confidence));
        for slot in record.forecast.iter().flatten() {
            assert!(slot.is_finite() && *slot >= 0.0);
        }
    }

    // identical input and configuration reproduce identical results
    let rerun = run_batch_from_table(&table, &cfg, &batch).unwrap();
    for (first, second) in records.iter().zip(&rerun) {
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    // export the result table
    let registry = ModelRegistry::from_config(&cfg);
    let mut buffer = Vec::new();
    write_csv(&records, &registry, &mut buffer).unwrap();
    assert_eq!(buffer.is_empty(), false);

    // snapshot everything, observe four more months of sales, reconcile
    let generated_on = date(2023, 12, 15);
    let mut tracker = AccuracyTracker::new();
    for record in &records {
        assert!(tracker.snapshot(record, generated_on));
    }

    let mut later_rows = rows.clone();
    let mut rng = StdRng::seed_from_u64(99);
    for i in 0..4u32 {
        let month = add_months(date(2024, 1, 1), i);
        for item in ["STEADY", "TRENDING", "SEASONAL", "SPARSE"] {
            let demand = Poisson::new(25.0).unwrap();
            later_rows.push((month, item.to_string(), demand.sample(&mut rng), "WH1".to_string()));
        }
    }
    let later: Vec<(NaiveDate, &str, f64)> = later_rows
        .iter()
        .map(|(day, item, quantity, _)| (*day, item.as_str(), *quantity))
        .collect();
    let history = SalesHistory::from_records(&later);

    let accuracy = tracker.reconcile(&history, date(2024, 5, 10));
    assert_eq!(accuracy.len(), 4);
    for record in &accuracy {
        // January through April 2024 have fully elapsed
        assert_eq!(record.months_compared, 4);
        assert!(record.rmse >= 0.0);
        assert!(record.mae >= 0.0);
        assert!(record.mape.is_some());
    }

    // too-recent reconciliation stays empty
    assert!(tracker.reconcile(&history, date(2023, 12, 30)).is_empty());
}

#[test]
fn test_config_serialization_round_trip() {
    let cfg = ForecastConfig::default();
    let json = serde_json::to_string(&cfg).unwrap();
    let back: ForecastConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.horizon, cfg.horizon);
    assert_eq!(back.use_advanced_models, cfg.use_advanced_models);
    assert_eq!(back.thresholds.sarima, cfg.thresholds.sarima);

    let batch = BatchConfig::default();
    let json = serde_json::to_string(&batch).unwrap();
    let back: BatchConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.parallel_threshold, batch.parallel_threshold);
    assert_eq!(back.seed, batch.seed);
}
