use chrono::NaiveDate;
use demand_forecast::batch::{
    execution_mode, run_batch, run_batch_from_table, sample_items, write_csv, ExecutionMode,
};
use demand_forecast::config::{BatchConfig, ForecastConfig};
use demand_forecast::data::{SalesHistory, SalesTable};
use demand_forecast::models::ModelRegistry;
use demand_forecast::tournament::TournamentOutcome;
use pretty_assertions::assert_eq;

fn date(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// A small catalog with distinct demand shapes, plus one item that is too
/// short to forecast
fn catalog() -> SalesHistory {
    let mut records: Vec<(NaiveDate, &str, f64)> = Vec::new();
    for i in 0..24usize {
        let year = 2022 + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        records.push((date(year, month), "STEADY", 50.0 + (i % 3) as f64));
        records.push((date(year, month), "TRENDING", 20.0 + i as f64 * 1.5));
        if i % 3 == 0 {
            records.push((date(year, month), "SPARSE", 9.0));
        }
    }
    records.push((date(2023, 11), "SHORT", 4.0));
    records.push((date(2023, 12), "SHORT", 6.0));
    SalesHistory::from_records(&records)
}

#[test]
fn test_execution_mode_selection() {
    let cfg = BatchConfig {
        parallel: true,
        workers: None,
        parallel_threshold: 10,
        sample_size: None,
        seed: 1,
    };
    assert_eq!(execution_mode(5, &cfg), ExecutionMode::Sequential);
    assert_eq!(execution_mode(10, &cfg), ExecutionMode::Sequential);
    assert_eq!(execution_mode(11, &cfg), ExecutionMode::Parallel);

    let disabled = BatchConfig {
        parallel: false,
        ..cfg
    };
    assert_eq!(execution_mode(1_000, &disabled), ExecutionMode::Sequential);
}

#[test]
fn test_batch_returns_one_row_per_item_including_failures() {
    let history = catalog();
    let items = history.item_codes();
    let records = run_batch(
        &items,
        &history,
        &ForecastConfig::default(),
        &BatchConfig::default(),
    );

    assert_eq!(records.len(), items.len());
    let short = records
        .iter()
        .find(|record| record.item_code == "SHORT")
        .unwrap();
    assert_eq!(short.outcome, TournamentOutcome::InsufficientData);
    assert_eq!(short.history_months, 2);

    let steady = records
        .iter()
        .find(|record| record.item_code == "STEADY")
        .unwrap();
    assert_eq!(steady.outcome, TournamentOutcome::Success);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let history = catalog();
    let items = history.item_codes();
    let cfg = ForecastConfig::default();

    let sequential = BatchConfig {
        parallel: false,
        ..BatchConfig::default()
    };
    let parallel = BatchConfig {
        parallel: true,
        parallel_threshold: 0,
        workers: Some(2),
        ..BatchConfig::default()
    };

    let seq_records = run_batch(&items, &history, &cfg, &sequential);
    let par_records = run_batch(&items, &history, &cfg, &parallel);

    assert_eq!(seq_records.len(), par_records.len());
    for (seq, par) in seq_records.iter().zip(&par_records) {
        assert_eq!(seq.to_json().unwrap(), par.to_json().unwrap());
    }
}

#[test]
fn test_sampling_is_reproducible() {
    let items: Vec<String> = (0..100).map(|i| format!("ITEM-{i:03}")).collect();

    let first = sample_items(&items, 10, 7);
    let second = sample_items(&items, 10, 7);
    assert_eq!(first, second);
    assert_eq!(first.len(), 10);

    let different_seed = sample_items(&items, 10, 8);
    assert_ne!(first, different_seed);

    // a sample at least as large as the catalog is the whole catalog
    assert_eq!(sample_items(&items, 200, 7), items);
}

#[test]
fn test_batch_honors_sample_size() {
    let history = catalog();
    let items = history.item_codes();
    let batch = BatchConfig {
        sample_size: Some(2),
        seed: 3,
        ..BatchConfig::default()
    };

    let records = run_batch(&items, &history, &ForecastConfig::default(), &batch);
    assert_eq!(records.len(), 2);
}

#[test]
fn test_invalid_table_fails_before_the_batch_starts() {
    use polars::prelude::*;

    let df = DataFrame::new(vec![
        Series::new("date", vec!["2024-01-01"]),
        Series::new("item_code", vec!["A"]),
        // quantity column missing entirely
    ])
    .unwrap();

    let err = SalesTable::from_dataframe(df).unwrap_err();
    assert!(err.to_string().contains("quantity"));
}

#[test]
fn test_batch_from_table_end_to_end() {
    let mut rows: Vec<(NaiveDate, &str, f64, &str)> = Vec::new();
    for i in 0..24usize {
        let year = 2022 + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        rows.push((date(year, month), "A-100", 30.0 + (i % 4) as f64, "WH1"));
        rows.push((date(year, month), "B-200", 5.0 * (i % 2) as f64 + 1.0, "WH2"));
    }
    let table = SalesTable::from_rows(&rows).unwrap();

    let records =
        run_batch_from_table(&table, &ForecastConfig::default(), &BatchConfig::default())
            .unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.is_success()));
}

#[test]
fn test_csv_export_shape() {
    let history = catalog();
    let items = history.item_codes();
    let cfg = ForecastConfig::default();
    let records = run_batch(&items, &history, &cfg, &BatchConfig::default());
    let registry = ModelRegistry::from_config(&cfg);

    let mut buffer: Vec<u8> = Vec::new();
    write_csv(&records, &registry, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), records.len() + 1);
    let header = lines[0];
    assert!(header.starts_with("item_code,outcome,winning_model"));
    assert!(header.contains("forecast_month_1"));
    assert!(header.contains("forecast_month_12"));
    assert!(header.contains("error_sma"));
    assert!(header.contains("error_seasonal"));
    assert!(header.ends_with("failure_reason"));
}
