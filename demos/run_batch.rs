//! Run a forecast tournament over a synthetic item catalog and print the
//! result table as CSV.
//!
//! ```bash
//! RUST_LOG=demand_forecast=debug cargo run --example run_batch
//! ```

use chrono::NaiveDate;
use demand_forecast::accuracy::AccuracyTracker;
use demand_forecast::batch::{run_batch_from_table, write_csv};
use demand_forecast::config::{BatchConfig, ForecastConfig};
use demand_forecast::data::{SalesHistory, SalesTable};
use demand_forecast::models::ModelRegistry;
use demand_forecast::series::add_months;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use tracing_subscriber::EnvFilter;

fn main() -> demand_forecast::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut rows: Vec<(NaiveDate, String, f64, String)> = Vec::new();

    // a small catalog of distinct demand shapes
    for i in 0..36u32 {
        let month = add_months(start, i);

        let steady = Poisson::new(60.0).unwrap().sample(&mut rng);
        rows.push((month, "PUMP-A".to_string(), steady, "MAIN".to_string()));

        let trending = Poisson::new(15.0 + i as f64 * 1.2).unwrap().sample(&mut rng);
        rows.push((month, "VALVE-B".to_string(), trending, "MAIN".to_string()));

        let level = 25.0 + 18.0 * (i as f64 * std::f64::consts::TAU / 12.0).sin().abs();
        let seasonal = Poisson::new(level).unwrap().sample(&mut rng);
        rows.push((month, "FILTER-C".to_string(), seasonal, "EAST".to_string()));

        if i % 4 == 0 {
            let sparse = 1.0 + Poisson::new(5.0).unwrap().sample(&mut rng);
            rows.push((month, "SEAL-D".to_string(), sparse, "EAST".to_string()));
        }
    }
    // one item too short to forecast, to show failure-as-data
    rows.push((add_months(start, 34), "NEW-E".to_string(), 9.0, "MAIN".to_string()));
    rows.push((add_months(start, 35), "NEW-E".to_string(), 12.0, "MAIN".to_string()));

    let borrowed: Vec<(NaiveDate, &str, f64, &str)> = rows
        .iter()
        .map(|(day, item, quantity, warehouse)| {
            (*day, item.as_str(), *quantity, warehouse.as_str())
        })
        .collect();
    let table = SalesTable::from_rows(&borrowed)?;

    let cfg = ForecastConfig::default();
    let records = run_batch_from_table(&table, &cfg, &BatchConfig::default())?;

    let registry = ModelRegistry::from_config(&cfg);
    write_csv(&records, &registry, std::io::stdout())?;

    // snapshot today's forecasts and show what reconciliation would report
    // once a few more months of sales come in
    let generated_on = add_months(start, 36);
    let mut tracker = AccuracyTracker::new();
    for record in &records {
        tracker.snapshot(record, generated_on);
    }

    let mut later = rows.clone();
    for i in 36..40u32 {
        let month = add_months(start, i);
        for item in ["PUMP-A", "VALVE-B", "FILTER-C", "SEAL-D"] {
            let demand = Poisson::new(35.0).unwrap().sample(&mut rng);
            later.push((month, item.to_string(), demand, "MAIN".to_string()));
        }
    }
    let history = SalesHistory::from_records(
        &later
            .iter()
            .map(|(day, item, quantity, _)| (*day, item.as_str(), *quantity))
            .collect::<Vec<_>>(),
    );

    println!();
    for accuracy in tracker.reconcile(&history, add_months(start, 41)) {
        println!("{}", accuracy.to_json()?);
    }

    Ok(())
}
