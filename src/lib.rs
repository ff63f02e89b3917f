//! # Demand Forecast
//!
//! A Rust library for monthly inventory demand forecasting.
//!
//! ## Features
//!
//! - Gap-filled monthly demand series built from raw transaction rows
//! - Seven competing forecast models (moving average, Holt, Croston,
//!   theta, auto-ARIMA, seasonal ARIMA, seasonal decomposition) with
//!   declared, inspectable fallback chains
//! - Per-item tournaments scored on a held-out window, with confidence
//!   scoring and deterministic tie-breaking
//! - A batch scheduler with sequential or fixed-pool parallel execution
//! - Accuracy tracking that reconciles stored forecasts against later
//!   sales (MAPE, RMSE, bias, tracking signal)
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::batch::{run_batch_from_table, write_csv};
//! use demand_forecast::config::{BatchConfig, ForecastConfig};
//! use demand_forecast::data::SalesTable;
//! use demand_forecast::models::ModelRegistry;
//!
//! fn main() -> demand_forecast::error::Result<()> {
//!     // Load raw transactions: date, item_code, quantity, warehouse_code
//!     let table = SalesTable::from_csv("sales.csv")?;
//!
//!     // Run the model tournament across the whole catalog
//!     let cfg = ForecastConfig::default();
//!     let records = run_batch_from_table(&table, &cfg, &BatchConfig::default())?;
//!
//!     // Export the result table
//!     let registry = ModelRegistry::from_config(&cfg);
//!     write_csv(&records, &registry, std::io::stdout())?;
//!     Ok(())
//! }
//! ```

pub mod accuracy;
pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod series;
pub mod tournament;

// Re-export commonly used types
pub use crate::accuracy::{AccuracyRecord, AccuracyTracker, ForecastSnapshot};
pub use crate::config::{BatchConfig, ForecastConfig};
pub use crate::data::{SalesHistory, SalesTable};
pub use crate::error::ForecastError;
pub use crate::models::{DemandModel, ModelKind, ModelRegistry};
pub use crate::series::DemandSeries;
pub use crate::tournament::{TournamentOutcome, TournamentRecord};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
