//! Transaction table handling and the per-item sales index

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Columns the engine reads from the transaction table.
///
/// The shared input shape also carries `warehouse_code`; the engine accepts
/// it but never consumes it, so it is not required here.
pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "item_code", "quantity"];

/// In-memory transaction table backed by a polars DataFrame.
///
/// Any collaborator that produces the required columns is acceptable; the
/// table validates the shape at construction and nothing downstream ever
/// sees a malformed frame.
#[derive(Debug, Clone)]
pub struct SalesTable {
    df: DataFrame,
}

impl SalesTable {
    /// Load a transaction table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;
        Self::from_dataframe(df)
    }

    /// Adopt an existing DataFrame, validating the required columns
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let names = df.get_column_names();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !names.contains(column))
            .collect();
        if !missing.is_empty() {
            return Err(ForecastError::InvalidInput(format!(
                "transaction table is missing required columns: {}",
                missing.join(", ")
            )));
        }
        Ok(Self { df })
    }

    /// Build a table from typed rows of (date, item code, quantity,
    /// warehouse code).
    pub fn from_rows(rows: &[(NaiveDate, &str, f64, &str)]) -> Result<Self> {
        let dates: Vec<String> = rows
            .iter()
            .map(|(date, _, _, _)| date.format("%Y-%m-%d").to_string())
            .collect();
        let items: Vec<&str> = rows.iter().map(|(_, item, _, _)| *item).collect();
        let quantities: Vec<f64> = rows.iter().map(|(_, _, quantity, _)| *quantity).collect();
        let warehouses: Vec<&str> = rows.iter().map(|(_, _, _, warehouse)| *warehouse).collect();

        let df = DataFrame::new(vec![
            Series::new("date", dates),
            Series::new("item_code", items),
            Series::new("quantity", quantities),
            Series::new("warehouse_code", warehouses),
        ])?;
        Self::from_dataframe(df)
    }

    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Number of transaction rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

/// Read-only per-item transaction index built once from a validated table.
///
/// This is the only shared input a batch run touches: every tournament reads
/// it immutably, so parallel execution needs no locking.
#[derive(Debug, Clone, Default)]
pub struct SalesHistory {
    by_item: BTreeMap<String, Vec<(NaiveDate, f64)>>,
}

impl SalesHistory {
    /// Index a validated transaction table by item.
    ///
    /// Rows with an unparseable date, a null item code, or a quantity that
    /// cannot be coerced to a finite number are dropped.
    pub fn from_table(table: &SalesTable) -> Result<Self> {
        let df = table.dataframe();
        let dates = decode_dates(df.column("date")?)?;
        let items = decode_item_codes(df.column("item_code")?)?;
        let quantities = decode_quantities(df.column("quantity")?)?;

        let mut by_item: BTreeMap<String, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for ((date, item), quantity) in dates.into_iter().zip(items).zip(quantities) {
            let (Some(date), Some(item), Some(quantity)) = (date, item, quantity) else {
                continue;
            };
            by_item.entry(item).or_default().push((date, quantity));
        }
        Ok(Self { by_item })
    }

    /// Build an index directly from typed records (test/demo aid)
    pub fn from_records(records: &[(NaiveDate, &str, f64)]) -> Self {
        let mut by_item: BTreeMap<String, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for (date, item, quantity) in records {
            by_item
                .entry((*item).to_string())
                .or_default()
                .push((*date, *quantity));
        }
        Self { by_item }
    }

    /// All item codes present in the data, sorted
    pub fn item_codes(&self) -> Vec<String> {
        self.by_item.keys().cloned().collect()
    }

    /// Transactions for one item; empty when the item is unknown
    pub fn transactions(&self, item_code: &str) -> &[(NaiveDate, f64)] {
        self.by_item
            .get(item_code)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.by_item.len()
    }

    /// Whether the index holds no items
    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }
}

fn decode_dates(column: &Series) -> Result<Vec<Option<NaiveDate>>> {
    match column.dtype() {
        DataType::Utf8 => Ok(column
            .utf8()?
            .into_iter()
            .map(|value| value.and_then(parse_date))
            .collect()),
        DataType::Date => Ok(column
            .date()?
            .into_iter()
            .map(|value| {
                value.and_then(|days| {
                    NaiveDate::from_ymd_opt(1970, 1, 1)
                        .unwrap()
                        .checked_add_signed(chrono::Duration::days(days as i64))
                })
            })
            .collect()),
        DataType::Datetime(unit, _) => {
            let divisor = match *unit {
                TimeUnit::Nanoseconds => 1_000_000_000,
                TimeUnit::Microseconds => 1_000_000,
                TimeUnit::Milliseconds => 1_000,
            };
            Ok(column
                .datetime()?
                .into_iter()
                .map(|value| {
                    value.and_then(|ts| {
                        NaiveDateTime::from_timestamp_opt(ts / divisor, 0)
                            .map(|dt| dt.date())
                    })
                })
                .collect())
        }
        other => Err(ForecastError::InvalidInput(format!(
            "date column has unsupported type {other}"
        ))),
    }
}

/// Accepted textual date layouts, tried in order
fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    let trimmed = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn decode_item_codes(column: &Series) -> Result<Vec<Option<String>>> {
    match column.dtype() {
        DataType::Utf8 => Ok(column
            .utf8()?
            .into_iter()
            .map(|value| value.map(|item| item.trim().to_string()))
            .collect()),
        DataType::Int64 => Ok(column
            .i64()?
            .into_iter()
            .map(|value| value.map(|item| item.to_string()))
            .collect()),
        DataType::Int32 => Ok(column
            .i32()?
            .into_iter()
            .map(|value| value.map(|item| item.to_string()))
            .collect()),
        other => Err(ForecastError::InvalidInput(format!(
            "item_code column has unsupported type {other}"
        ))),
    }
}

fn decode_quantities(column: &Series) -> Result<Vec<Option<f64>>> {
    let raw: Vec<Option<f64>> = match column.dtype() {
        DataType::Float64 => column.f64()?.into_iter().collect(),
        DataType::Float32 => column
            .f32()?
            .into_iter()
            .map(|value| value.map(|quantity| quantity as f64))
            .collect(),
        DataType::Int64 => column
            .i64()?
            .into_iter()
            .map(|value| value.map(|quantity| quantity as f64))
            .collect(),
        DataType::Int32 => column
            .i32()?
            .into_iter()
            .map(|value| value.map(|quantity| quantity as f64))
            .collect(),
        DataType::UInt64 => column
            .u64()?
            .into_iter()
            .map(|value| value.map(|quantity| quantity as f64))
            .collect(),
        DataType::UInt32 => column
            .u32()?
            .into_iter()
            .map(|value| value.map(|quantity| quantity as f64))
            .collect(),
        DataType::Utf8 => column
            .utf8()?
            .into_iter()
            .map(|value| value.and_then(|quantity| quantity.trim().parse::<f64>().ok()))
            .collect(),
        other => {
            return Err(ForecastError::InvalidInput(format!(
                "quantity column has unsupported type {other}"
            )))
        }
    };
    // coercion drops non-finite quantities along with unparseable ones
    Ok(raw
        .into_iter()
        .map(|value| value.filter(|quantity| quantity.is_finite()))
        .collect())
}
