//! Monthly demand series construction and train/test splitting

use crate::data::SalesHistory;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Zero-month share above which a series is considered intermittent demand
pub const INTERMITTENT_ZERO_RATIO: f64 = 0.3;

/// First day of the month containing `date`
pub fn month_floor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

/// First day of the month `n` months after the month containing `date`
pub fn add_months(date: NaiveDate, n: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + n as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// A complete, gap-filled monthly demand series for one item.
///
/// Every month between the first and last observed month is present;
/// months with no transactions hold zero demand. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct DemandSeries {
    months: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DemandSeries {
    /// Aggregate an item's transactions by calendar month and reindex to a
    /// contiguous monthly range.
    ///
    /// An item with no transactions yields an empty series; callers treat
    /// that as insufficient data, not as an error.
    pub fn build(history: &SalesHistory, item_code: &str) -> Self {
        let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, quantity) in history.transactions(item_code) {
            *by_month.entry(month_floor(*date)).or_insert(0.0) += quantity;
        }
        let (first, last) = match (by_month.keys().next(), by_month.keys().next_back()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                return Self {
                    months: Vec::new(),
                    values: Vec::new(),
                }
            }
        };

        let mut months = Vec::new();
        let mut values = Vec::new();
        let mut current = first;
        loop {
            months.push(current);
            values.push(by_month.get(&current).copied().unwrap_or(0.0));
            if current == last {
                break;
            }
            current = add_months(current, 1);
        }
        Self { months, values }
    }

    /// Build a series directly from contiguous monthly values starting at
    /// `start`'s month.
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Self {
        let first = month_floor(start);
        let months = (0..values.len() as u32)
            .map(|k| add_months(first, k))
            .collect();
        Self { months, values }
    }

    /// Number of months in the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no months at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Monthly demand quantities, oldest first
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First day of each month, aligned with `values`
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    /// First month of the series, if any
    pub fn first_month(&self) -> Option<NaiveDate> {
        self.months.first().copied()
    }

    /// Last month of the series, if any
    pub fn last_month(&self) -> Option<NaiveDate> {
        self.months.last().copied()
    }

    /// Mean monthly demand; zero for an empty series
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population standard deviation of monthly demand
    pub fn std_dev(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64;
        variance.sqrt()
    }

    /// Coefficient of variation; None when mean demand is not positive
    pub fn cv(&self) -> Option<f64> {
        let mean = self.mean();
        (mean > 0.0).then(|| self.std_dev() / mean)
    }

    /// Share of months with zero demand
    pub fn zero_ratio(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let zeros = self.values.iter().filter(|v| **v == 0.0).count();
        zeros as f64 / self.values.len() as f64
    }

    /// Whether the demand pattern is intermittent (zero-month share above
    /// [`INTERMITTENT_ZERO_RATIO`]). Callers use this to reason about
    /// Croston's method; the tournament itself always lets Croston compete.
    pub fn is_intermittent(&self) -> bool {
        self.zero_ratio() > INTERMITTENT_ZERO_RATIO
    }

    /// Partition into training and holdout windows.
    ///
    /// Fewer than 3 months: everything is training data and the holdout is
    /// empty. Otherwise the holdout holds at least 2 observations and the
    /// training window at least 1, with the boundary at `train_ratio`.
    pub fn split(&self, train_ratio: f64) -> TrainTestSplit<'_> {
        let n = self.values.len();
        if n < 3 {
            return TrainTestSplit {
                train: &self.values,
                test: &[],
            };
        }
        let ratio = train_ratio.clamp(0.0, 1.0);
        let mut test_len = (n as f64 * (1.0 - ratio)).round() as usize;
        test_len = test_len.max(2).min(n - 1);
        TrainTestSplit {
            train: &self.values[..n - test_len],
            test: &self.values[n - test_len..],
        }
    }
}

/// Training/holdout partition of a demand series.
#[derive(Debug, Clone, Copy)]
pub struct TrainTestSplit<'a> {
    /// Months the models fit on
    pub train: &'a [f64],
    /// Held-out months the models are scored against
    pub test: &'a [f64],
}
