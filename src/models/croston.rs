//! Croston's method for intermittent demand

use crate::error::{ForecastError, Result};
use crate::models::DemandModel;

/// Smoothing parameter for the non-zero demand size estimate
const SIZE_ALPHA: f64 = 0.2;

/// Croston's method.
///
/// Splits intermittent demand into non-zero demand sizes and the gaps
/// between them (by month index), then forecasts a flat demand rate of
/// `size / max(avg_gap, 1)`. Needs at least two non-zero months to
/// estimate a gap.
#[derive(Debug, Clone, Default)]
pub struct Croston;

impl DemandModel for Croston {
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        let nonzero: Vec<(usize, f64)> = train
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, value)| *value != 0.0)
            .collect();
        if nonzero.len() < 2 {
            return Err(ForecastError::InsufficientData {
                required: 2,
                actual: nonzero.len(),
            });
        }

        // smoothed recent non-zero demand size
        let mut size = nonzero[0].1;
        for &(_, value) in &nonzero[1..] {
            size = SIZE_ALPHA * value + (1.0 - SIZE_ALPHA) * size;
        }

        // mean index gap between non-zero months
        let gap_sum: f64 = nonzero
            .windows(2)
            .map(|pair| (pair[1].0 - pair[0].0) as f64)
            .sum();
        let avg_gap = gap_sum / (nonzero.len() - 1) as f64;

        let rate = size / avg_gap.max(1.0);
        if !rate.is_finite() {
            return Err(ForecastError::FitFailure(
                "demand rate is not finite".to_string(),
            ));
        }
        Ok(vec![rate; horizon])
    }
}
