//! Seasonal ARIMA at a fixed yearly period

use crate::error::{ForecastError, Result};
use crate::models::arima::Arima;
use crate::models::DemandModel;

/// Months per seasonal cycle
const PERIOD: usize = 12;

/// Seasonal ARIMA: seasonal differencing at period 12 around the
/// ARIMA(1,1,1) core.
///
/// The seasonal polynomial is realized by the seasonal difference itself;
/// forecasts are produced on the seasonally differenced scale and
/// reconstructed by adding back the value one period earlier. Needs two
/// full cycles of history.
#[derive(Debug, Clone, Default)]
pub struct SeasonalArima;

impl DemandModel for SeasonalArima {
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        if train.len() < 2 * PERIOD {
            return Err(ForecastError::InsufficientData {
                required: 2 * PERIOD,
                actual: train.len(),
            });
        }

        let seasonal: Vec<f64> = (PERIOD..train.len())
            .map(|i| train[i] - train[i - PERIOD])
            .collect();

        let mut core = Arima::new(1, 1, 1)?;
        core.fit(&seasonal)?;
        let differenced_forecast = core.predict(horizon)?;

        // each forecast month adds back the value one period earlier,
        // observed or already reconstructed
        let mut reconstructed = Vec::with_capacity(horizon);
        for (h, &value) in differenced_forecast.iter().enumerate() {
            let base = if h < PERIOD {
                train[train.len() - PERIOD + h]
            } else {
                reconstructed[h - PERIOD]
            };
            reconstructed.push(value + base);
        }

        if reconstructed.iter().any(|value: &f64| !value.is_finite()) {
            return Err(ForecastError::FitFailure(
                "seasonal reconstruction diverged".to_string(),
            ));
        }
        Ok(reconstructed)
    }
}
