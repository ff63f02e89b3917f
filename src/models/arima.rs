//! ARIMA models with automatic order selection

use crate::error::{ForecastError, Result};
use crate::models::DemandModel;
use tracing::debug;

/// Grid bounds for automatic order selection
const MAX_P: usize = 3;
const MAX_Q: usize = 3;
const MAX_D: usize = 1;

/// ARIMA(p,d,q) for monthly demand.
///
/// AR coefficients come from the Yule-Walker equations solved with
/// Levinson-Durbin; MA coefficients from residual autocorrelation with a
/// second refinement pass over the residuals. All estimation is
/// closed-form, so a fit is deterministic and bounded.
#[derive(Debug, Clone)]
pub struct Arima {
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// Fitted AR coefficients
    ar_coeffs: Vec<f64>,
    /// Fitted MA coefficients
    ma_coeffs: Vec<f64>,
    /// Mean of the differenced series
    constant: f64,
    /// Original data, kept for undifferencing
    original: Vec<f64>,
    /// Differenced data
    differenced: Vec<f64>,
    /// Residuals from fitting
    residuals: Vec<f64>,
    /// Akaike information criterion of the fit
    aic: f64,
    /// Whether the model has been fitted
    fitted: bool,
}

impl Arima {
    /// Create a new unfitted ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > 10 {
            return Err(ForecastError::InvalidParameter(
                "AR order must be <= 10".to_string(),
            ));
        }
        if d > 1 {
            return Err(ForecastError::InvalidParameter(
                "differencing order must be <= 1".to_string(),
            ));
        }
        if q > 10 {
            return Err(ForecastError::InvalidParameter(
                "MA order must be <= 10".to_string(),
            ));
        }

        Ok(Self {
            p,
            d,
            q,
            ar_coeffs: Vec::new(),
            ma_coeffs: Vec::new(),
            constant: 0.0,
            original: Vec::new(),
            differenced: Vec::new(),
            residuals: Vec::new(),
            aic: f64::INFINITY,
            fitted: false,
        })
    }

    /// Model orders (p, d, q)
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Whether the model has been fitted
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Akaike information criterion of the last fit
    pub fn aic(&self) -> Result<f64> {
        if !self.fitted {
            return Err(ForecastError::FitFailure(
                "model has not been fitted".to_string(),
            ));
        }
        Ok(self.aic)
    }

    /// Fit the model to a training series
    pub fn fit(&mut self, data: &[f64]) -> Result<()> {
        let min_required = self.p + self.d + self.q + 3;
        if data.len() < min_required {
            return Err(ForecastError::InsufficientData {
                required: min_required,
                actual: data.len(),
            });
        }
        if data.iter().any(|value| !value.is_finite()) {
            return Err(ForecastError::FitFailure(
                "training data contains non-finite values".to_string(),
            ));
        }

        self.original = data.to_vec();
        self.differenced = difference(data, self.d);

        let n = self.differenced.len();
        let start = self.p.max(self.q);
        if n <= start {
            return Err(ForecastError::InsufficientData {
                required: start + 1,
                actual: n,
            });
        }

        self.constant = self.differenced.iter().sum::<f64>() / n as f64;
        self.ar_coeffs = estimate_ar(&self.differenced, self.p);

        // first pass: AR-only residuals
        let mut residuals = vec![0.0; n];
        for i in self.p..n {
            let mut prediction = self.constant;
            for j in 0..self.p {
                prediction += self.ar_coeffs[j] * (self.differenced[i - j - 1] - self.constant);
            }
            residuals[i] = self.differenced[i] - prediction;
        }

        self.ma_coeffs = estimate_ma(&residuals, self.q);

        // second pass: refine residuals with the MA terms so the fit
        // quality actually reflects q
        let mut refined = vec![0.0; n];
        let mut sse = 0.0;
        for i in start..n {
            let mut prediction = self.constant;
            for j in 0..self.p {
                prediction += self.ar_coeffs[j] * (self.differenced[i - j - 1] - self.constant);
            }
            for k in 0..self.q {
                prediction += self.ma_coeffs[k] * residuals[i - k - 1];
            }
            refined[i] = self.differenced[i] - prediction;
            sse += refined[i] * refined[i];
        }
        self.residuals = refined;

        if self.ar_coeffs.iter().any(|c| !c.is_finite())
            || self.ma_coeffs.iter().any(|c| !c.is_finite())
        {
            return Err(ForecastError::FitFailure(
                "coefficient estimation diverged".to_string(),
            ));
        }

        let n_eff = (n - start) as f64;
        let parameters = (self.p + self.q + 1) as f64;
        self.aic = n_eff * (sse.max(1e-12) / n_eff).ln() + 2.0 * parameters;

        self.fitted = true;
        Ok(())
    }

    /// Forecast future values on the original scale
    pub fn predict(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::FitFailure(
                "model has not been fitted".to_string(),
            ));
        }
        if steps == 0 {
            return Ok(Vec::new());
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut extended_residuals = self.residuals.clone();

        // iterate forecasts on the differenced scale
        for _ in 0..steps {
            let mut forecast = self.constant;
            for j in 0..self.p {
                let idx = extended.len() - j - 1;
                forecast += self.ar_coeffs[j] * (extended[idx] - self.constant);
            }
            for k in 0..self.q {
                if extended_residuals.len() > k {
                    let idx = extended_residuals.len() - k - 1;
                    forecast += self.ma_coeffs[k] * extended_residuals[idx];
                }
            }
            extended.push(forecast);
            extended_residuals.push(0.0); // future residuals are zero
        }

        let forecasts: Vec<f64> = extended[n..].to_vec();
        Ok(undifference(&self.original, &forecasts, self.d))
    }
}

/// Apply differencing of the given order
fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        let mut differenced = Vec::with_capacity(result.len().saturating_sub(1));
        for i in 1..result.len() {
            differenced.push(result[i] - result[i - 1]);
        }
        result = differenced;
    }
    result
}

/// Reverse differencing to return forecasts to the original scale
fn undifference(original: &[f64], forecasts: &[f64], order: usize) -> Vec<f64> {
    if order == 0 || original.is_empty() || forecasts.is_empty() {
        return forecasts.to_vec();
    }

    let last_value = original[original.len() - 1];
    let mut cumsum = vec![last_value + forecasts[0]];
    for i in 1..forecasts.len() {
        cumsum.push(cumsum[i - 1] + forecasts[i]);
    }
    cumsum
}

/// Yule-Walker AR estimation via Levinson-Durbin
fn estimate_ar(data: &[f64], p: usize) -> Vec<f64> {
    if p == 0 {
        return Vec::new();
    }

    let n = data.len();
    let mean: f64 = data.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = data.iter().map(|value| value - mean).collect();

    let mut autocorr = vec![0.0; p + 1];
    for k in 0..=p {
        let mut sum = 0.0;
        for i in k..n {
            sum += centered[i] * centered[i - k];
        }
        autocorr[k] = sum / n as f64;
    }

    let mut coeffs = vec![0.0; p];
    if autocorr[0].abs() > 1e-10 {
        coeffs[0] = autocorr[1] / autocorr[0];

        for k in 1..p {
            let mut sum = autocorr[k + 1];
            for j in 0..k {
                sum -= coeffs[j] * autocorr[k - j];
            }

            let mut denom = autocorr[0];
            for j in 0..k {
                denom -= coeffs[j] * autocorr[j + 1];
            }

            if denom.abs() > 1e-10 {
                let new_coeff = sum / denom;
                let old_coeffs = coeffs.clone();
                coeffs[k] = new_coeff;
                for j in 0..k {
                    coeffs[j] = old_coeffs[j] - new_coeff * old_coeffs[k - 1 - j];
                }
            }
        }
    }

    coeffs
}

/// MA estimation from residual autocorrelation, bounded for stability
fn estimate_ma(residuals: &[f64], q: usize) -> Vec<f64> {
    if q == 0 || residuals.is_empty() {
        return vec![0.0; q];
    }

    let n = residuals.len();
    let mean: f64 = residuals.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = residuals.iter().map(|value| value - mean).collect();

    let mut coeffs = vec![0.0; q];
    let var: f64 = centered.iter().map(|value| value * value).sum::<f64>() / n as f64;

    if var.abs() > 1e-10 {
        for k in 0..q {
            let mut sum = 0.0;
            for i in (k + 1)..n {
                sum += centered[i] * centered[i - k - 1];
            }
            coeffs[k] = ((sum / n as f64) / var).clamp(-0.99, 0.99);
        }
    }

    coeffs
}

/// Automatic ARIMA: a bounded (p, d, q) grid scored by AIC, with a fixed
/// ARIMA(1,1,1) retry when no grid candidate fits.
#[derive(Debug, Clone, Default)]
pub struct AutoArima;

impl AutoArima {
    /// Best-AIC fit over the bounded order grid.
    ///
    /// Grid: p, q in [0, 3], d in [0, 1]. Ties keep the first candidate in
    /// scan order, so selection is deterministic.
    pub fn search(train: &[f64]) -> Result<Arima> {
        let mut best: Option<Arima> = None;
        for d in 0..=MAX_D {
            for p in 0..=MAX_P {
                for q in 0..=MAX_Q {
                    let mut candidate = match Arima::new(p, d, q) {
                        Ok(model) => model,
                        Err(_) => continue,
                    };
                    if candidate.fit(train).is_err() {
                        continue;
                    }
                    if !candidate.aic.is_finite() {
                        continue;
                    }
                    let improves = match &best {
                        Some(current) => candidate.aic < current.aic,
                        None => true,
                    };
                    if improves {
                        best = Some(candidate);
                    }
                }
            }
        }

        if let Some(model) = best {
            debug!(order = ?model.order(), aic = model.aic, "auto arima selected");
            return Ok(model);
        }

        // fixed-order retry before giving up
        let mut fallback = Arima::new(1, 1, 1)?;
        fallback.fit(train)?;
        Ok(fallback)
    }
}

impl DemandModel for AutoArima {
    fn fit_forecast(&self, train: &[f64], horizon: usize) -> Result<Vec<f64>> {
        let model = Self::search(train)?;
        model.predict(horizon)
    }
}
