//! Seasonal ARIMA forecasting for daily sales

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    check_min_points, check_unit_interval, normal_quantile, residual_sigma, widening_intervals,
    FittedModel, ForecastModel, ModelForecast,
};

const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Stationarity clamp for estimated coefficients
const COEFF_LIMIT: f64 = 0.99;

/// Seasonal ARIMA model with fixed orders (1,1,1)(1,1,0) and a
/// caller-supplied seasonal period
///
/// The series is seasonally differenced at the period, then first
/// differenced; AR, seasonal AR and MA coefficients are estimated from
/// the autocorrelations of the stationary remainder (the Yule-Walker
/// equations at order one), and forecasts are reintegrated in reverse.
#[derive(Debug, Clone)]
pub struct SeasonalArima {
    /// Name of the model
    name: String,
    /// Seasonal cycle length
    period: usize,
    /// Confidence level for prediction intervals
    confidence_level: f64,
}

/// Fitted seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct FittedSeasonalArima {
    /// Name of the model
    name: String,
    /// Seasonal cycle length
    period: usize,
    /// Non-seasonal AR(1) coefficient
    ar: f64,
    /// Seasonal AR(1) coefficient at the period lag
    seasonal_ar: f64,
    /// Non-seasonal MA(1) coefficient
    ma: f64,
    /// Doubly differenced (stationary) history
    stationary: Vec<f64>,
    /// Last value of the seasonally differenced series
    last_seasonal_diff: f64,
    /// Last `period` original values, oldest first
    history_tail: Vec<f64>,
    /// Last in-sample innovation
    last_innovation: f64,
    /// One-step residual spread on the stationary scale
    sigma: f64,
    /// Normal quantile matching the confidence level
    z: f64,
}

impl SeasonalArima {
    /// Create a model for the given seasonal period
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(ForecastError::invalid_parameter(
                "seasonal_period",
                format!("{} is too short for a seasonal cycle", period),
            ));
        }

        Ok(Self {
            name: format!("SARIMA(1,1,1)(1,1,0)[{}]", period),
            period,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        })
    }

    /// Set the confidence level used for prediction intervals
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        check_unit_interval("confidence_level", confidence_level)?;
        self.confidence_level = confidence_level;
        Ok(self)
    }

    /// Series length required to fit: two full seasonal cycles
    pub fn min_points(&self) -> usize {
        self.period * 2
    }
}

impl ForecastModel for SeasonalArima {
    type Fitted = FittedSeasonalArima;

    fn fit(&self, series: &SalesSeries) -> Result<Self::Fitted> {
        let data = series.values();
        check_min_points(self.min_points(), data.len())?;

        // Seasonal difference at the period, then first difference
        let seasonal_diff = difference_at(data, self.period);
        let stationary = difference_at(&seasonal_diff, 1);
        if stationary.len() < 2 {
            return Err(ForecastError::InsufficientData {
                required: self.period + 3,
                actual: data.len(),
            });
        }

        // Order-one Yule-Walker estimates from the autocorrelations
        let ar = clamp_coeff(autocorrelation(&stationary, 1));
        let seasonal_ar = if stationary.len() > self.period {
            clamp_coeff(autocorrelation(&stationary, self.period))
        } else {
            0.0
        };

        // Innovations under the AR part, then the MA coefficient from
        // their lag-1 autocorrelation
        let mut innovations = Vec::with_capacity(stationary.len().saturating_sub(1));
        for t in 1..stationary.len() {
            let mut predicted = ar * stationary[t - 1];
            if t >= self.period {
                predicted += seasonal_ar * stationary[t - self.period];
            }
            innovations.push(stationary[t] - predicted);
        }
        let ma = clamp_coeff(autocorrelation(&innovations, 1));

        if !ar.is_finite() || !seasonal_ar.is_finite() || !ma.is_finite() {
            return Err(ForecastError::Convergence(
                "coefficient estimation produced non-finite values".to_string(),
            ));
        }

        let last_seasonal_diff = match seasonal_diff.last() {
            Some(&value) => value,
            None => {
                return Err(ForecastError::InsufficientData {
                    required: self.min_points(),
                    actual: data.len(),
                })
            }
        };

        Ok(FittedSeasonalArima {
            name: self.name.clone(),
            period: self.period,
            ar,
            seasonal_ar,
            ma,
            last_seasonal_diff,
            history_tail: data[data.len() - self.period..].to_vec(),
            last_innovation: innovations.last().copied().unwrap_or(0.0),
            sigma: residual_sigma(&innovations),
            z: normal_quantile(self.confidence_level)?,
            stationary,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedModel for FittedSeasonalArima {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let mut extended = self.stationary.clone();
        let mut last_seasonal_diff = self.last_seasonal_diff;
        let mut values = Vec::with_capacity(horizon);

        for step in 0..horizon {
            let t = extended.len();
            let mut next = self.ar * extended[t - 1];
            if t >= self.period {
                next += self.seasonal_ar * extended[t - self.period];
            }
            // Future innovations are zero; only the first step carries
            // the last observed one
            if step == 0 {
                next += self.ma * self.last_innovation;
            }
            extended.push(next);

            // Reintegrate: undo the first difference, then the
            // seasonal difference
            let seasonal_diff_next = last_seasonal_diff + next;
            last_seasonal_diff = seasonal_diff_next;
            let seasonal_base = if step < self.period {
                self.history_tail[step]
            } else {
                values[step - self.period]
            };
            values.push(seasonal_diff_next + seasonal_base);
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Convergence(
                "forecast recursion produced non-finite values".to_string(),
            ));
        }

        let intervals = widening_intervals(&values, self.sigma, self.z);
        ModelForecast::with_intervals(values, horizon, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Difference a series at the given lag
fn difference_at(data: &[f64], lag: usize) -> Vec<f64> {
    if data.len() <= lag {
        return Vec::new();
    }
    (lag..data.len()).map(|t| data[t] - data[t - lag]).collect()
}

/// Sample autocorrelation at the given lag, zero when the series has
/// no variance or too few points
fn autocorrelation(data: &[f64], lag: usize) -> f64 {
    let n = data.len();
    if n == 0 || lag >= n {
        return 0.0;
    }

    let mean = data.iter().sum::<f64>() / n as f64;
    let variance: f64 = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    if variance < f64::EPSILON {
        return 0.0;
    }

    let covariance: f64 = (0..n - lag)
        .map(|t| (data[t] - mean) * (data[t + lag] - mean))
        .sum::<f64>()
        / n as f64;

    covariance / variance
}

fn clamp_coeff(value: f64) -> f64 {
    value.clamp(-COEFF_LIMIT, COEFF_LIMIT)
}
