//! Forecasting backends for daily sales series

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;

/// Raw model output: predicted values for consecutive future days,
/// optionally with prediction intervals
///
/// Output is date-free; the adapter attaches calendar dates.
#[derive(Debug, Clone)]
pub struct ModelForecast {
    /// Forecasted values, one per future day
    pub(crate) values: Vec<f64>,
    /// Lower/upper prediction bounds per value (optional)
    pub(crate) intervals: Option<Vec<(f64, f64)>>,
}

impl ModelForecast {
    /// Create a forecast without intervals
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::ShapeMismatch(format!(
                "forecast produced {} values for horizon {}",
                values.len(),
                horizon
            )));
        }

        Ok(Self {
            values,
            intervals: None,
        })
    }

    /// Create a forecast with prediction intervals
    pub fn with_intervals(
        values: Vec<f64>,
        horizon: usize,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        if intervals.len() != values.len() {
            return Err(ForecastError::ShapeMismatch(format!(
                "{} intervals against {} values",
                intervals.len(),
                values.len()
            )));
        }

        let mut forecast = Self::new(values, horizon)?;
        forecast.intervals = Some(intervals);
        Ok(forecast)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the prediction intervals, if the model produced them
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Number of forecasted days
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the forecast is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A model fitted to a sales series
pub trait FittedModel: Debug {
    /// Forecast the given number of future days
    fn forecast(&self, horizon: usize) -> Result<ModelForecast>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted to a sales series
///
/// Each model owns its parameter validation and minimum-data rule and
/// reports violations through the shared error types.
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model to a sales series
    fn fit(&self, series: &SalesSeries) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Reject a series shorter than the model's minimum
pub(crate) fn check_min_points(required: usize, actual: usize) -> Result<()> {
    if actual < required {
        return Err(ForecastError::InsufficientData { required, actual });
    }
    Ok(())
}

/// Reject a parameter outside the open interval (0, 1)
pub(crate) fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ForecastError::invalid_parameter(
            name,
            format!("{} must be strictly between 0 and 1", value),
        ));
    }
    Ok(())
}

/// Two-sided standard normal quantile for a confidence level in (0, 1)
pub(crate) fn normal_quantile(confidence_level: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::Convergence(format!("standard normal unavailable: {}", e)))?;
    Ok(normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Root mean square of one-step in-sample residuals
pub(crate) fn residual_sigma(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let mean_square = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
    mean_square.sqrt()
}

/// Symmetric prediction intervals that widen with the forecast step
pub(crate) fn widening_intervals(values: &[f64], sigma: f64, z: f64) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(step, &value)| {
            let margin = z * sigma * ((step + 1) as f64).sqrt();
            (value - margin, value + margin)
        })
        .collect()
}

pub mod holt_winters;
pub mod seasonal_arima;
pub mod trend_season;
