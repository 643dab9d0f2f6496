//! Additive trend-plus-seasonality regression for daily sales

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    check_min_points, check_unit_interval, residual_sigma, FittedModel, ForecastModel,
    ModelForecast,
};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::f64::consts::PI;

/// Smallest series the trend fit accepts
pub const MIN_POINTS: usize = 3;

/// Weekly cycle used for the seasonal block
const SEASONAL_PERIOD: usize = 7;

/// Fourier order of the seasonal block
const FOURIER_ORDER: usize = 3;

/// Ridge term stabilizing the normal equations
const RIDGE: f64 = 1e-8;

/// Pivot threshold below which the system counts as singular
const SINGULAR_PIVOT: f64 = 1e-12;

const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Additive regression model: linear trend plus Fourier weekly
/// seasonality fitted to the detrended residuals
///
/// The seasonal block is only estimated when the series covers at
/// least two weekly cycles; shorter series get a trend-only fit.
#[derive(Debug, Clone)]
pub struct TrendSeason {
    /// Name of the model
    name: String,
    /// Confidence level for prediction intervals
    confidence_level: f64,
}

/// Fitted additive regression model
#[derive(Debug, Clone)]
pub struct FittedTrendSeason {
    /// Name of the model
    name: String,
    /// Number of observations the fit saw
    n: usize,
    /// Trend intercept
    intercept: f64,
    /// Trend slope per day
    slope: f64,
    /// Fourier coefficients, sin/cos interleaved; empty when the
    /// seasonal block was skipped
    fourier: Vec<f64>,
    /// Mean of the fitted time indices
    index_mean: f64,
    /// Sum of squared index deviations
    sum_sq_dev: f64,
    /// Residual spread after trend and seasonality
    sigma: f64,
    /// Student's t quantile matching the confidence level
    t_quantile: f64,
}

impl TrendSeason {
    /// Create a model with the default weekly seasonal block
    pub fn weekly() -> Self {
        Self {
            name: format!(
                "Additive Regression (period={}, fourier_order={})",
                SEASONAL_PERIOD, FOURIER_ORDER
            ),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        }
    }

    /// Set the confidence level used for prediction intervals
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        check_unit_interval("confidence_level", confidence_level)?;
        self.confidence_level = confidence_level;
        Ok(self)
    }

    /// Series length required to fit the trend
    pub fn min_points(&self) -> usize {
        MIN_POINTS
    }
}

impl Default for TrendSeason {
    fn default() -> Self {
        Self::weekly()
    }
}

impl ForecastModel for TrendSeason {
    type Fitted = FittedTrendSeason;

    fn fit(&self, series: &SalesSeries) -> Result<Self::Fitted> {
        let data = series.values();
        let n = data.len();
        check_min_points(MIN_POINTS, n)?;

        // Linear trend on the day index by ordinary least squares
        let index_mean = (n as f64 - 1.0) / 2.0;
        let value_mean = data.iter().sum::<f64>() / n as f64;
        let mut sum_sq_dev = 0.0;
        let mut covariance = 0.0;
        for (i, &value) in data.iter().enumerate() {
            let dev = i as f64 - index_mean;
            sum_sq_dev += dev * dev;
            covariance += dev * (value - value_mean);
        }
        let slope = covariance / sum_sq_dev;
        let intercept = value_mean - slope * index_mean;
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(ForecastError::Convergence(
                "trend fit produced non-finite coefficients".to_string(),
            ));
        }

        let detrended: Vec<f64> = data
            .iter()
            .enumerate()
            .map(|(i, &value)| value - (intercept + slope * i as f64))
            .collect();

        // Weekly seasonality on the residuals, skipped below two cycles
        let fourier = if n >= SEASONAL_PERIOD * 2 {
            let design: Vec<Vec<f64>> = (0..n).map(|i| fourier_row(i as f64)).collect();
            solve_normal_equations(&design, &detrended)?
        } else {
            Vec::new()
        };

        let residuals: Vec<f64> = detrended
            .iter()
            .enumerate()
            .map(|(i, &r)| r - evaluate_fourier(&fourier, i as f64))
            .collect();

        let params = 2 + fourier.len();
        let degrees_of_freedom = if n > params { (n - params) as f64 } else { 1.0 };
        let t_dist = StudentsT::new(0.0, 1.0, degrees_of_freedom).map_err(|e| {
            ForecastError::Convergence(format!("t distribution unavailable: {}", e))
        })?;

        Ok(FittedTrendSeason {
            name: self.name.clone(),
            n,
            intercept,
            slope,
            fourier,
            index_mean,
            sum_sq_dev,
            sigma: residual_sigma(&residuals),
            t_quantile: t_dist.inverse_cdf(0.5 + self.confidence_level / 2.0),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedModel for FittedTrendSeason {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let mut values = Vec::with_capacity(horizon);
        let mut intervals = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            let index = (self.n - 1 + h) as f64;
            let value = self.intercept + self.slope * index + evaluate_fourier(&self.fourier, index);

            // Prediction standard error with the leverage of the
            // extrapolated index
            let deviation = index - self.index_mean;
            let leverage = 1.0 + 1.0 / self.n as f64 + deviation * deviation / self.sum_sq_dev;
            let margin = self.t_quantile * self.sigma * leverage.sqrt();

            values.push(value);
            intervals.push((value - margin, value + margin));
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Convergence(
                "forecast produced non-finite values".to_string(),
            ));
        }

        ModelForecast::with_intervals(values, horizon, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fourier features for one day index: sin/cos pairs up to the
/// configured order
fn fourier_row(index: f64) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 * FOURIER_ORDER);
    for j in 1..=FOURIER_ORDER {
        let angle = 2.0 * PI * j as f64 * index / SEASONAL_PERIOD as f64;
        row.push(angle.sin());
        row.push(angle.cos());
    }
    row
}

fn evaluate_fourier(coefficients: &[f64], index: f64) -> f64 {
    if coefficients.is_empty() {
        return 0.0;
    }
    fourier_row(index)
        .iter()
        .zip(coefficients)
        .map(|(feature, coeff)| feature * coeff)
        .sum()
}

/// Solve (XᵀX + ridge·I) β = Xᵀy by Gaussian elimination with
/// partial pivoting
fn solve_normal_equations(design: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    let cols = match design.first() {
        Some(row) => row.len(),
        None => return Ok(Vec::new()),
    };

    let mut xtx = vec![vec![0.0; cols]; cols];
    let mut xty = vec![0.0; cols];
    for (row, &target) in design.iter().zip(targets) {
        for a in 0..cols {
            xty[a] += row[a] * target;
            for b in 0..cols {
                xtx[a][b] += row[a] * row[b];
            }
        }
    }
    for (a, row) in xtx.iter_mut().enumerate() {
        row[a] += RIDGE;
    }

    // Forward elimination with partial pivoting
    for col in 0..cols {
        let mut pivot_row = col;
        let mut pivot_size = xtx[col][col].abs();
        for candidate in col + 1..cols {
            if xtx[candidate][col].abs() > pivot_size {
                pivot_row = candidate;
                pivot_size = xtx[candidate][col].abs();
            }
        }
        if pivot_size < SINGULAR_PIVOT {
            return Err(ForecastError::Convergence(
                "seasonal normal equations are singular".to_string(),
            ));
        }
        xtx.swap(col, pivot_row);
        xty.swap(col, pivot_row);

        for below in col + 1..cols {
            let factor = xtx[below][col] / xtx[col][col];
            for k in col..cols {
                xtx[below][k] -= factor * xtx[col][k];
            }
            xty[below] -= factor * xty[col];
        }
    }

    // Back substitution
    let mut solution = vec![0.0; cols];
    for col in (0..cols).rev() {
        let mut value = xty[col];
        for k in col + 1..cols {
            value -= xtx[col][k] * solution[k];
        }
        solution[col] = value / xtx[col][col];
    }

    if solution.iter().any(|c| !c.is_finite()) {
        return Err(ForecastError::Convergence(
            "seasonal fit produced non-finite coefficients".to_string(),
        ));
    }

    Ok(solution)
}
