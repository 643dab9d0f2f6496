//! Holt-Winters triple exponential smoothing for daily sales

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::models::{
    check_min_points, check_unit_interval, normal_quantile, residual_sigma, widening_intervals,
    FittedModel, ForecastModel, ModelForecast,
};

/// Seasonal cycle length for daily sales data
///
/// The weekly pattern is the dominant cycle at daily granularity; this
/// model keeps it fixed rather than exposing it as a parameter.
pub const WEEKLY_PERIOD: usize = 7;

const DEFAULT_ALPHA: f64 = 0.5;
const DEFAULT_BETA: f64 = 0.3;
const DEFAULT_GAMMA: f64 = 0.2;
const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Additive Holt-Winters model with a fixed weekly season
#[derive(Debug, Clone)]
pub struct HoltWinters {
    /// Name of the model
    name: String,
    /// Level smoothing parameter
    alpha: f64,
    /// Trend smoothing parameter
    beta: f64,
    /// Seasonal smoothing parameter
    gamma: f64,
    /// Seasonal cycle length
    period: usize,
    /// Confidence level for prediction intervals
    confidence_level: f64,
}

/// Fitted Holt-Winters model
#[derive(Debug, Clone)]
pub struct FittedHoltWinters {
    /// Name of the model
    name: String,
    /// Final smoothed level
    level: f64,
    /// Final smoothed trend
    trend: f64,
    /// Final seasonal components, one per weekday offset
    seasonal: Vec<f64>,
    /// Seasonal cycle length
    period: usize,
    /// One-step residual spread
    sigma: f64,
    /// Normal quantile matching the confidence level
    z: f64,
}

impl HoltWinters {
    /// Create a model with the default smoothing parameters
    pub fn weekly() -> Self {
        Self {
            name: format!(
                "Holt-Winters (alpha={}, beta={}, gamma={}, period={})",
                DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_GAMMA, WEEKLY_PERIOD
            ),
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            gamma: DEFAULT_GAMMA,
            period: WEEKLY_PERIOD,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        }
    }

    /// Create a model with explicit smoothing parameters
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        check_unit_interval("alpha", alpha)?;
        check_unit_interval("beta", beta)?;
        check_unit_interval("gamma", gamma)?;

        Ok(Self {
            name: format!(
                "Holt-Winters (alpha={}, beta={}, gamma={}, period={})",
                alpha, beta, gamma, WEEKLY_PERIOD
            ),
            alpha,
            beta,
            gamma,
            period: WEEKLY_PERIOD,
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

impl ForecastModel for HoltWinters {
    type Fitted = FittedHoltWinters;

    fn fit(&self, series: &SalesSeries) -> Result<Self::Fitted> {
        let data = series.values();
        check_min_points(self.min_points(), data.len())?;

        // Initialize from the first two cycles
        let mut level = data[..self.period].iter().sum::<f64>() / self.period as f64;
        let mut trend_sum = 0.0;
        for i in 0..self.period {
            trend_sum += (data[self.period + i] - data[i]) / self.period as f64;
        }
        let mut trend = trend_sum / self.period as f64;
        let mut seasonal: Vec<f64> = data[..self.period].iter().map(|v| v - level).collect();

        // Smooth through the remaining observations, collecting
        // one-step-ahead residuals along the way
        let mut residuals = Vec::with_capacity(data.len() - self.period);
        for (i, &value) in data.iter().enumerate().skip(self.period) {
            let season_idx = i % self.period;
            let one_step = level + trend + seasonal[season_idx];
            residuals.push(value - one_step);

            let last_level = level;
            level = self.alpha * (value - seasonal[season_idx])
                + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - last_level) + (1.0 - self.beta) * trend;
            seasonal[season_idx] =
                self.gamma * (value - level) + (1.0 - self.gamma) * seasonal[season_idx];
        }

        if !level.is_finite() || !trend.is_finite() || seasonal.iter().any(|s| !s.is_finite()) {
            return Err(ForecastError::Convergence(
                "smoothing state diverged during fit".to_string(),
            ));
        }

        Ok(FittedHoltWinters {
            name: self.name.clone(),
            level,
            trend,
            seasonal,
            period: self.period,
            sigma: residual_sigma(&residuals),
            z: normal_quantile(self.confidence_level)?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedModel for FittedHoltWinters {
    fn forecast(&self, horizon: usize) -> Result<ModelForecast> {
        let values: Vec<f64> = (1..=horizon)
            .map(|h| self.level + h as f64 * self.trend + self.seasonal[(h - 1) % self.period])
            .collect();

        let intervals = widening_intervals(&values, self.sigma, self.z);
        ModelForecast::with_intervals(values, horizon, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
