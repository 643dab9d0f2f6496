//! Forecast engine adapter: request validation, backend dispatch, and
//! calendar alignment

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::models::holt_winters::HoltWinters;
use crate::models::seasonal_arima::SeasonalArima;
use crate::models::trend_season::TrendSeason;
use crate::models::{FittedModel, ForecastModel, ModelForecast};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Longest forecast horizon the adapter accepts, in days
pub const MAX_FORECAST_HORIZON: usize = 365;

/// Seasonal periods the dashboard exposes for the seasonal ARIMA
/// backend
pub const SEASONAL_PERIODS: [usize; 3] = [4, 7, 12];

/// Confidence levels supported for prediction intervals
pub const CONFIDENCE_LEVELS: [f64; 4] = [0.80, 0.90, 0.95, 0.99];

const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Forecasting backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    /// Additive regression with linear trend and weekly seasonality
    #[serde(rename = "Forecast-Additive")]
    Additive,
    /// Additive Holt-Winters with a fixed weekly season
    #[serde(rename = "Holt-Winters")]
    HoltWinters,
    /// Seasonal ARIMA with a caller-selected period
    #[serde(rename = "Seasonal-ARIMA")]
    SeasonalArima,
}

impl Backend {
    /// The label shown in selection UIs and used on the wire
    pub fn label(&self) -> &'static str {
        match self {
            Backend::Additive => "Forecast-Additive",
            Backend::HoltWinters => "Holt-Winters",
            Backend::SeasonalArima => "Seasonal-ARIMA",
        }
    }

    /// All selectable backends, in display order
    pub fn all() -> [Backend; 3] {
        [Backend::Additive, Backend::HoltWinters, Backend::SeasonalArima]
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Backend {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Forecast-Additive" => Ok(Backend::Additive),
            "Holt-Winters" => Ok(Backend::HoltWinters),
            "Seasonal-ARIMA" => Ok(Backend::SeasonalArima),
            other => Err(ForecastError::invalid_parameter(
                "backend",
                format!(
                    "unknown backend '{}', expected one of Forecast-Additive, Holt-Winters, Seasonal-ARIMA",
                    other
                ),
            )),
        }
    }
}

/// Validated forecast request
///
/// Construction is the validation boundary: a value of this type
/// always carries a horizon within bounds and a seasonal period
/// admissible for its backend, so no fitting work can start on bad
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRequest {
    backend: Backend,
    horizon: usize,
    seasonal_period: Option<usize>,
    confidence_level: f64,
}

impl ForecastRequest {
    /// Validate and build a request
    pub fn new(backend: Backend, horizon: usize, seasonal_period: Option<usize>) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::invalid_parameter(
                "horizon",
                "must be at least 1 day",
            ));
        }
        if horizon > MAX_FORECAST_HORIZON {
            return Err(ForecastError::invalid_parameter(
                "horizon",
                format!(
                    "{} days exceeds the maximum of {} days",
                    horizon, MAX_FORECAST_HORIZON
                ),
            ));
        }

        if backend == Backend::SeasonalArima {
            let period = seasonal_period.ok_or_else(|| {
                ForecastError::invalid_parameter(
                    "seasonal_period",
                    "required for the Seasonal-ARIMA backend",
                )
            })?;
            if !SEASONAL_PERIODS.contains(&period) {
                return Err(ForecastError::invalid_parameter(
                    "seasonal_period",
                    format!("{} is not one of the supported periods {:?}", period, SEASONAL_PERIODS),
                ));
            }
        }

        Ok(Self {
            backend,
            horizon,
            seasonal_period,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        })
    }

    /// Set the confidence level used for prediction intervals
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        let supported = CONFIDENCE_LEVELS
            .iter()
            .any(|level| (level - confidence_level).abs() < 1e-9);
        if !supported {
            return Err(ForecastError::invalid_parameter(
                "confidence_level",
                format!(
                    "{} is not one of the supported levels {:?}",
                    confidence_level, CONFIDENCE_LEVELS
                ),
            ));
        }
        self.confidence_level = confidence_level;
        Ok(self)
    }

    /// The selected backend
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Forecast length in days
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Seasonal period, when one was supplied
    pub fn seasonal_period(&self) -> Option<usize> {
        self.seasonal_period
    }

    /// Confidence level for prediction intervals
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }
}

/// Dated forecast produced by the adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecast dates, consecutive days after the history
    dates: Vec<NaiveDate>,
    /// Forecasted values, aligned with the dates
    values: Vec<f64>,
    /// Lower/upper prediction bounds per value (optional)
    intervals: Option<Vec<(f64, f64)>>,
}

impl ForecastResult {
    /// Create a result from parallel date and value vectors
    pub fn new(
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
        intervals: Option<Vec<(f64, f64)>>,
    ) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ShapeMismatch(format!(
                "{} dates against {} values",
                dates.len(),
                values.len()
            )));
        }
        if let Some(bounds) = &intervals {
            if bounds.len() != values.len() {
                return Err(ForecastError::ShapeMismatch(format!(
                    "{} intervals against {} values",
                    bounds.len(),
                    values.len()
                )));
            }
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ForecastError::invalid_parameter(
                    "dates",
                    format!("must be strictly increasing, got {} then {}", pair[0], pair[1]),
                ));
            }
        }

        Ok(Self {
            dates,
            values,
            intervals,
        })
    }

    /// Forecast dates, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Forecasted values, aligned with the dates
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Prediction intervals, if the backend produced them
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Number of forecasted days
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the forecast is empty
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First forecast date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last forecast date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Sum of the forecasted values
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Iterate over (date, value) pairs in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// Fit the requested backend and forecast future daily sales
///
/// Days missing from the series count as zero sales: every backend
/// sees a dense daily calendar between the first and last observation.
/// Forecast dates start exactly one day after the last observation.
pub fn forecast(series: &SalesSeries, request: &ForecastRequest) -> Result<ForecastResult> {
    if series.is_empty() {
        return Err(ForecastError::EmptyInput);
    }

    let dense = series.fill_daily_gaps(0.0);
    debug!(
        backend = %request.backend(),
        horizon = request.horizon(),
        n_obs = dense.len(),
        "fitting forecast backend"
    );

    let raw = match request.backend() {
        Backend::Additive => TrendSeason::weekly()
            .with_confidence_level(request.confidence_level())?
            .fit(&dense)?
            .forecast(request.horizon())?,
        Backend::HoltWinters => HoltWinters::weekly()
            .with_confidence_level(request.confidence_level())?
            .fit(&dense)?
            .forecast(request.horizon())?,
        Backend::SeasonalArima => {
            let period = request.seasonal_period().ok_or_else(|| {
                ForecastError::invalid_parameter(
                    "seasonal_period",
                    "required for the Seasonal-ARIMA backend",
                )
            })?;
            SeasonalArima::new(period)?
                .with_confidence_level(request.confidence_level())?
                .fit(&dense)?
                .forecast(request.horizon())?
        }
    };

    finalize(&dense, request, raw)
}

/// Attach calendar dates to a raw model forecast and validate its shape
fn finalize(
    dense: &SalesSeries,
    request: &ForecastRequest,
    raw: ModelForecast,
) -> Result<ForecastResult> {
    if raw.len() != request.horizon() {
        return Err(ForecastError::ShapeMismatch(format!(
            "backend returned {} values for horizon {}",
            raw.len(),
            request.horizon()
        )));
    }
    if raw.values().iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::Convergence(
            "backend produced non-finite forecast values".to_string(),
        ));
    }

    let last = dense.last_date().ok_or(ForecastError::EmptyInput)?;
    let dates = future_dates(last, request.horizon())?;
    let result = ForecastResult::new(dates, raw.values, raw.intervals)?;
    debug!(
        backend = %request.backend(),
        last_observed = %last,
        total = result.total(),
        "forecast complete"
    );
    Ok(result)
}

/// Consecutive daily dates starting the day after `last`
fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(horizon);
    let mut day = last;
    for _ in 0..horizon {
        day = day.succ_opt().ok_or_else(|| {
            ForecastError::invalid_parameter(
                "horizon",
                "forecast dates exceed the supported calendar range",
            )
        })?;
        dates.push(day);
    }
    Ok(dates)
}
