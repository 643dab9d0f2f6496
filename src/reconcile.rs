//! Merging history and forecast into one display series

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::forecast::ForecastResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Origin of a display point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointKind {
    /// Observed historical sales
    Actual,
    /// Model-forecasted sales
    Forecast,
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Actual => f.write_str("Actual"),
            PointKind::Forecast => f.write_str("Forecast"),
        }
    }
}

/// One dated point in the combined display series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayPoint {
    /// Calendar date of the point
    pub date: NaiveDate,
    /// Sales value, observed or forecasted
    pub value: f64,
    /// Whether the point is history or forecast
    pub kind: PointKind,
}

/// History and forecast merged for chart rendering
///
/// Points are in strict chronological order: all historical points
/// first, then all forecast points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySeries {
    points: Vec<DisplayPoint>,
    actual_len: usize,
}

impl DisplaySeries {
    /// All points in chronological order
    pub fn points(&self) -> &[DisplayPoint] {
        &self.points
    }

    /// Total number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of historical points
    pub fn actual_len(&self) -> usize {
        self.actual_len
    }

    /// Number of forecast points
    pub fn forecast_len(&self) -> usize {
        self.points.len() - self.actual_len
    }

    /// Iterate over the points
    pub fn iter(&self) -> impl Iterator<Item = &DisplayPoint> {
        self.points.iter()
    }
}

/// Merge history and forecast into one chronologically ordered series
///
/// The forecast must start exactly one day after the last observation;
/// any gap or overlap is rejected. Values pass through untouched, in
/// their original order.
pub fn reconcile(history: &SalesSeries, forecast: &ForecastResult) -> Result<DisplaySeries> {
    let last_observed = history.last_date().ok_or(ForecastError::EmptyInput)?;
    let first_forecast = forecast.first_date().ok_or_else(|| {
        ForecastError::ShapeMismatch("forecast series is empty".to_string())
    })?;

    let expected = match last_observed.succ_opt() {
        Some(date) => date,
        None => {
            return Err(ForecastError::ShapeMismatch(format!(
                "no calendar day follows {}",
                last_observed
            )))
        }
    };
    if first_forecast != expected {
        return Err(ForecastError::ShapeMismatch(format!(
            "forecast starts on {} but the day after the last observation {} is {}",
            first_forecast, last_observed, expected
        )));
    }

    let mut points = Vec::with_capacity(history.len() + forecast.len());
    for (date, value) in history.iter() {
        points.push(DisplayPoint {
            date,
            value,
            kind: PointKind::Actual,
        });
    }
    for (date, value) in forecast.iter() {
        points.push(DisplayPoint {
            date,
            value,
            kind: PointKind::Forecast,
        });
    }

    Ok(DisplaySeries {
        points,
        actual_len: history.len(),
    })
}
