//! End-to-end orchestration from raw sales data to display output

use crate::data::{SalesLoader, SalesSeries};
use crate::error::Result;
use crate::forecast::{forecast, Backend, ForecastRequest};
use crate::reconcile::{reconcile, DisplaySeries};
use serde::Serialize;
use std::fmt;
use std::io::Read;
use tracing::debug;

/// Progress of one forecasting run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    /// No normalized series accepted yet
    AwaitingInput,
    /// A backend is being fitted
    Fitting,
    /// Display output has been produced
    Ready,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::AwaitingInput => f.write_str("awaiting input"),
            PipelineStage::Fitting => f.write_str("fitting"),
            PipelineStage::Ready => f.write_str("ready"),
        }
    }
}

/// Everything a dashboard needs to render one forecasting run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOutcome {
    /// Merged history and forecast, chronologically ordered
    pub display: DisplaySeries,
    /// Sum of the forecasted values
    pub total: f64,
    /// Backend that produced the forecast
    pub backend: Backend,
    /// Forecast length in days
    pub horizon: usize,
}

impl fmt::Display for ForecastOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} forecast for {} days: total {:.2}",
            self.backend, self.horizon, self.total
        )
    }
}

/// Orchestrator for the normalize, fit, reconcile sequence
///
/// Holds configuration only; each run is independent of every other,
/// and a failed run leaves nothing behind.
#[derive(Debug, Clone, Default)]
pub struct ForecastPipeline {
    loader: SalesLoader,
}

impl ForecastPipeline {
    /// Create a pipeline with the conventional loader configuration
    pub fn new() -> Self {
        Self {
            loader: SalesLoader::new(),
        }
    }

    /// Create a pipeline with a custom loader
    pub fn with_loader(loader: SalesLoader) -> Self {
        Self { loader }
    }

    /// Normalize raw CSV bytes, then run the forecast
    pub fn run_csv<R: Read>(&self, reader: R, request: &ForecastRequest) -> Result<ForecastOutcome> {
        let series = self.loader.from_reader(reader)?;
        self.run(&series, request)
    }

    /// Fit, forecast, and reconcile one request against one series
    ///
    /// Errors surface directly; reconciliation only happens after a
    /// successful forecast.
    pub fn run(&self, series: &SalesSeries, request: &ForecastRequest) -> Result<ForecastOutcome> {
        let mut stage = PipelineStage::AwaitingInput;
        debug!(stage = %stage, n_obs = series.len(), "starting forecast run");

        stage = PipelineStage::Fitting;
        debug!(stage = %stage, backend = %request.backend(), "running backend");
        let predicted = forecast(series, request)?;

        let display = reconcile(series, &predicted)?;
        stage = PipelineStage::Ready;
        // `display` can't be named inside the macro: tracing's `valueset!`
        // expansion imports `tracing::field::display`, shadowing the local.
        let points = display.len();
        debug!(
            stage = %stage,
            points,
            total = predicted.total(),
            "forecast run complete"
        );

        Ok(ForecastOutcome {
            total: predicted.total(),
            backend: request.backend(),
            horizon: request.horizon(),
            display,
        })
    }
}
