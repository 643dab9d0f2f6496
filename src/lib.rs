//! # Sales Forecast
//!
//! A Rust library implementing the core of a daily sales-forecasting
//! dashboard: CSV ingestion and normalization, three selectable
//! forecasting backends, and preparation of a combined
//! history-plus-forecast series for chart rendering.
//!
//! ## Features
//!
//! - Normalization of delimited sales data into a daily time series
//!   (same-day rows summed, dates sorted ascending)
//! - Forecasting backends: additive trend/seasonality regression,
//!   Holt-Winters smoothing, and seasonal ARIMA
//! - Validated forecast requests with a bounded horizon
//! - Reconciliation of history and forecast into one labelled series
//!   plus a forecast total for summary display
//!
//! The pipeline is synchronous and single-threaded; presentation,
//! persistence, and transport belong to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use sales_forecast::forecast::{Backend, ForecastRequest};
//! use sales_forecast::pipeline::ForecastPipeline;
//!
//! fn main() -> Result<(), sales_forecast::ForecastError> {
//!     let csv = "date_column,sales_column\n\
//!         2024-03-01,120.5\n\
//!         2024-03-02,131.0\n\
//!         2024-03-03,98.4\n\
//!         2024-03-04,147.2\n\
//!         2024-03-05,156.9\n";
//!
//!     // Forecast a week ahead with the additive backend
//!     let request = ForecastRequest::new(Backend::Additive, 7, None)?;
//!     let outcome = ForecastPipeline::new().run_csv(csv.as_bytes(), &request)?;
//!
//!     println!("{}", outcome);
//!     for point in outcome.display.points() {
//!         println!("{} {} {}", point.date, point.kind, point.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod reconcile;

// Re-export commonly used types
pub use crate::data::{SalesLoader, SalesSeries};
pub use crate::error::ForecastError;
pub use crate::forecast::{Backend, ForecastRequest, ForecastResult};
pub use crate::models::{FittedModel, ForecastModel, ModelForecast};
pub use crate::pipeline::{ForecastOutcome, ForecastPipeline, PipelineStage};
pub use crate::reconcile::{reconcile, DisplayPoint, DisplaySeries, PointKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
