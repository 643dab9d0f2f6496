//! Sales time series ingestion and normalization

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Conventional header name of the date column
pub const DEFAULT_DATE_COLUMN: &str = "date_column";

/// Conventional header name of the sales column
pub const DEFAULT_SALES_COLUMN: &str = "sales_column";

/// Date formats accepted by the loader, tried in order
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Header fragments that identify a date column when the configured
/// name is absent
const DATE_FALLBACKS: [&str; 2] = ["date", "time"];

/// Header fragments that identify a sales column when the configured
/// name is absent
const SALES_FALLBACKS: [&str; 4] = ["sales", "amount", "revenue", "value"];

/// Normalized daily sales series
///
/// Invariant: `dates` and `values` have equal length and `dates` is
/// strictly increasing. Rows sharing a date have already been summed.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSeries {
    /// Observation dates, ascending and unique
    dates: Vec<NaiveDate>,
    /// Total sales per date
    values: Vec<f64>,
}

/// CSV loader that normalizes raw sales rows into a [`SalesSeries`]
#[derive(Debug, Clone)]
pub struct SalesLoader {
    /// Expected name of the date column
    date_column: String,
    /// Expected name of the sales column
    sales_column: String,
}

impl Default for SalesLoader {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            sales_column: DEFAULT_SALES_COLUMN.to_string(),
        }
    }
}

impl SalesLoader {
    /// Create a loader expecting the conventional column names
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader expecting custom column names
    pub fn with_columns(date_column: impl Into<String>, sales_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            sales_column: sales_column.into(),
        }
    }

    /// Load and normalize sales data from a CSV file
    pub fn from_csv<P: AsRef<Path>>(&self, path: P) -> Result<SalesSeries> {
        let file = File::open(path)?;
        self.from_reader(file)
    }

    /// Load and normalize sales data from any byte stream
    ///
    /// Rows sharing a date are summed; output is sorted ascending by
    /// date. Missing calendar days are left as gaps here; filling them
    /// is a forecasting concern, not an ingestion one.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<SalesSeries> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ForecastError::EmptyInput);
        }

        let date_idx = resolve_column(&headers, &self.date_column, &DATE_FALLBACKS)
            .ok_or_else(|| self.missing_column(&self.date_column, "date", &headers))?;
        let sales_idx = resolve_column(&headers, &self.sales_column, &SALES_FALLBACKS)
            .ok_or_else(|| self.missing_column(&self.sales_column, "sales", &headers))?;
        if date_idx == sales_idx {
            return Err(ForecastError::Schema(format!(
                "date and sales both resolve to column '{}'",
                &headers[date_idx]
            )));
        }

        // Accumulate per-day totals; the map keeps dates sorted and unique
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (i, record) in csv_reader.records().enumerate() {
            let row = i + 1;
            let record = record.map_err(|e| ForecastError::Parse {
                row,
                reason: e.to_string(),
            })?;

            let date_cell = field(&record, date_idx, &self.date_column, row)?;
            let date = parse_date(date_cell).map_err(|reason| ForecastError::Parse { row, reason })?;

            let sales_cell = field(&record, sales_idx, &self.sales_column, row)?;
            let value: f64 = sales_cell.parse().map_err(|_| ForecastError::Parse {
                row,
                reason: format!("'{}' is not a number", sales_cell),
            })?;
            if !value.is_finite() {
                return Err(ForecastError::Parse {
                    row,
                    reason: format!("sales value '{}' is not finite", sales_cell),
                });
            }

            *totals.entry(date).or_insert(0.0) += value;
        }

        if totals.is_empty() {
            return Err(ForecastError::EmptyInput);
        }

        let (dates, values) = totals.into_iter().unzip();
        Ok(SalesSeries { dates, values })
    }

    fn missing_column(
        &self,
        wanted: &str,
        role: &str,
        headers: &csv::StringRecord,
    ) -> ForecastError {
        let seen: Vec<&str> = headers.iter().collect();
        ForecastError::Schema(format!(
            "no {} column: expected '{}', found headers [{}]",
            role,
            wanted,
            seen.join(", ")
        ))
    }
}

/// Resolve a column by exact name first, then by case-insensitive
/// substring detection
fn resolve_column(
    headers: &csv::StringRecord,
    wanted: &str,
    fallbacks: &[&str],
) -> Option<usize> {
    if let Some(idx) = headers.iter().position(|h| h == wanted) {
        return Some(idx);
    }

    for (idx, name) in headers.iter().enumerate() {
        let lower = name.to_lowercase();
        if fallbacks.iter().any(|fragment| lower.contains(fragment)) {
            return Some(idx);
        }
    }

    None
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> Result<&'r str> {
    record.get(idx).ok_or_else(|| ForecastError::Parse {
        row,
        reason: format!("row has no field for column '{}'", column),
    })
}

fn parse_date(cell: &str) -> std::result::Result<NaiveDate, String> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return Ok(date);
        }
    }
    Err(format!("'{}' does not match any accepted date format", cell))
}

impl SalesSeries {
    /// Create a series from parallel date and value vectors
    ///
    /// Dates must be strictly increasing and values finite; use the
    /// loader for raw, unordered input.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ShapeMismatch(format!(
                "{} dates against {} values",
                dates.len(),
                values.len()
            )));
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ForecastError::invalid_parameter(
                    "dates",
                    format!("must be strictly increasing, got {} then {}", pair[0], pair[1]),
                ));
            }
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "values",
                format!("value at index {} is not finite", pos),
            ));
        }

        Ok(Self { dates, values })
    }

    /// Number of daily observations
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Total sales per date, aligned with [`dates`](SalesSeries::dates)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Earliest observation date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Latest observation date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over (date, value) pairs in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Produce a dense daily series between the first and last date,
    /// inserting `fill` for days with no observation
    pub fn fill_daily_gaps(&self, fill: f64) -> SalesSeries {
        let (first, last) = match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.clone(),
        };

        let mut dates = Vec::new();
        let mut values = Vec::new();
        let mut observed = self.iter().peekable();
        let mut day = first;
        while day <= last {
            match observed.peek() {
                Some((date, value)) if *date == day => {
                    values.push(*value);
                    observed.next();
                }
                _ => values.push(fill),
            }
            dates.push(day);
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        SalesSeries { dates, values }
    }

    /// Render the series back to CSV with the conventional headers
    pub fn to_csv(&self) -> String {
        let mut out = format!("{},{}\n", DEFAULT_DATE_COLUMN, DEFAULT_SALES_COLUMN);
        for (date, value) in self.iter() {
            out.push_str(&format!("{},{}\n", date.format("%Y-%m-%d"), value));
        }
        out
    }
}
