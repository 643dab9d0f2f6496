use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::data::{SalesLoader, SalesSeries};
use sales_forecast::error::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn test_loader_from_csv_file() {
    // Create a temporary CSV file
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date_column,sales_column").unwrap();
    writeln!(file, "2024-03-01,120.5").unwrap();
    writeln!(file, "2024-03-02,131.0").unwrap();
    writeln!(file, "2024-03-03,98.25").unwrap();

    let series = SalesLoader::new().from_csv(file.path()).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.first_date(), Some(date("2024-03-01")));
    assert_eq!(series.last_date(), Some(date("2024-03-03")));
    assert_eq!(series.values(), &[120.5, 131.0, 98.25]);
}

#[test]
fn test_loader_missing_file() {
    let result = SalesLoader::new().from_csv("nonexistent_file.csv");
    assert!(matches!(result, Err(ForecastError::Io(_))));
}

#[test]
fn test_same_day_rows_are_summed() {
    let csv = "date_column,sales_column\n\
               2024-03-01,100.0\n\
               2024-03-02,40.0\n\
               2024-03-01,50.5\n";

    let series = SalesLoader::new().from_reader(csv.as_bytes()).unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series.values(), &[150.5, 40.0]);
}

#[test]
fn test_unordered_rows_are_sorted() {
    let csv = "date_column,sales_column\n\
               2024-03-05,5.0\n\
               2024-03-01,1.0\n\
               2024-03-03,3.0\n";

    let series = SalesLoader::new().from_reader(csv.as_bytes()).unwrap();

    assert_eq!(
        series.dates(),
        &[date("2024-03-01"), date("2024-03-03"), date("2024-03-05")]
    );
    assert_eq!(series.values(), &[1.0, 3.0, 5.0]);
}

#[test]
fn test_dates_strictly_increasing_after_load() {
    let csv = "date_column,sales_column\n\
               2024-03-02,2.0\n\
               2024-03-01,1.0\n\
               2024-03-02,2.0\n\
               2024-03-04,4.0\n";

    let series = SalesLoader::new().from_reader(csv.as_bytes()).unwrap();

    for pair in series.dates().windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn test_loader_detects_columns_by_fallback() {
    // Neither conventional name is present; detection falls back to
    // substring matches
    let csv = "Date,Total Revenue\n\
               2024-03-01,12.0\n\
               2024-03-02,14.0\n";

    let series = SalesLoader::new().from_reader(csv.as_bytes()).unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series.values(), &[12.0, 14.0]);
}

#[test]
fn test_loader_with_custom_columns() {
    let csv = "day,units\n\
               2024-03-01,7.0\n";

    let series = SalesLoader::with_columns("day", "units")
        .from_reader(csv.as_bytes())
        .unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.values(), &[7.0]);
}

#[test]
fn test_loader_rejects_missing_sales_column() {
    let csv = "date_column,notes\n\
               2024-03-01,hello\n";

    let result = SalesLoader::new().from_reader(csv.as_bytes());

    match result {
        Err(ForecastError::Schema(msg)) => {
            assert!(msg.contains("sales"));
            assert!(msg.contains("notes"));
        }
        other => panic!("Expected Schema error, got {:?}", other),
    }
}

#[test]
fn test_loader_rejects_ambiguous_columns() {
    // One header matches both the date and the sales detection
    let csv = "sales_date,comment\n\
               2024-03-01,x\n";

    let result = SalesLoader::new().from_reader(csv.as_bytes());
    assert!(matches!(result, Err(ForecastError::Schema(_))));
}

#[test]
fn test_empty_input_is_rejected() {
    let result = SalesLoader::new().from_reader("".as_bytes());
    assert!(matches!(result, Err(ForecastError::EmptyInput)));
}

#[test]
fn test_header_only_input_is_rejected() {
    let result = SalesLoader::new().from_reader("date_column,sales_column\n".as_bytes());
    assert!(matches!(result, Err(ForecastError::EmptyInput)));
}

#[test]
fn test_bad_date_reports_row_number() {
    let csv = "date_column,sales_column\n\
               2024-03-01,1.0\n\
               not-a-date,2.0\n";

    let result = SalesLoader::new().from_reader(csv.as_bytes());

    match result {
        Err(ForecastError::Parse { row, reason }) => {
            assert_eq!(row, 2);
            assert!(reason.contains("not-a-date"));
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_bad_number_reports_row_number() {
    let csv = "date_column,sales_column\n\
               2024-03-01,lots\n";

    let result = SalesLoader::new().from_reader(csv.as_bytes());

    match result {
        Err(ForecastError::Parse { row, reason }) => {
            assert_eq!(row, 1);
            assert!(reason.contains("lots"));
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_non_finite_sales_value_is_rejected() {
    let csv = "date_column,sales_column\n\
               2024-03-01,NaN\n";

    let result = SalesLoader::new().from_reader(csv.as_bytes());
    assert!(matches!(result, Err(ForecastError::Parse { row: 1, .. })));
}

#[test]
fn test_ragged_row_is_a_parse_error() {
    let csv = "date_column,sales_column\n\
               2024-03-01,1.0\n\
               2024-03-02,2.0,surprise\n";

    let result = SalesLoader::new().from_reader(csv.as_bytes());
    assert!(matches!(result, Err(ForecastError::Parse { row: 2, .. })));
}

#[test]
fn test_alternative_date_formats() {
    let csv = "date_column,sales_column\n\
               2024/03/01,1.0\n\
               03/02/2024,2.0\n";

    let series = SalesLoader::new().from_reader(csv.as_bytes()).unwrap();

    assert_eq!(
        series.dates(),
        &[date("2024-03-01"), date("2024-03-02")]
    );
}

#[test]
fn test_normalization_is_idempotent() {
    let csv = "date_column,sales_column\n\
               2024-03-05,5.0\n\
               2024-03-01,1.25\n\
               2024-03-01,2.0\n\
               2024-03-03,3.5\n";

    let loader = SalesLoader::new();
    let first_pass = loader.from_reader(csv.as_bytes()).unwrap();
    let second_pass = loader.from_reader(first_pass.to_csv().as_bytes()).unwrap();

    assert_eq!(first_pass, second_pass);
}

#[test]
fn test_series_new_rejects_mismatched_lengths() {
    let result = SalesSeries::new(vec![date("2024-03-01")], vec![1.0, 2.0]);
    assert!(matches!(result, Err(ForecastError::ShapeMismatch(_))));
}

#[test]
fn test_series_new_rejects_unsorted_dates() {
    let result = SalesSeries::new(
        vec![date("2024-03-02"), date("2024-03-01")],
        vec![1.0, 2.0],
    );
    assert!(matches!(result, Err(ForecastError::InvalidParameter { .. })));
}

#[test]
fn test_series_new_rejects_duplicate_dates() {
    let result = SalesSeries::new(
        vec![date("2024-03-01"), date("2024-03-01")],
        vec![1.0, 2.0],
    );
    assert!(matches!(result, Err(ForecastError::InvalidParameter { .. })));
}

#[test]
fn test_series_new_rejects_non_finite_values() {
    let result = SalesSeries::new(
        vec![date("2024-03-01"), date("2024-03-02")],
        vec![1.0, f64::NAN],
    );
    assert!(matches!(result, Err(ForecastError::InvalidParameter { .. })));
}

#[test]
fn test_fill_daily_gaps() {
    let series = SalesSeries::new(
        vec![date("2024-03-01"), date("2024-03-02"), date("2024-03-05")],
        vec![10.0, 20.0, 50.0],
    )
    .unwrap();

    let dense = series.fill_daily_gaps(0.0);

    assert_eq!(dense.len(), 5);
    assert_eq!(dense.values(), &[10.0, 20.0, 0.0, 0.0, 50.0]);
    assert_eq!(dense.first_date(), Some(date("2024-03-01")));
    assert_eq!(dense.last_date(), Some(date("2024-03-05")));

    // Already dense input passes through unchanged
    assert_eq!(dense.fill_daily_gaps(0.0), dense);
}

#[test]
fn test_single_row_is_a_valid_series() {
    let csv = "date_column,sales_column\n2024-03-01,42.0\n";

    let series = SalesLoader::new().from_reader(csv.as_bytes()).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.first_date(), series.last_date());
}
