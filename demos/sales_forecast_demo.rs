use sales_forecast::data::SalesLoader;
use sales_forecast::forecast::{Backend, ForecastRequest};
use sales_forecast::pipeline::ForecastPipeline;
use sales_forecast::reconcile::PointKind;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load the sample sales data
    let csv_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("csv")
        .join("daily_sales.csv");

    println!("Loading sales data from: {}", csv_path.display());
    let series = SalesLoader::new().from_csv(&csv_path)?;
    println!(
        "Loaded {} days of sales ({} to {})",
        series.len(),
        series.first_date().expect("non-empty"),
        series.last_date().expect("non-empty"),
    );

    let pipeline = ForecastPipeline::new();
    let horizon = 7;

    // Run the same week-ahead forecast through every backend
    for backend in Backend::all() {
        let seasonal_period = match backend {
            Backend::SeasonalArima => Some(7),
            _ => None,
        };
        let request = ForecastRequest::new(backend, horizon, seasonal_period)?;

        println!("\n=== {} ===", backend);
        match pipeline.run(&series, &request) {
            Ok(outcome) => {
                println!("{}", outcome);
                for point in outcome
                    .display
                    .points()
                    .iter()
                    .filter(|p| p.kind == PointKind::Forecast)
                {
                    println!("  {}  {:.2}", point.date, point.value);
                }
            }
            Err(error) => println!("Forecast failed: {}", error),
        }
    }

    Ok(())
}
