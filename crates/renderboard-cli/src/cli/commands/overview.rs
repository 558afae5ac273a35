use super::{date_filter, exit_codes, open_loader, render};
use crate::cli::args::{Format, OverviewArgs};
use anyhow::Result;
use renderboard_charts::{overview, Chart, StackMode};
use renderboard_core::config::DashboardConfig;

pub fn run(cfg: &DashboardConfig, args: OverviewArgs) -> Result<i32> {
    let loader = open_loader(cfg)?;
    let table = loader.load(&args.query.to_query())?;
    if table.is_empty() {
        eprintln!("No data returned from the store.");
        return Ok(exit_codes::NO_DATA);
    }

    let mut filter = date_filter(&args.dates);
    if !args.buckets.is_empty() {
        filter.buckets = Some(args.buckets.clone());
    }
    let filtered = table.filter(&filter);
    if filtered.is_empty() {
        eprintln!("No data for the selected filters.");
        return Ok(exit_codes::NO_DATA);
    }

    let mode = StackMode::from(args.mode);
    let charts: Vec<Chart> = vec![
        overview::requests_over_time(&filtered, mode).into(),
        overview::cost_over_time(&filtered, mode).into(),
        overview::jobs_and_cost(&filtered).into(),
    ];

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&charts)?),
        Format::Text => render::print_charts(&charts),
    }
    Ok(exit_codes::OK)
}
