use super::{date_filter, exit_codes, open_loader, render};
use crate::cli::args::{BreakdownArgs, Format};
use anyhow::Result;
use renderboard_charts::{task_breakdown, StackMode};
use renderboard_core::config::DashboardConfig;
use renderboard_core::constants::MAIN_MODEL_TYPES;

pub fn run(cfg: &DashboardConfig, args: BreakdownArgs) -> Result<i32> {
    let loader = open_loader(cfg)?;
    let table = loader.load(&args.query.to_query())?;
    if table.is_empty() {
        eprintln!("No data returned from the store.");
        return Ok(exit_codes::NO_DATA);
    }

    // An explicit --task wins; the configured default only applies when present in the data.
    let present = table.task_types();
    let task = match args.task {
        Some(t) => t,
        None if present.contains(&cfg.charts.default_task) => cfg.charts.default_task,
        None => MAIN_MODEL_TYPES
            .into_iter()
            .find(|t| present.contains(t))
            .or_else(|| present.first().copied())
            .unwrap_or(cfg.charts.default_task),
    };
    let top_n = args.top_n.unwrap_or(cfg.charts.top_n).max(1);

    let mut filter = date_filter(&args.dates);
    filter.task_types = Some(vec![task]);
    let filtered = table.filter(&filter);
    if filtered.is_empty() {
        eprintln!("No data for the selected filters.");
        return Ok(exit_codes::NO_DATA);
    }
    tracing::info!(event = "breakdown", task = %task, rows = filtered.len(), top_n);

    let charts = task_breakdown::breakdown(&filtered, top_n, StackMode::from(args.mode));
    match args.format {
        Format::Json => {
            let out = serde_json::json!({ "task": task, "top_n": top_n, "charts": charts });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Text => {
            println!("Task: {task}");
            if !filtered.has_quality() {
                println!("No quality scores available for this task type.");
            }
            render::print_charts(&charts);
        }
    }
    Ok(exit_codes::OK)
}
