use std::collections::HashMap;

use super::{exit_codes, open_loader};
use crate::cli::args::{Format, PaletteArgs};
use anyhow::Result;
use renderboard_core::config::DashboardConfig;
use renderboard_core::table::{Aggregate, Dimension, Measure};
use renderboard_core::{build_family_palette, detect_family};

pub fn run(cfg: &DashboardConfig, args: PaletteArgs) -> Result<i32> {
    let (titles, weights): (Vec<String>, Option<HashMap<String, f64>>) = if args.titles.is_empty() {
        let table = open_loader(cfg)?.load(&args.query.to_query())?;
        let weights = table.grouped_map(Dimension::Title, Aggregate::Sum(Measure::DefaultCost));
        let titles = table.iter().filter_map(|r| r.title().map(str::to_string)).collect();
        (titles, Some(weights))
    } else {
        let weights = (!args.weights.is_empty()).then(|| args.weights.iter().cloned().collect());
        (args.titles.clone(), weights)
    };

    if titles.is_empty() {
        eprintln!("No titles to color.");
        return Ok(exit_codes::NO_DATA);
    }
    let palette = build_family_palette(&titles, weights.as_ref());

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&palette)?),
        Format::Text => {
            for (title, color) in &palette {
                println!("{:<10} {:<12} {}", color, detect_family(Some(title.as_str())).as_str(), title);
            }
        }
    }
    Ok(exit_codes::OK)
}
