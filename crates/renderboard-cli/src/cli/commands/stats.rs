use std::sync::Arc;

use super::exit_codes;
use crate::cli::args::{Format, StatsArgs};
use anyhow::Result;
use renderboard_core::config::DashboardConfig;
use renderboard_core::report::{console, summarize_buckets};
use renderboard_core::storage::SqliteJobStore;
use renderboard_core::{JobQuery, Loader};

pub fn run(cfg: &DashboardConfig, args: StatsArgs) -> Result<i32> {
    let store = SqliteJobStore::open_read_only(&cfg.store.path, &cfg.store.collection)?;
    let stats = store.stats()?;
    let table = Loader::new(Arc::new(store), cfg.store.collection.clone(), cfg.store.max_time())
        .load(&JobQuery::default())?;
    let summaries = summarize_buckets(&table);

    match args.format {
        Format::Json => {
            let out = serde_json::json!({
                "store": stats,
                "date_range": table.date_bounds(),
                "buckets": summaries,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Text => {
            println!(
                "{}: {} documents (first import {}, last import {})",
                stats.collection,
                stats.documents,
                stats.first_inserted_at.as_deref().unwrap_or("-"),
                stats.last_inserted_at.as_deref().unwrap_or("-"),
            );
            console::print_summary(&table, &summaries);
        }
    }
    Ok(exit_codes::OK)
}
