use super::exit_codes;
use crate::cli::args::ImportArgs;
use anyhow::{Context, Result};
use renderboard_core::config::DashboardConfig;
use renderboard_core::storage::SqliteJobStore;

pub fn run(cfg: &DashboardConfig, args: ImportArgs) -> Result<i32> {
    if let Some(parent) = cfg.store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let store = SqliteJobStore::open(&cfg.store.path, &cfg.store.collection)?;
    store.init_schema()?;

    let mut total = 0;
    for file in &args.files {
        let n = store
            .import_file(file)
            .with_context(|| format!("import of {} failed", file.display()))?;
        eprintln!("imported {} documents from {}", n, file.display());
        total += n;
    }
    let stats = store.stats()?;
    println!(
        "{} documents imported into {} ({} total)",
        total, stats.collection, stats.documents
    );
    Ok(exit_codes::OK)
}
