pub mod breakdown;
pub mod enrich;
pub mod import;
pub mod init;
pub mod overview;
pub mod palette;
pub mod render;
pub mod stats;

use std::sync::Arc;

use anyhow::Result;
use renderboard_core::cache::TableCache;
use renderboard_core::config::{load_config, DashboardConfig, DEFAULT_CONFIG_FILE};
use renderboard_core::storage::SqliteJobStore;
use renderboard_core::table::RowFilter;
use renderboard_core::{ConfigError, Loader, StoreError};

use super::args::{Cli, Command, DateArgs, GlobalArgs};

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const NO_DATA: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const STORE_ERROR: i32 = 3;
}

/// Config file (or defaults), then environment, then command-line flags.
pub fn resolve_config(global: &GlobalArgs) -> Result<DashboardConfig, ConfigError> {
    let mut cfg = if global.config.exists() {
        load_config(&global.config, global.strict)?
    } else if global.config.as_os_str() == DEFAULT_CONFIG_FILE {
        DashboardConfig::default()
    } else {
        return Err(ConfigError(format!(
            "config file not found: {}",
            global.config.display()
        )));
    };
    cfg.apply_env()?;
    if let Some(db) = &global.db {
        cfg.store.path = db.clone();
    }
    if let Some(collection) = &global.collection {
        cfg.store.collection = collection.clone();
    }
    Ok(cfg)
}

/// Read-only loader over the configured store.
pub fn open_loader(cfg: &DashboardConfig) -> Result<Loader, StoreError> {
    let store = SqliteJobStore::open_read_only(&cfg.store.path, &cfg.store.collection)?;
    let loader = Loader::new(Arc::new(store), cfg.store.collection.clone(), cfg.store.max_time());
    Ok(if cfg.cache.enabled {
        loader.with_cache(TableCache::new(cfg.cache.ttl(), cfg.cache.max_entries))
    } else {
        loader
    })
}

pub fn date_filter(dates: &DateArgs) -> RowFilter {
    RowFilter {
        from: dates.from,
        to: dates.to,
        ..Default::default()
    }
}

pub fn dispatch(cli: Cli, cfg: DashboardConfig) -> Result<i32> {
    match cli.cmd {
        Command::Init(args) => init::run(&cli.global, args),
        Command::Import(args) => import::run(&cfg, args),
        Command::Overview(args) => overview::run(&cfg, args),
        Command::Breakdown(args) => breakdown::run(&cfg, args),
        Command::Palette(args) => palette::run(&cfg, args),
        Command::Enrich(args) => enrich::run(&cfg, args),
        Command::Stats(args) => stats::run(&cfg, args),
    }
}

/// Typed core errors keep their own exit code; anything else is a usage/config failure.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|e| e.downcast_ref::<StoreError>().is_some()) {
        exit_codes::STORE_ERROR
    } else {
        exit_codes::CONFIG_ERROR
    }
}
