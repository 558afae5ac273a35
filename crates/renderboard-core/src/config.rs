use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_COLLECTION, DEFAULT_MAX_TIME_MS, DEFAULT_TOP_N};
use crate::errors::ConfigError;
use crate::model::TaskType;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "renderboard.yaml";
pub const DEFAULT_DB_FILE: &str = ".renderboard/jobs.db";

pub const ENV_DB: &str = "RENDERBOARD_DB";
pub const ENV_MAX_TIME_MS: &str = "RENDERBOARD_MAX_TIME_MS";
pub const ENV_LOG: &str = "RENDERBOARD_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub version: u32,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub charts: ChartsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            charts: ChartsConfig::default(),
            log_level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub collection: String,
    pub max_time_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE),
            collection: DEFAULT_COLLECTION.to_string(),
            max_time_ms: DEFAULT_MAX_TIME_MS,
        }
    }
}

impl StoreConfig {
    pub fn max_time(&self) -> Duration {
        Duration::from_millis(self.max_time_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            max_entries: 64,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub top_n: usize,
    pub default_task: TaskType,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            default_task: TaskType::I2i,
        }
    }
}

/// Reads a YAML config. Unknown keys fail in strict mode and warn otherwise.
pub fn load_config(path: &Path, strict: bool) -> Result<DashboardConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, strict).map_err(|e| ConfigError(format!("{} (file: {})", e, path.display())))
}

pub fn parse_config(raw: &str, strict: bool) -> Result<DashboardConfig, ConfigError> {
    let mut ignored_keys = HashSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: DashboardConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // `x-` and `_` prefixed keys are free-form anchors.
    let mut unknown: Vec<_> = ignored_keys
        .into_iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();
    unknown.sort();
    if !unknown.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?}",
                unknown
            )));
        }
        // Logging is not initialized yet when the config is read.
        eprintln!("WARN: Ignored unknown config fields: {:?}", unknown);
    }

    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &DashboardConfig) -> Result<(), ConfigError> {
    if cfg.store.collection.trim().is_empty() {
        return Err(ConfigError("store.collection must not be empty".into()));
    }
    if cfg.charts.top_n == 0 {
        return Err(ConfigError("charts.top_n must be at least 1".into()));
    }
    if !cfg.charts.default_task.is_main() {
        return Err(ConfigError(format!(
            "charts.default_task must be one of the main task types, got {}",
            cfg.charts.default_task
        )));
    }
    Ok(())
}

impl DashboardConfig {
    /// Applies `RENDERBOARD_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.store.path = PathBuf::from(db);
        }
        if let Some(ms) = lookup(ENV_MAX_TIME_MS).filter(|v| !v.is_empty()) {
            self.store.max_time_ms = ms
                .trim()
                .parse()
                .map_err(|_| ConfigError(format!("{} must be an integer, got {:?}", ENV_MAX_TIME_MS, ms)))?;
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = Some(level);
        }
        Ok(())
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"version: 1
store:
  path: .renderboard/jobs.db
  collection: assetGenJobs
  max_time_ms: 10000
cache:
  enabled: true
  ttl_seconds: 900
  max_entries: 64
charts:
  top_n: 8
  default_task: i2i
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let cfg = parse_config("version: 1\n", true).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.store.collection, "assetGenJobs");
        assert_eq!(cfg.store.max_time(), Duration::from_secs(10));
        assert_eq!(cfg.cache.ttl(), Duration::from_secs(900));
        assert_eq!(cfg.charts.top_n, 8);
        assert_eq!(cfg.charts.default_task, TaskType::I2i);
    }

    #[test]
    fn test_strict_rejects_unknown_fields() {
        let raw = "version: 1\nstore:\n  colection: typo\n";
        let err = parse_config(raw, true).unwrap_err();
        assert!(err.0.contains("store.colection"), "{}", err);
        assert!(parse_config(raw, false).is_ok());
        assert!(parse_config("version: 1\nx-anchor: 1\n", true).is_ok());
    }

    #[test]
    fn test_rejects_bad_version_and_values() {
        assert!(parse_config("version: 2\n", false).is_err());
        assert!(parse_config("version: 1\ncharts:\n  top_n: 0\n", false).is_err());
        assert!(parse_config("version: 1\ncharts:\n  default_task: minimatics\n", false).is_err());
        assert!(parse_config("version: 1\ncharts:\n  default_task: t2v\n", false).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DB, "/tmp/x.db"),
            (ENV_MAX_TIME_MS, "250"),
            (ENV_LOG, "debug"),
        ]
        .into_iter()
        .collect();
        let mut cfg = DashboardConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.store.path, PathBuf::from("/tmp/x.db"));
        assert_eq!(cfg.store.max_time_ms, 250);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));

        let mut cfg = DashboardConfig::default();
        let err = cfg
            .apply_overrides(|k| (k == ENV_MAX_TIME_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.0.contains(ENV_MAX_TIME_MS));
    }

    #[test]
    fn test_sample_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path, true).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config(Path::new("/nonexistent/renderboard.yaml"), false).unwrap_err();
        assert!(err.0.contains("failed to read config"));
    }
}
