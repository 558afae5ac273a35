use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::table::EnrichedTable;

/// Enriched tables kept for a fixed time-to-live, keyed by query fingerprint.
#[derive(Clone)]
pub struct TableCache {
    tables: Cache<String, Arc<EnrichedTable>>,
}

impl TableCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            tables: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<EnrichedTable>> {
        self.tables.get(key)
    }

    pub fn insert(&self, key: &str, table: Arc<EnrichedTable>) {
        self.tables.insert(key.to_string(), table);
    }

    /// Returns the cached table or runs `load`. Errors are not cached.
    pub fn get_or_try_load<E>(
        &self,
        key: &str,
        load: impl FnOnce() -> Result<EnrichedTable, E>,
    ) -> Result<Arc<EnrichedTable>, E> {
        if let Some(hit) = self.get(key) {
            tracing::debug!(event = "cache_hit", key = %key, cache = "tables");
            return Ok(hit);
        }
        tracing::debug!(event = "cache_miss", key = %key, cache = "tables");
        let table = Arc::new(load()?);
        self.insert(key, table.clone());
        Ok(table)
    }
}
