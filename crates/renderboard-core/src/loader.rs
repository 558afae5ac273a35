//! Record fetcher: query the store, decode documents, hand back records or an
//! enriched table.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::TableCache;
use crate::constants::BASE_PROJECTION;
use crate::enrich::enrich_records;
use crate::errors::StoreError;
use crate::fingerprint::query_fingerprint;
use crate::model::JobRecord;
use crate::storage::{Filter, FindOptions, JobStore, Projection};
use crate::table::EnrichedTable;

/// Equality / set-membership filter on the fetched jobs. Empty means "everything".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl JobQuery {
    /// Empty id lists and empty status strings are treated as "no filter".
    pub fn filter(&self) -> Filter {
        let mut f = Filter::new();
        if let Some(ids) = self.model_ids.as_ref().filter(|ids| !ids.is_empty()) {
            f = f.is_in("modelConfig.id", ids.iter().cloned());
        }
        if let Some(status) = self.status.as_ref().filter(|s| !s.is_empty()) {
            f = f.eq("status", status.clone());
        }
        f
    }

    /// A zero limit means no limit.
    pub fn find_options(&self, max_time: Duration) -> FindOptions {
        FindOptions {
            max_time,
            limit: self.limit.filter(|n| *n > 0),
        }
    }
}

pub fn base_projection() -> Projection {
    Projection::new(BASE_PROJECTION.iter().copied())
}

pub fn fetch_jobs(
    store: &dyn JobStore,
    query: &JobQuery,
    max_time: Duration,
) -> Result<Vec<JobRecord>, StoreError> {
    let docs = store.find(&query.filter(), &base_projection(), &query.find_options(max_time))?;
    tracing::info!(event = "fetch_jobs", documents = docs.len(), query = ?query);
    Ok(docs.into_iter().map(JobRecord::from_document).collect())
}

/// Fetch + enrich. An empty result is an empty table, not an error.
pub fn load_table(
    store: &dyn JobStore,
    query: &JobQuery,
    max_time: Duration,
) -> Result<EnrichedTable, StoreError> {
    let records = fetch_jobs(store, query, max_time)?;
    Ok(enrich_records(records))
}

/// Store handle plus the settings every view load shares.
pub struct Loader {
    store: Arc<dyn JobStore>,
    scope: String,
    max_time: Duration,
    cache: Option<TableCache>,
}

impl Loader {
    /// `scope` names the collection; it separates cache entries of different stores.
    pub fn new(store: Arc<dyn JobStore>, scope: impl Into<String>, max_time: Duration) -> Self {
        Self {
            store,
            scope: scope.into(),
            max_time,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: TableCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn load(&self, query: &JobQuery) -> Result<Arc<EnrichedTable>, StoreError> {
        let load = || load_table(self.store.as_ref(), query, self.max_time);
        match &self.cache {
            Some(cache) => cache.get_or_try_load(&query_fingerprint(&self.scope, query), load),
            None => load().map(Arc::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Condition, MemoryJobStore};
    use serde_json::json;

    fn store() -> MemoryJobStore {
        MemoryJobStore::new(vec![
            json!({"_id": "1", "status": "completed", "createdAt": "2024-02-01T00:00:00Z", "modelConfig": {"id": "t2i-flux", "modelTitle": "Flux Pro"}, "internal": "dropped"}),
            json!({"_id": "2", "status": "failed", "modelConfig": {"id": "i2v-kling", "modelTitle": "Kling v1"}}),
            json!({"_id": "3", "status": "completed", "modelConfig": {"id": "i2v-kling", "modelTitle": "Kling v1"}}),
        ])
    }

    #[test]
    fn test_query_to_filter() {
        assert!(JobQuery::default().filter().is_empty());

        let q = JobQuery {
            model_ids: Some(vec![]),
            status: Some(String::new()),
            limit: Some(0),
        };
        assert!(q.filter().is_empty());
        assert_eq!(q.find_options(Duration::from_secs(1)).limit, None);

        let q = JobQuery {
            model_ids: Some(vec!["t2i-flux".into()]),
            status: Some("completed".into()),
            limit: None,
        };
        let conds: Vec<_> = q.filter().conditions().map(|(p, c)| (p.to_string(), c.clone())).collect();
        assert_eq!(
            conds,
            vec![
                ("modelConfig.id".to_string(), Condition::In(vec![json!("t2i-flux")])),
                ("status".to_string(), Condition::Eq(json!("completed"))),
            ]
        );
    }

    #[test]
    fn test_fetch_applies_filter_and_limit() {
        let s = store();
        let q = JobQuery {
            model_ids: Some(vec!["i2v-kling".into()]),
            ..Default::default()
        };
        let recs = fetch_jobs(&s, &q, Duration::from_secs(10)).unwrap();
        assert_eq!(recs.len(), 2);

        let q = JobQuery {
            limit: Some(1),
            ..Default::default()
        };
        let recs = fetch_jobs(&s, &q, Duration::from_secs(10)).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn test_empty_result_is_empty_table() {
        let q = JobQuery {
            status: Some("queued".into()),
            ..Default::default()
        };
        let table = load_table(&store(), &q, Duration::from_secs(10)).unwrap();
        assert!(table.is_empty());

        let table = load_table(&MemoryJobStore::default(), &JobQuery::default(), Duration::ZERO).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_loader_caches_by_query() {
        let loader = Loader::new(Arc::new(store()), "assetGenJobs", Duration::from_secs(10))
            .with_cache(TableCache::new(Duration::from_secs(60), 16));
        let a = loader.load(&JobQuery::default()).unwrap();
        let b = loader.load(&JobQuery::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 3);

        let c = loader
            .load(&JobQuery {
                status: Some("failed".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(c.len(), 1);
    }
}
