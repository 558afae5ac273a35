use sha2::{Digest, Sha256};

use crate::loader::JobQuery;

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Stable key for a query against one collection. Model ids are sorted so the
/// same set in a different order maps to the same key.
pub fn query_fingerprint(collection: &str, query: &JobQuery) -> String {
    let mut parts = Vec::new();
    parts.push(format!("collection={}", collection));

    match &query.model_ids {
        Some(ids) => {
            let mut ids = ids.clone();
            ids.sort();
            ids.dedup();
            parts.push(format!("model_ids={}", ids.join(",")));
        }
        None => parts.push("model_ids=*".to_string()),
    }
    parts.push(format!("status={}", query.status.as_deref().unwrap_or("*")));
    parts.push(format!(
        "limit={}",
        query.limit.map(|n| n.to_string()).unwrap_or_else(|| "*".into())
    ));
    parts.push(format!("renderboard_version={}", env!("CARGO_PKG_VERSION")));

    sha256_hex(&parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_ignores_id_order() {
        let a = JobQuery {
            model_ids: Some(vec!["b".into(), "a".into()]),
            ..Default::default()
        };
        let b = JobQuery {
            model_ids: Some(vec!["a".into(), "b".into(), "a".into()]),
            ..Default::default()
        };
        assert_eq!(query_fingerprint("jobs", &a), query_fingerprint("jobs", &b));
        assert_eq!(query_fingerprint("jobs", &a).len(), 64);
    }

    #[test]
    fn test_fingerprint_separates_collections_and_filters() {
        let q = JobQuery::default();
        let s = JobQuery {
            status: Some("completed".into()),
            ..Default::default()
        };
        assert_ne!(query_fingerprint("jobs", &q), query_fingerprint("other", &q));
        assert_ne!(query_fingerprint("jobs", &q), query_fingerprint("jobs", &s));
    }
}
