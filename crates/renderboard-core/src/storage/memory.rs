use std::time::Instant;

use serde_json::Value;

use super::query::{Filter, FindOptions, Projection};
use super::JobStore;
use crate::errors::StoreError;

/// Vec-backed store; filters are evaluated in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    docs: Vec<Value>,
}

impl MemoryJobStore {
    pub fn new(docs: Vec<Value>) -> Self {
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl JobStore for MemoryJobStore {
    fn find(
        &self,
        filter: &Filter,
        projection: &Projection,
        options: &FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        let started = Instant::now();
        let limit = options.limit.map_or(usize::MAX, |n| n as usize);
        let mut out = Vec::new();
        for doc in self.docs.iter().filter(|d| filter.matches(d)) {
            if out.len() >= limit {
                break;
            }
            if !options.max_time.is_zero() && started.elapsed() > options.max_time {
                return Err(StoreError::Timeout(options.max_time));
            }
            out.push(projection.apply(doc));
        }
        Ok(out)
    }
}
