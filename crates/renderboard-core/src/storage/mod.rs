pub mod memory;
pub mod query;
pub mod schema;
pub mod store;

use serde_json::Value;

use crate::errors::StoreError;

pub use memory::MemoryJobStore;
pub use query::{Condition, Filter, FindOptions, Projection};
pub use store::{SqliteJobStore, StoreStats};

/// Read side of a document store holding job records.
pub trait JobStore: Send + Sync {
    /// Documents matching `filter`, restricted to `projection`, in insertion order.
    ///
    /// An empty result is `Ok(vec![])`. Exceeding `options.max_time` is
    /// [`StoreError::Timeout`].
    fn find(
        &self,
        filter: &Filter,
        projection: &Projection,
        options: &FindOptions,
    ) -> Result<Vec<Value>, StoreError>;
}
