pub mod cache;
pub mod config;
pub mod constants;
pub mod enrich;
pub mod errors;
pub mod fingerprint;
pub mod lenient;
pub mod loader;
pub mod model;
pub mod palette;
pub mod report;
pub mod storage;
pub mod table;

pub use enrich::enrich_records;
pub use errors::{ConfigError, StoreError};
pub use config::DashboardConfig;
pub use loader::{fetch_jobs, load_table, JobQuery, Loader};
pub use model::{EnrichedRow, JobRecord, TaskBucket, TaskType};
pub use palette::{build_family_palette, detect_family, ramp_around_base, Family};
pub use table::EnrichedTable;
