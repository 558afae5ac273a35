//! Record → enriched row. Three independent column passes (time, model,
//! metrics) over the same record; none of them can fail.

pub mod classify;
pub mod metrics;
pub mod time;

use crate::model::{EnrichedRow, JobRecord};
use crate::table::EnrichedTable;

pub use classify::{classify_model_type, extract_model_title};
pub use metrics::derive_metrics;
pub use time::{parse_timestamp, time_fields, week_start};

pub fn enrich_record(record: JobRecord) -> EnrichedRow {
    let time = time_fields(record.created_at.as_ref());
    let model_type = classify_model_type(record.model_id(), record.model_name());
    let title = extract_model_title(&record, model_type);
    let metrics = derive_metrics(&record);

    EnrichedRow {
        created_at_utc: time.created_at,
        dt: time.dt,
        iso_year: time.iso_year,
        iso_week: time.iso_week,
        week_start: time.week_start,
        model_type,
        model_type_agg: model_type.bucket(),
        model_title_extracted: title,
        default_cost: metrics.default_cost,
        quality_score: metrics.quality_score,
        was_downloaded: metrics.was_downloaded,
        has_rewrite: metrics.has_rewrite,
        record,
    }
}

pub fn enrich_records(records: Vec<JobRecord>) -> EnrichedTable {
    let total = records.len();
    let rows: Vec<EnrichedRow> = records.into_iter().map(enrich_record).collect();
    let undated = rows.iter().filter(|r| r.created_at_utc.is_none()).count();
    let unknown = rows
        .iter()
        .filter(|r| r.model_type == crate::model::TaskType::Unknown)
        .count();
    tracing::debug!(event = "enrich_table", rows = total, undated, unknown_task = unknown);
    EnrichedTable::new(rows)
}
