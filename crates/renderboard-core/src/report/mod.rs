pub mod console;

use serde::Serialize;

use crate::model::TaskBucket;
use crate::table::EnrichedTable;

/// Headline numbers for one display bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: TaskBucket,
    pub jobs: usize,
    pub total_cost: f64,
    pub download_rate: f64,
    pub avg_quality: Option<f64>,
}

/// One summary per bucket present in the table, most jobs first.
pub fn summarize_buckets(table: &EnrichedTable) -> Vec<BucketSummary> {
    let mut out: Vec<BucketSummary> = table
        .buckets()
        .into_iter()
        .map(|bucket| {
            let rows: Vec<_> = table.iter().filter(|r| r.model_type_agg == bucket).collect();
            let jobs = rows.len();
            let total_cost = rows.iter().filter_map(|r| r.default_cost).sum();
            let downloaded = rows.iter().filter(|r| r.was_downloaded).count();
            let scores: Vec<f64> = rows.iter().filter_map(|r| r.quality_score).collect();
            BucketSummary {
                bucket,
                jobs,
                total_cost,
                download_rate: if jobs == 0 { 0.0 } else { downloaded as f64 / jobs as f64 },
                avg_quality: (!scores.is_empty())
                    .then(|| scores.iter().sum::<f64>() / scores.len() as f64),
            }
        })
        .collect();
    out.sort_by(|a, b| b.jobs.cmp(&a.jobs).then_with(|| a.bucket.cmp(&b.bucket)));
    out
}
