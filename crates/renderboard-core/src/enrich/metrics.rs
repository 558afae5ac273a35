use crate::lenient;
use crate::model::JobRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFields {
    pub default_cost: Option<f64>,
    pub quality_score: Option<f64>,
    pub was_downloaded: bool,
    pub has_rewrite: bool,
}

pub fn derive_metrics(record: &JobRecord) -> MetricFields {
    MetricFields {
        default_cost: record.default_cost_raw().and_then(lenient::to_numeric),
        quality_score: record.quality_score_raw().and_then(lenient::to_numeric),
        was_downloaded: record.result_downloaded_at.is_some(),
        has_rewrite: record
            .rewritten_prompt_raw()
            .is_some_and(|v| !lenient::display(v).is_empty()),
    }
}
