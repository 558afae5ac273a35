use renderboard_charts::{overview, task_breakdown, Chart, StackMode};
use renderboard_core::{enrich_records, EnrichedTable, JobRecord};
use serde_json::json;

fn table() -> EnrichedTable {
    let docs = vec![
        json!({"createdAt": "2024-07-01T00:00:00Z", "modelConfig": {"id": "i2v-kling", "modelTitle": "Kling 2.1", "costConfig": {"defaultCost": 8}}, "qualityAnalysis": {"score": 0.7}}),
        json!({"createdAt": "2024-07-02T00:00:00Z", "modelConfig": {"id": "i2v-veo", "modelTitle": "Veo 3", "costConfig": {"defaultCost": 20}}, "qualityAnalysis": {"score": 0.9}}),
        json!({"createdAt": "2024-07-09T00:00:00Z", "modelConfig": {"id": "i2v-kling", "modelTitle": "Kling 2.1", "costConfig": {"defaultCost": 8}}, "qualityAnalysis": {"score": 0.5}}),
    ];
    enrich_records(docs.into_iter().map(JobRecord::from_document).collect())
}

#[test]
fn test_charts_serialize_with_kind_tag() {
    let t = table();
    let charts: Vec<Chart> = vec![
        overview::requests_over_time(&t, StackMode::Percent).into(),
        overview::jobs_and_cost(&t).into(),
    ];
    let v = serde_json::to_value(&charts).unwrap();
    assert_eq!(v[0]["kind"], "area");
    assert_eq!(v[0]["mode"], "percent");
    assert_eq!(v[0]["weeks"], json!(["2024-07-01", "2024-07-08"]));
    assert_eq!(v[1]["kind"], "grouped_bar");
    assert_eq!(v[1]["categories"], json!(["i2v"]));
}

#[test]
fn test_breakdown_chart_kinds() {
    let charts = task_breakdown::breakdown(&table(), 8, StackMode::Absolute);
    let kinds: Vec<String> = charts
        .iter()
        .map(|c| serde_json::to_value(c).unwrap()["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["area", "area", "box", "density", "bar", "bar", "line", "quality_cost"]
    );
}
