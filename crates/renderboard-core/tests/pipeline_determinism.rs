//! The same documents always produce the same enriched rows and palette,
//! regardless of input order.

use renderboard_core::palette::OTHER_COLOR;
use renderboard_core::table::{Aggregate, Dimension, Measure};
use renderboard_core::{build_family_palette, enrich_records, EnrichedTable, JobRecord};
use serde_json::{json, Value};

fn docs() -> Vec<Value> {
    vec![
        json!({"_id": "1", "createdAt": "2024-06-03T08:00:00Z", "modelConfig": {"id": "t2i-flux-pro", "modelTitle": "FLUX 1.1 Pro", "costConfig": {"defaultCost": 6}}}),
        json!({"_id": "2", "createdAt": "2024-06-04T08:00:00Z", "modelConfig": {"id": "t2i-flux-dev", "modelTitle": "Flux Dev", "costConfig": {"defaultCost": 2}}}),
        json!({"_id": "3", "createdAt": "2024-06-05T08:00:00Z", "modelConfig": {"id": "i2v-kling", "modelTitle": "Kling 2.1", "costConfig": {"defaultCost": 20}}}),
        json!({"_id": "4", "createdAt": "2024-06-06T08:00:00Z", "modelConfig": {"id": "t2i-mystery", "modelTitle": "Mystery Model", "costConfig": {"defaultCost": 1}}}),
        json!({"_id": "5", "createdAt": "2024-06-10T08:00:00Z", "modelConfig": {"id": "t2i-flux-pro", "modelTitle": "FLUX 1.1 Pro", "costConfig": {"defaultCost": 6}}}),
    ]
}

fn table(docs: Vec<Value>) -> EnrichedTable {
    enrich_records(docs.into_iter().map(JobRecord::from_document).collect())
}

fn palette_for(t: &EnrichedTable) -> renderboard_core::palette::Palette {
    let weights = t.grouped_map(Dimension::Title, Aggregate::Sum(Measure::DefaultCost));
    let titles: Vec<String> = t.iter().filter_map(|r| r.title().map(str::to_string)).collect();
    build_family_palette(titles, Some(&weights))
}

#[test]
fn test_palette_is_order_independent() {
    let forward = table(docs());
    let mut reversed_docs = docs();
    reversed_docs.reverse();
    let reversed = table(reversed_docs);

    let a = palette_for(&forward);
    let b = palette_for(&reversed);
    assert_eq!(a, b);
    assert_eq!(a.len(), 4);

    // Heaviest Flux title keeps the lighter shade; the base color is in the ramp.
    assert_ne!(a["FLUX 1.1 Pro"], a["Flux Dev"]);
    assert!(a.values().any(|c| c == "#59a14f"));
    assert_eq!(a["Kling 2.1"], "#EDC948");
    assert_eq!(a["Mystery Model"], OTHER_COLOR);
}

#[test]
fn test_weekly_counts_are_stable() {
    let t = table(docs());
    let weekly = t.weekly(Dimension::TaskBucket, Aggregate::Count);
    let flat: Vec<_> = weekly
        .iter()
        .map(|p| (p.week_start.to_string(), p.group.as_str(), p.value))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("2024-06-03".to_string(), "i2v", Some(1.0)),
            ("2024-06-03".to_string(), "t2i", Some(3.0)),
            ("2024-06-10".to_string(), "t2i", Some(1.0)),
        ]
    );
}
