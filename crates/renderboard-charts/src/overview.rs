//! Cross-task charts grouped by display bucket.

use renderboard_core::model::TaskBucket;
use renderboard_core::palette::OTHER_COLOR;
use renderboard_core::table::{Aggregate, Dimension, Measure};
use renderboard_core::EnrichedTable;

use crate::chart::{stack, AreaChart, BarSeries, GroupedBarChart, StackMode};

pub const JOBS_COLOR: &str = "#4E79A7";
pub const COST_COLOR: &str = "#E15759";

/// Fixed bucket colors so buckets keep their color across charts and filters.
pub fn bucket_color(bucket: &str) -> String {
    let color = match TaskBucket::parse(bucket) {
        Some(TaskBucket::T2i) => "#636EFA",
        Some(TaskBucket::I2i) => "#EF553B",
        Some(TaskBucket::I2v) => "#00CC96",
        Some(TaskBucket::V2v) => "#AB63FA",
        Some(TaskBucket::T2v) => "#FFA15A",
        Some(TaskBucket::Other) | None => OTHER_COLOR,
    };
    color.to_string()
}

/// Weekly job counts per bucket.
pub fn requests_over_time(table: &EnrichedTable, mode: StackMode) -> AreaChart {
    let points = table.weekly(Dimension::TaskBucket, Aggregate::Count);
    let (weeks, series) = stack(&points, mode, bucket_color);
    AreaChart {
        title: "Requests Over Time".into(),
        y_title: mode.y_title("Jobs").into(),
        mode,
        weeks,
        series,
    }
}

/// Weekly summed default cost per bucket.
pub fn cost_over_time(table: &EnrichedTable, mode: StackMode) -> AreaChart {
    let points = table.weekly(Dimension::TaskBucket, Aggregate::Sum(Measure::DefaultCost));
    let (weeks, series) = stack(&points, mode, bucket_color);
    AreaChart {
        title: "Cost Over Time".into(),
        y_title: mode.y_title("Total Cost").into(),
        mode,
        weeks,
        series,
    }
}

/// Job count and total cost per bucket, buckets ordered by job count.
pub fn jobs_and_cost(table: &EnrichedTable) -> GroupedBarChart {
    let counts = table.value_counts(Dimension::TaskBucket);
    let costs = table.grouped_map(Dimension::TaskBucket, Aggregate::Sum(Measure::DefaultCost));

    let categories: Vec<String> = counts.iter().map(|(b, _)| b.clone()).collect();
    let jobs = counts.iter().map(|(_, n)| *n as f64).collect();
    let cost = categories
        .iter()
        .map(|b| costs.get(b).copied().unwrap_or(0.0))
        .collect();

    GroupedBarChart {
        title: "Jobs and Total Cost per Model Type (sorted by jobs)".into(),
        categories,
        series: vec![
            BarSeries {
                name: "Jobs".into(),
                color: JOBS_COLOR.into(),
                values: jobs,
            },
            BarSeries {
                name: "Total Cost".into(),
                color: COST_COLOR.into(),
                values: cost,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderboard_core::{enrich_records, JobRecord};
    use serde_json::json;

    fn table() -> EnrichedTable {
        let docs = vec![
            json!({"createdAt": "2024-04-01T10:00:00Z", "modelConfig": {"id": "t2i-a", "costConfig": {"defaultCost": 2}}}),
            json!({"createdAt": "2024-04-02T10:00:00Z", "modelConfig": {"id": "t2i-b", "costConfig": {"defaultCost": 2}}}),
            json!({"createdAt": "2024-04-03T10:00:00Z", "modelConfig": {"id": "i2v-a", "costConfig": {"defaultCost": 12}}}),
            json!({"createdAt": "2024-04-09T10:00:00Z", "modelConfig": {"id": "t2s-a", "costConfig": {"defaultCost": 1}}}),
        ];
        enrich_records(docs.into_iter().map(JobRecord::from_document).collect())
    }

    #[test]
    fn test_requests_percent_mode() {
        let chart = requests_over_time(&table(), StackMode::Percent);
        assert_eq!(chart.y_title, "Percent");
        assert_eq!(chart.weeks.len(), 2);
        let t2i = chart.series.iter().find(|s| s.name == "t2i").unwrap();
        assert!((t2i.points[0].value - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(t2i.points[1].value, 0.0);
        assert_eq!(t2i.color, "#636EFA");
        let other = chart.series.iter().find(|s| s.name == "other").unwrap();
        assert_eq!(other.points[1].value, 100.0);
        assert_eq!(other.color, OTHER_COLOR);
    }

    #[test]
    fn test_cost_over_time_orders_by_total() {
        let chart = cost_over_time(&table(), StackMode::Absolute);
        let names: Vec<_> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["i2v", "t2i", "other"]);
        assert_eq!(chart.series[0].total(), 12.0);
    }

    #[test]
    fn test_jobs_and_cost_sorted_by_jobs() {
        let chart = jobs_and_cost(&table());
        assert_eq!(chart.categories, vec!["t2i", "i2v", "other"]);
        assert_eq!(chart.series[0].values, vec![2.0, 1.0, 1.0]);
        assert_eq!(chart.series[1].values, vec![4.0, 12.0, 1.0]);
    }

    #[test]
    fn test_empty_table_gives_empty_charts() {
        let empty = EnrichedTable::default();
        assert!(requests_over_time(&empty, StackMode::Absolute).series.is_empty());
        assert!(jobs_and_cost(&empty).categories.is_empty());
    }
}
