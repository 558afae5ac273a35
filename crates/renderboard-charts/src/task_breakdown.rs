//! Per-task charts: how the models inside one task type compare.
//!
//! The usage and cost areas rank titles themselves; every other chart is
//! drawn for a caller-supplied list of top titles (usually
//! [`EnrichedTable::top_titles`]) and returns `None` when nothing is left to
//! plot.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use renderboard_core::palette::{build_family_palette, Palette};
use renderboard_core::table::{Aggregate, Dimension, Measure, RowFilter};
use renderboard_core::EnrichedTable;

use crate::chart::{
    color_of, fold_top_n, group_totals, stack, AreaChart, Bar, BarChart, BoxChart, BoxStats, Chart,
    Curve, DensityChart, LineChart, Point, QualityCostChart, QualityCostRow, Series, StackMode,
};
use crate::stats::{five_number, gaussian_kde};

const MIN_MARKER_SIZE: f64 = 40.0;

fn area(
    table: &EnrichedTable,
    agg: Aggregate,
    top_n: usize,
    mode: StackMode,
    title: &str,
    y_title: &str,
) -> AreaChart {
    let points = fold_top_n(table.weekly(Dimension::Title, agg), top_n);
    let totals = group_totals(&points);
    let titles: BTreeSet<&str> = points.iter().map(|p| p.group.as_str()).collect();
    let palette = build_family_palette(titles, Some(&totals));
    let (weeks, series) = stack(&points, mode, |label| color_of(&palette, label));
    AreaChart {
        title: title.into(),
        y_title: mode.y_title(y_title).into(),
        mode,
        weeks,
        series,
    }
}

/// Weekly job counts of the `top_n` most used titles; the rest is `Other`.
pub fn usage_over_time(table: &EnrichedTable, top_n: usize, mode: StackMode) -> AreaChart {
    area(table, Aggregate::Count, top_n, mode, "Generation Usage Over Time", "Jobs")
}

/// Weekly cost of the `top_n` most expensive titles; the rest is `Other`.
pub fn cost_over_time(table: &EnrichedTable, top_n: usize, mode: StackMode) -> AreaChart {
    area(
        table,
        Aggregate::Sum(Measure::DefaultCost),
        top_n,
        mode,
        "Cost Over Time",
        "Total Cost",
    )
}

/// Rows of `titles` only, with a palette weighted by each title's total cost.
fn restrict(table: &EnrichedTable, titles: &[String]) -> Option<(EnrichedTable, Palette)> {
    let subset = table.filter(&RowFilter {
        titles: Some(titles.to_vec()),
        ..Default::default()
    });
    if subset.is_empty() {
        return None;
    }
    let totals = subset.grouped_map(Dimension::Title, Aggregate::Sum(Measure::DefaultCost));
    let palette = build_family_palette(subset.iter().filter_map(|r| r.title()), Some(&totals));
    Some((subset, palette))
}

fn scores_by_title(table: &EnrichedTable) -> HashMap<&str, Vec<f64>> {
    let mut scores: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in table.iter() {
        if let (Some(title), Some(score)) = (row.title(), row.quality_score) {
            scores.entry(title).or_default().push(score);
        }
    }
    scores
}

/// Quality score box statistics, one box per title in `titles` order.
pub fn quality_box(table: &EnrichedTable, titles: &[String]) -> Option<BoxChart> {
    let (subset, palette) = restrict(table, titles)?;
    let scores = scores_by_title(&subset);
    let boxes: Vec<BoxStats> = titles
        .iter()
        .filter_map(|t| {
            let values = scores.get(t.as_str())?;
            let f = five_number(values)?;
            Some(BoxStats {
                label: t.clone(),
                color: color_of(&palette, t),
                n: values.len(),
                whisker_low: f.whisker_low,
                q1: f.q1,
                median: f.median,
                q3: f.q3,
                whisker_high: f.whisker_high,
            })
        })
        .collect();
    (!boxes.is_empty()).then(|| BoxChart {
        title: "Quality score by model".into(),
        boxes,
    })
}

/// Quality score density per title. Titles with fewer than two distinct
/// scores have no curve.
pub fn quality_density(table: &EnrichedTable, titles: &[String]) -> Option<DensityChart> {
    let (subset, palette) = restrict(table, titles)?;
    let scores = scores_by_title(&subset);
    let curves: Vec<Curve> = titles
        .iter()
        .filter_map(|t| {
            let points = gaussian_kde(scores.get(t.as_str())?)?;
            Some(Curve {
                name: t.clone(),
                color: color_of(&palette, t),
                points,
            })
        })
        .collect();
    (!curves.is_empty()).then(|| DensityChart {
        title: "Quality score distribution".into(),
        curves,
    })
}

/// Per-title bars of `agg`, largest first; titles without a value go last.
fn ranked_bars(subset: &EnrichedTable, palette: &Palette, agg: Aggregate) -> Vec<Bar> {
    let mut bars: Vec<Bar> = subset
        .grouped(Dimension::Title, agg)
        .into_iter()
        .map(|g| Bar {
            color: color_of(palette, &g.group),
            label: g.group,
            value: g.value,
        })
        .collect();
    bars.sort_by(|a, b| match (a.value, b.value) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    bars
}

/// Share of jobs whose result was downloaded, per title.
pub fn download_rate(table: &EnrichedTable, titles: &[String]) -> Option<BarChart> {
    let (subset, palette) = restrict(table, titles)?;
    Some(BarChart {
        title: "Download rate by model".into(),
        value_title: "Download rate".into(),
        bars: ranked_bars(&subset, &palette, Aggregate::Mean(Measure::WasDownloaded)),
    })
}

/// Mean default cost per title.
pub fn avg_cost(table: &EnrichedTable, titles: &[String]) -> Option<BarChart> {
    let (subset, palette) = restrict(table, titles)?;
    Some(BarChart {
        title: "Average default cost by model".into(),
        value_title: "Average Cost".into(),
        bars: ranked_bars(&subset, &palette, Aggregate::Mean(Measure::DefaultCost)),
    })
}

/// Weekly mean default cost per title. Weeks without any cost are skipped.
pub fn weekly_avg_cost(table: &EnrichedTable, titles: &[String]) -> Option<LineChart> {
    let (subset, palette) = restrict(table, titles)?;
    let mut by_title: BTreeMap<String, Vec<Point>> = BTreeMap::new();
    for p in subset.weekly(Dimension::Title, Aggregate::Mean(Measure::DefaultCost)) {
        if let Some(value) = p.value {
            by_title.entry(p.group).or_default().push(Point {
                week_start: p.week_start,
                value,
            });
        }
    }
    let series = titles
        .iter()
        .filter_map(|t| {
            let points = by_title.remove(t)?;
            Some(Series {
                name: t.clone(),
                color: color_of(&palette, t),
                points,
            })
        })
        .collect();
    Some(LineChart {
        title: "Weekly average cost".into(),
        y_title: "Average Cost".into(),
        series,
    })
}

/// Job count, mean quality, mean cost and download rate per title.
pub fn quality_vs_cost(table: &EnrichedTable, titles: &[String]) -> Option<QualityCostChart> {
    let (subset, palette) = restrict(table, titles)?;
    let n = subset.grouped_map(Dimension::Title, Aggregate::Count);
    let score = subset.grouped_map(Dimension::Title, Aggregate::Mean(Measure::QualityScore));
    let cost = subset.grouped_map(Dimension::Title, Aggregate::Mean(Measure::DefaultCost));
    let downloads = subset.grouped_map(Dimension::Title, Aggregate::Mean(Measure::WasDownloaded));

    let mut rows: Vec<QualityCostRow> = n
        .iter()
        .map(|(title, count)| {
            let count = *count as usize;
            QualityCostRow {
                title: title.clone(),
                color: color_of(&palette, title),
                n: count,
                avg_score: score.get(title).copied(),
                avg_cost: cost.get(title).copied(),
                download_rate: downloads.get(title).copied(),
                marker_size: ((count as f64).sqrt() * 20.0).max(MIN_MARKER_SIZE),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.title.cmp(&b.title));
    Some(QualityCostChart {
        title: "Quality vs Cost".into(),
        rows,
    })
}

/// Every per-task chart for an already-masked table. Quality charts are
/// included only when some row has a score.
pub fn breakdown(table: &EnrichedTable, top_n: usize, mode: StackMode) -> Vec<Chart> {
    let mut charts: Vec<Chart> = vec![
        usage_over_time(table, top_n, mode).into(),
        cost_over_time(table, top_n, mode).into(),
    ];
    let top = table.top_titles(top_n);
    if table.has_quality() {
        charts.extend(quality_box(table, &top).map(Chart::from));
        charts.extend(quality_density(table, &top).map(Chart::from));
        charts.extend(download_rate(table, &top).map(Chart::from));
    }
    charts.extend(avg_cost(table, &top).map(Chart::from));
    charts.extend(weekly_avg_cost(table, &top).map(Chart::from));
    charts.extend(quality_vs_cost(table, &top).map(Chart::from));
    tracing::debug!(event = "breakdown_charts", rows = table.len(), charts = charts.len(), top_n);
    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderboard_core::constants::OTHER_LABEL;
    use renderboard_core::palette::OTHER_COLOR;
    use renderboard_core::{enrich_records, JobRecord};
    use serde_json::{json, Value};

    fn job(day: u32, title: &str, cost: f64, score: Option<f64>, downloaded: bool) -> Value {
        let mut doc = json!({
            "createdAt": format!("2024-04-{day:02}T12:00:00Z"),
            "modelConfig": {"id": "t2i-x", "modelTitle": title, "costConfig": {"defaultCost": cost}},
        });
        if let Some(s) = score {
            doc["qualityAnalysis"] = json!({"score": s});
        }
        if downloaded {
            doc["resultDownloadedAt"] = json!("2024-04-20T00:00:00Z");
        }
        doc
    }

    fn table() -> EnrichedTable {
        let docs = vec![
            job(1, "Flux Pro", 5.0, Some(0.8), true),
            job(2, "Flux Pro", 5.0, Some(0.6), false),
            job(3, "Flux Pro", 5.0, Some(0.7), true),
            job(2, "Flux Dev", 1.0, Some(0.4), false),
            job(9, "Flux Dev", 1.0, None, true),
            job(9, "Imagen 4", 3.0, None, false),
            job(10, "Mystery", 0.5, None, false),
        ];
        enrich_records(docs.into_iter().map(JobRecord::from_document).collect())
    }

    fn titles(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_usage_folds_tail_into_gray_other() {
        let chart = usage_over_time(&table(), 2, StackMode::Absolute);
        let names: Vec<_> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Flux Pro", "Flux Dev", OTHER_LABEL]);
        let other = chart.series.last().unwrap();
        assert_eq!(other.color, OTHER_COLOR);
        assert_eq!(other.total(), 2.0);
        // Two flux titles share the family ramp.
        assert_ne!(chart.series[0].color, chart.series[1].color);
    }

    #[test]
    fn test_tied_titles_keep_their_colors_across_calls() {
        let docs = vec![job(1, "Flux Pro", 1.0, None, false), job(1, "Flux Dev", 1.0, None, false)];
        let t = enrich_records(docs.into_iter().map(JobRecord::from_document).collect());
        let colors = |chart: &AreaChart| -> BTreeMap<String, String> {
            chart.series.iter().map(|s| (s.name.clone(), s.color.clone())).collect()
        };
        let first = colors(&usage_over_time(&t, 8, StackMode::Absolute));
        assert_ne!(first["Flux Pro"], first["Flux Dev"]);
        for _ in 0..50 {
            assert_eq!(colors(&usage_over_time(&t, 8, StackMode::Absolute)), first);
            assert_eq!(colors(&cost_over_time(&t, 8, StackMode::Percent)), first);
        }
    }

    #[test]
    fn test_cost_area_ranks_by_cost() {
        let chart = cost_over_time(&table(), 1, StackMode::Absolute);
        assert_eq!(chart.series[0].name, "Flux Pro");
        assert_eq!(chart.series[0].total(), 15.0);
        assert_eq!(chart.series[1].name, OTHER_LABEL);
        assert_eq!(chart.series[1].total(), 5.5);
    }

    #[test]
    fn test_quality_box_in_title_order() {
        let chart = quality_box(&table(), &titles(&["Flux Dev", "Flux Pro", "Imagen 4"])).unwrap();
        let labels: Vec<_> = chart.boxes.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Flux Dev", "Flux Pro"]);
        let pro = &chart.boxes[1];
        assert_eq!(pro.n, 3);
        assert!((pro.median - 0.7).abs() < 1e-12);
        assert!((pro.q1 - 0.65).abs() < 1e-12);

        assert!(quality_box(&table(), &titles(&["Imagen 4"])).is_none());
        assert!(quality_box(&table(), &titles(&["Nope"])).is_none());
    }

    #[test]
    fn test_density_needs_spread() {
        let chart = quality_density(&table(), &titles(&["Flux Pro", "Flux Dev"])).unwrap();
        assert_eq!(chart.curves.len(), 1);
        assert_eq!(chart.curves[0].name, "Flux Pro");
    }

    #[test]
    fn test_download_rate_sorted_descending() {
        let chart = download_rate(&table(), &titles(&["Flux Pro", "Flux Dev", "Imagen 4"])).unwrap();
        let flat: Vec<_> = chart.bars.iter().map(|b| (b.label.as_str(), b.value)).collect();
        assert_eq!(flat[0].0, "Flux Pro");
        assert_eq!(flat[1], ("Flux Dev", Some(0.5)));
        assert_eq!(flat[2], ("Imagen 4", Some(0.0)));
    }

    #[test]
    fn test_avg_cost_colors_come_from_families() {
        let chart = avg_cost(&table(), &titles(&["Flux Pro", "Imagen 4", "Mystery"])).unwrap();
        let flat: Vec<_> = chart.bars.iter().map(|b| (b.label.as_str(), b.value)).collect();
        assert_eq!(
            flat,
            vec![("Flux Pro", Some(5.0)), ("Imagen 4", Some(3.0)), ("Mystery", Some(0.5))]
        );
        assert_eq!(chart.bars[1].color, "#E15759");
        assert_eq!(chart.bars[2].color, OTHER_COLOR);
    }

    #[test]
    fn test_weekly_avg_cost_series_follow_titles() {
        let chart = weekly_avg_cost(&table(), &titles(&["Flux Dev", "Flux Pro"])).unwrap();
        assert_eq!(chart.series[0].name, "Flux Dev");
        assert_eq!(chart.series[0].points.len(), 2);
        assert_eq!(chart.series[1].points.len(), 1);
        assert_eq!(chart.series[1].points[0].value, 5.0);
    }

    #[test]
    fn test_quality_vs_cost_summary() {
        let chart = quality_vs_cost(&table(), &titles(&["Flux Pro", "Flux Dev"])).unwrap();
        assert_eq!(chart.rows.len(), 2);
        let dev = &chart.rows[0];
        assert_eq!(dev.title, "Flux Dev");
        assert_eq!(dev.n, 2);
        assert_eq!(dev.avg_score, Some(0.4));
        assert_eq!(dev.avg_cost, Some(1.0));
        assert_eq!(dev.download_rate, Some(0.5));
        assert_eq!(dev.marker_size, 40.0);
    }

    #[test]
    fn test_breakdown_without_quality_skips_quality_charts() {
        let docs = vec![job(1, "Kling", 2.0, None, false)];
        let t = enrich_records(docs.into_iter().map(JobRecord::from_document).collect());
        let kinds: Vec<_> = breakdown(&t, 8, StackMode::Absolute)
            .iter()
            .map(|c| c.title().to_string())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "Generation Usage Over Time",
                "Cost Over Time",
                "Average default cost by model",
                "Weekly average cost",
                "Quality vs Cost",
            ]
        );
        assert_eq!(breakdown(&table(), 8, StackMode::Percent).len(), 8);
    }
}
