use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use renderboard_core::constants::OTHER_LABEL;
use renderboard_core::palette::{Palette, OTHER_COLOR};
use renderboard_core::table::WeeklyPoint;
use serde::{Deserialize, Serialize};

/// Absolute values, or each week normalized to 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    #[default]
    Absolute,
    Percent,
}

impl StackMode {
    pub fn y_title<'a>(&self, absolute: &'a str) -> &'a str {
        match self {
            StackMode::Absolute => absolute,
            StackMode::Percent => "Percent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub week_start: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub points: Vec<Point>,
}

impl Series {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

/// Stacked weekly area chart. Every series has one point per entry of `weeks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaChart {
    pub title: String,
    pub y_title: String,
    pub mode: StackMode,
    pub weeks: Vec<NaiveDate>,
    pub series: Vec<Series>,
}

/// Weekly line chart; series only carry the weeks they have data for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub y_title: String,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub color: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub value_title: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
}

/// Side-by-side bars: one value per category for each series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarChart {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub color: String,
    pub n: usize,
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxChart {
    pub title: String,
    pub boxes: Vec<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub name: String,
    pub color: String,
    /// (x, density) pairs, x ascending.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityChart {
    pub title: String,
    pub curves: Vec<Curve>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityCostRow {
    pub title: String,
    pub color: String,
    pub n: usize,
    pub avg_score: Option<f64>,
    pub avg_cost: Option<f64>,
    pub download_rate: Option<f64>,
    /// Scatter marker area, grows with the square root of `n`.
    pub marker_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityCostChart {
    pub title: String,
    pub rows: Vec<QualityCostRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Area(AreaChart),
    Line(LineChart),
    Bar(BarChart),
    GroupedBar(GroupedBarChart),
    Box(BoxChart),
    Density(DensityChart),
    QualityCost(QualityCostChart),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Area(c) => &c.title,
            Chart::Line(c) => &c.title,
            Chart::Bar(c) => &c.title,
            Chart::GroupedBar(c) => &c.title,
            Chart::Box(c) => &c.title,
            Chart::Density(c) => &c.title,
            Chart::QualityCost(c) => &c.title,
        }
    }
}

macro_rules! impl_from_chart {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Chart {
            fn from(c: $ty) -> Self {
                Chart::$variant(c)
            }
        })*
    };
}

impl_from_chart!(
    AreaChart => Area,
    LineChart => Line,
    BarChart => Bar,
    GroupedBarChart => GroupedBar,
    BoxChart => Box,
    DensityChart => Density,
    QualityCostChart => QualityCost,
);

pub(crate) fn color_of(palette: &Palette, label: &str) -> String {
    palette
        .get(label)
        .cloned()
        .unwrap_or_else(|| OTHER_COLOR.to_string())
}

/// Totals per group over all weeks. Missing values count as 0.
pub(crate) fn group_totals(points: &[WeeklyPoint]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();
    for p in points {
        *totals.entry(p.group.clone()).or_insert(0.0) += p.value.unwrap_or(0.0);
    }
    totals
}

/// Keeps the `top_n` groups with the largest totals and folds the rest into
/// [`OTHER_LABEL`], summing per week. Ties are broken by group name.
pub(crate) fn fold_top_n(points: Vec<WeeklyPoint>, top_n: usize) -> Vec<WeeklyPoint> {
    let mut ranked: Vec<(String, f64)> = group_totals(&points).into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let keep: BTreeSet<String> = ranked.into_iter().take(top_n).map(|(g, _)| g).collect();

    let mut folded: BTreeMap<(NaiveDate, String), f64> = BTreeMap::new();
    for p in points {
        let label = if keep.contains(&p.group) {
            p.group
        } else {
            OTHER_LABEL.to_string()
        };
        *folded.entry((p.week_start, label)).or_insert(0.0) += p.value.unwrap_or(0.0);
    }
    folded
        .into_iter()
        .map(|((week_start, group), value)| WeeklyPoint {
            week_start,
            group,
            value: Some(value),
        })
        .collect()
}

/// Pivots weekly points into dense series, one per group, largest total first
/// and [`OTHER_LABEL`] last. Missing cells are 0. In percent mode each week is
/// scaled to sum to 100; an all-zero week stays at 0.
pub(crate) fn stack(
    points: &[WeeklyPoint],
    mode: StackMode,
    color: impl Fn(&str) -> String,
) -> (Vec<NaiveDate>, Vec<Series>) {
    let weeks: Vec<NaiveDate> = points
        .iter()
        .map(|p| p.week_start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells: HashMap<(&str, NaiveDate), f64> = HashMap::new();
    let mut week_sums: HashMap<NaiveDate, f64> = HashMap::new();
    for p in points {
        let v = p.value.unwrap_or(0.0);
        *cells.entry((p.group.as_str(), p.week_start)).or_insert(0.0) += v;
        *week_sums.entry(p.week_start).or_insert(0.0) += v;
    }

    let totals = group_totals(points);
    let mut groups: Vec<(&String, f64)> = totals.iter().map(|(g, t)| (g, *t)).collect();
    groups.sort_by(|a, b| {
        (a.0 == OTHER_LABEL)
            .cmp(&(b.0 == OTHER_LABEL))
            .then_with(|| b.1.total_cmp(&a.1))
            .then_with(|| a.0.cmp(b.0))
    });

    let series = groups
        .into_iter()
        .map(|(group, _)| Series {
            name: group.clone(),
            color: color(group),
            points: weeks
                .iter()
                .map(|w| {
                    let v = cells.get(&(group.as_str(), *w)).copied().unwrap_or(0.0);
                    let value = match mode {
                        StackMode::Absolute => v,
                        StackMode::Percent => match week_sums.get(w) {
                            Some(sum) if *sum != 0.0 => v / sum * 100.0,
                            _ => 0.0,
                        },
                    };
                    Point {
                        week_start: *w,
                        value,
                    }
                })
                .collect(),
        })
        .collect();
    (weeks, series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(day: u32, group: &str, value: f64) -> WeeklyPoint {
        WeeklyPoint {
            week_start: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            group: group.to_string(),
            value: Some(value),
        }
    }

    #[test]
    fn test_fold_top_n_sums_tail_per_week() {
        let points = vec![
            wp(1, "a", 5.0),
            wp(1, "b", 1.0),
            wp(1, "c", 2.0),
            wp(8, "a", 1.0),
            wp(8, "c", 4.0),
        ];
        let folded = fold_top_n(points, 1);
        let flat: Vec<_> = folded
            .iter()
            .map(|p| (p.week_start.to_string(), p.group.as_str(), p.value))
            .collect();
        // a and c tie on 6; the name breaks the tie.
        assert_eq!(
            flat,
            vec![
                ("2024-01-01".to_string(), "Other", Some(3.0)),
                ("2024-01-01".to_string(), "a", Some(5.0)),
                ("2024-01-08".to_string(), "Other", Some(4.0)),
                ("2024-01-08".to_string(), "a", Some(1.0)),
            ]
        );
    }

    #[test]
    fn test_stack_fills_missing_weeks_and_puts_other_last() {
        let points = vec![wp(1, "Other", 9.0), wp(1, "a", 1.0), wp(8, "b", 2.0)];
        let (weeks, series) = stack(&points, StackMode::Absolute, |g| g.to_string());
        assert_eq!(weeks.len(), 2);
        let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "Other"]);
        assert!(series.iter().all(|s| s.points.len() == 2));
        assert_eq!(series[0].points[0].value, 0.0);
        assert_eq!(series[0].points[1].value, 2.0);
    }

    #[test]
    fn test_stack_percent_normalizes_each_week() {
        let points = vec![wp(1, "a", 1.0), wp(1, "b", 3.0), wp(8, "a", 0.0)];
        let (_, series) = stack(&points, StackMode::Percent, |_| String::new());
        let b = series.iter().find(|s| s.name == "b").unwrap();
        let a = series.iter().find(|s| s.name == "a").unwrap();
        assert_eq!(b.points[0].value, 75.0);
        assert_eq!(a.points[0].value, 25.0);
        assert_eq!(a.points[1].value, 0.0);
    }
}
