//! The enriched table: masking and group/week aggregation over enriched rows.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{EnrichedRow, TaskBucket, TaskType};

/// Categorical column used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    TaskType,
    TaskBucket,
    Title,
}

impl Dimension {
    /// `None` keys are dropped from every aggregation.
    pub fn key(&self, row: &EnrichedRow) -> Option<String> {
        match self {
            Dimension::TaskType => Some(row.model_type.as_str().to_string()),
            Dimension::TaskBucket => Some(row.model_type_agg.as_str().to_string()),
            Dimension::Title => row.model_title_extracted.clone(),
        }
    }
}

/// Numeric column. Flags read as 1.0 / 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    DefaultCost,
    QualityScore,
    WasDownloaded,
    HasRewrite,
}

impl Measure {
    pub fn value(&self, row: &EnrichedRow) -> Option<f64> {
        match self {
            Measure::DefaultCost => row.default_cost,
            Measure::QualityScore => row.quality_score,
            Measure::WasDownloaded => Some(if row.was_downloaded { 1.0 } else { 0.0 }),
            Measure::HasRewrite => Some(if row.has_rewrite { 1.0 } else { 0.0 }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    /// Sum of present values; an all-missing group sums to 0.
    Sum(Measure),
    /// Mean of present values; an all-missing group has no mean.
    Mean(Measure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPoint {
    pub week_start: NaiveDate,
    pub group: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue {
    pub group: String,
    pub value: Option<f64>,
}

/// Boolean mask over the table. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub task_types: Option<Vec<TaskType>>,
    pub buckets: Option<Vec<TaskBucket>>,
    pub titles: Option<Vec<String>>,
}

impl RowFilter {
    /// Rows without a creation date never match a date bound.
    pub fn matches(&self, row: &EnrichedRow) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = row.date() else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        if let Some(types) = &self.task_types {
            if !types.contains(&row.model_type) {
                return false;
            }
        }
        if let Some(buckets) = &self.buckets {
            if !buckets.contains(&row.model_type_agg) {
                return false;
            }
        }
        if let Some(titles) = &self.titles {
            match row.title() {
                Some(t) if titles.iter().any(|x| x == t) => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Default)]
struct Acc {
    rows: usize,
    present: usize,
    sum: f64,
}

impl Acc {
    fn push(&mut self, v: Option<f64>) {
        self.rows += 1;
        if let Some(v) = v {
            self.present += 1;
            self.sum += v;
        }
    }

    fn finish(&self, agg: Aggregate) -> Option<f64> {
        match agg {
            Aggregate::Count => Some(self.rows as f64),
            Aggregate::Sum(_) => Some(self.sum),
            Aggregate::Mean(_) => (self.present > 0).then(|| self.sum / self.present as f64),
        }
    }
}

fn measured(agg: Aggregate, row: &EnrichedRow) -> Option<f64> {
    match agg {
        Aggregate::Count => None,
        Aggregate::Sum(m) | Aggregate::Mean(m) => m.value(row),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichedTable {
    rows: Vec<EnrichedRow>,
}

impl EnrichedTable {
    pub fn new(rows: Vec<EnrichedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnrichedRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn filter(&self, f: &RowFilter) -> EnrichedTable {
        EnrichedTable::new(self.rows.iter().filter(|r| f.matches(r)).cloned().collect())
    }

    /// Earliest and latest creation date.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.rows.iter().filter_map(EnrichedRow::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    pub fn task_types(&self) -> Vec<TaskType> {
        let mut v: Vec<TaskType> = self.rows.iter().map(|r| r.model_type).collect();
        v.sort();
        v.dedup();
        v
    }

    pub fn buckets(&self) -> Vec<TaskBucket> {
        let mut v: Vec<TaskBucket> = self.rows.iter().map(|r| r.model_type_agg).collect();
        v.sort();
        v.dedup();
        v
    }

    /// Whether any row carries a quality score.
    pub fn has_quality(&self) -> bool {
        self.rows.iter().any(|r| r.quality_score.is_some())
    }

    /// Week × group aggregation, sorted by week then group. Rows without a week
    /// or a group key are left out.
    pub fn weekly(&self, dim: Dimension, agg: Aggregate) -> Vec<WeeklyPoint> {
        let mut acc: BTreeMap<(NaiveDate, String), Acc> = BTreeMap::new();
        for row in &self.rows {
            let (Some(week), Some(key)) = (row.week_start, dim.key(row)) else {
                continue;
            };
            acc.entry((week, key)).or_default().push(measured(agg, row));
        }
        acc.into_iter()
            .map(|((week_start, group), a)| WeeklyPoint {
                week_start,
                group,
                value: a.finish(agg),
            })
            .collect()
    }

    /// Per-group aggregation, sorted by group key.
    pub fn grouped(&self, dim: Dimension, agg: Aggregate) -> Vec<GroupValue> {
        let mut acc: BTreeMap<String, Acc> = BTreeMap::new();
        for row in &self.rows {
            let Some(key) = dim.key(row) else {
                continue;
            };
            acc.entry(key).or_default().push(measured(agg, row));
        }
        acc.into_iter()
            .map(|(group, a)| GroupValue {
                group,
                value: a.finish(agg),
            })
            .collect()
    }

    pub fn grouped_map(&self, dim: Dimension, agg: Aggregate) -> HashMap<String, f64> {
        self.grouped(dim, agg)
            .into_iter()
            .filter_map(|g| g.value.map(|v| (g.group, v)))
            .collect()
    }

    /// Row counts per group, largest first; ties by key.
    pub fn value_counts(&self, dim: Dimension) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .grouped(dim, Aggregate::Count)
            .into_iter()
            .map(|g| (g.group, g.value.unwrap_or(0.0) as usize))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// The `n` most frequent titles.
    pub fn top_titles(&self, n: usize) -> Vec<String> {
        self.value_counts(Dimension::Title)
            .into_iter()
            .take(n)
            .map(|(t, _)| t)
            .collect()
    }
}
