//! Chart-ready aggregations over an [`EnrichedTable`](renderboard_core::EnrichedTable).
//!
//! Every builder returns plain data (series, bars, box statistics) with colors
//! already assigned; drawing is left to the caller.

mod chart;
mod stats;

pub mod overview;
pub mod task_breakdown;

pub use chart::{
    AreaChart, Bar, BarChart, BarSeries, BoxChart, BoxStats, Chart, Curve, DensityChart,
    GroupedBarChart, LineChart, Point, QualityCostChart, QualityCostRow, Series, StackMode,
};
