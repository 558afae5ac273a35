use super::BucketSummary;
use crate::table::EnrichedTable;

pub fn print_summary(table: &EnrichedTable, summaries: &[BucketSummary]) {
    eprintln!("\nLoaded {} jobs", table.len());
    if let Some((first, last)) = table.date_bounds() {
        eprintln!("Created between {} and {}", first, last);
    }
    if summaries.is_empty() {
        eprintln!("No data for the selected filters.");
        return;
    }

    eprintln!("\n{:<8} {:>8} {:>12} {:>10} {:>9}", "bucket", "jobs", "cost", "download", "quality");
    for s in summaries {
        let quality = s
            .avg_quality
            .map(|q| format!("{:.2}", q))
            .unwrap_or_else(|| "-".into());
        eprintln!(
            "{:<8} {:>8} {:>12.2} {:>9.1}% {:>9}",
            s.bucket.as_str(),
            s.jobs,
            s.total_cost,
            s.download_rate * 100.0,
            quality
        );
    }

    let jobs: usize = summaries.iter().map(|s| s.jobs).sum();
    let cost: f64 = summaries.iter().map(|s| s.total_cost).sum();
    eprintln!("\nTotal: {} jobs, cost {:.2}", jobs, cost);
}
