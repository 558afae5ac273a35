//! Plain-text rendering of chart data for the terminal.

use renderboard_charts::{
    AreaChart, BarChart, BoxChart, Chart, DensityChart, GroupedBarChart, LineChart,
    QualityCostChart,
};

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".into())
}

pub fn print_charts(charts: &[Chart]) {
    for chart in charts {
        println!("\n== {} ==", chart.title());
        match chart {
            Chart::Area(c) => print_area(c),
            Chart::Line(c) => print_line(c),
            Chart::Bar(c) => print_bars(c),
            Chart::GroupedBar(c) => print_grouped(c),
            Chart::Box(c) => print_boxes(c),
            Chart::Density(c) => print_density(c),
            Chart::QualityCost(c) => print_quality_cost(c),
        }
    }
}

fn print_area(c: &AreaChart) {
    if c.series.is_empty() {
        println!("(no data)");
        return;
    }
    let mut header = format!("{:<12}", "week");
    for s in &c.series {
        header.push_str(&format!(" {:>14}", s.name));
    }
    println!("{header}");
    for (i, week) in c.weeks.iter().enumerate() {
        let mut line = format!("{:<12}", week.to_string());
        for s in &c.series {
            line.push_str(&format!(" {:>14.2}", s.points[i].value));
        }
        println!("{line}");
    }
    let legend: Vec<String> = c.series.iter().map(|s| format!("{} {}", s.name, s.color)).collect();
    println!("[{}] {}", c.y_title, legend.join(", "));
}

fn print_line(c: &LineChart) {
    for s in &c.series {
        println!("{} ({})", s.name, s.color);
        for p in &s.points {
            println!("  {}  {:.2}", p.week_start, p.value);
        }
    }
}

fn print_bars(c: &BarChart) {
    println!("{:<32} {:>12}  color", "model", c.value_title);
    for b in &c.bars {
        println!("{:<32} {:>12}  {}", b.label, opt(b.value, 3), b.color);
    }
}

fn print_grouped(c: &GroupedBarChart) {
    let mut header = format!("{:<10}", "");
    for s in &c.series {
        header.push_str(&format!(" {:>12}", s.name));
    }
    println!("{header}");
    for (i, cat) in c.categories.iter().enumerate() {
        let mut line = format!("{:<10}", cat);
        for s in &c.series {
            line.push_str(&format!(" {:>12.2}", s.values[i]));
        }
        println!("{line}");
    }
}

fn print_boxes(c: &BoxChart) {
    println!(
        "{:<32} {:>5} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "model", "n", "low", "q1", "median", "q3", "high"
    );
    for b in &c.boxes {
        println!(
            "{:<32} {:>5} {:>7.3} {:>7.3} {:>7.3} {:>7.3} {:>7.3}",
            b.label, b.n, b.whisker_low, b.q1, b.median, b.q3, b.whisker_high
        );
    }
}

fn print_density(c: &DensityChart) {
    for curve in &c.curves {
        let peak = curve
            .points
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1));
        match peak {
            Some((x, d)) => println!("{:<32} peak at {:.3} (density {:.3})", curve.name, x, d),
            None => println!("{:<32} -", curve.name),
        }
    }
}

fn print_quality_cost(c: &QualityCostChart) {
    println!(
        "{:<32} {:>5} {:>9} {:>9} {:>9}",
        "model", "n", "score", "cost", "download"
    );
    for r in &c.rows {
        println!(
            "{:<32} {:>5} {:>9} {:>9} {:>9}",
            r.title,
            r.n,
            opt(r.avg_score, 3),
            opt(r.avg_cost, 2),
            opt(r.download_rate, 3)
        );
    }
}
