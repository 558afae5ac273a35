//! Small numeric helpers: quantiles, box whiskers, kernel density.

const KDE_GRID: usize = 100;
const KDE_CUT: f64 = 3.0;

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Linear-interpolated quantile of an ascending slice.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FiveNumber {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
}

/// Quartiles plus whiskers reaching the furthest points within 1.5 IQR.
pub(crate) fn five_number(values: &[f64]) -> Option<FiveNumber> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let whisker_low = sorted.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
    let whisker_high = sorted.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);
    Some(FiveNumber {
        whisker_low,
        q1,
        median,
        q3,
        whisker_high,
    })
}

/// Sample standard deviation (n - 1).
fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated on an
/// even grid from `min - 3h` to `max + 3h`. Needs at least two distinct values.
pub(crate) fn gaussian_kde(values: &[f64]) -> Option<Vec<(f64, f64)>> {
    let n = values.len() as f64;
    let sd = std_dev(values)?;
    if sd == 0.0 || !sd.is_finite() {
        return None;
    }
    let h = sd * n.powf(-1.0 / 5.0);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (start, end) = (min - KDE_CUT * h, max + KDE_CUT * h);
    let step = (end - start) / (KDE_GRID - 1) as f64;
    let norm = 1.0 / (n * h * (2.0 * std::f64::consts::PI).sqrt());

    Some(
        (0..KDE_GRID)
            .map(|i| {
                let x = start + step * i as f64;
                let density = values
                    .iter()
                    .map(|v| (-0.5 * ((x - v) / h).powi(2)).exp())
                    .sum::<f64>()
                    * norm;
                (x, density)
            })
            .collect(),
    )
}
