//! Statistic descriptors applied across the repetitions of a benchmark.

/// Reducer from a column of per-repetition values to a single aggregate.
pub type StatisticsFunc = fn(&[f64]) -> f64;

/// A named aggregate computed over repetition runs, e.g. `mean`.
#[derive(Debug, Clone)]
pub struct Statistic {
    pub name: String,
    pub compute: StatisticsFunc,
}

impl Statistic {
    pub fn new(name: impl Into<String>, compute: StatisticsFunc) -> Self {
        Self {
            name: name.into(),
            compute,
        }
    }
}

/// Arithmetic mean; 0 for an empty column.
pub fn stat_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Midpoint median: the mean of the two central elements for even lengths.
pub fn stat_median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation; 0 for fewer than two values.
pub fn stat_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = stat_mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// The aggregates every benchmark reports unless it overrides them.
pub fn default_statistics() -> Vec<Statistic> {
    vec![
        Statistic::new("mean", stat_mean),
        Statistic::new("median", stat_median),
        Statistic::new("stddev", stat_stddev),
    ]
}
