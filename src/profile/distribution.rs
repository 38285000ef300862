//! Descriptive statistics of a group of frequencies.

use serde::{Deserialize, Serialize};

/// Multiplier on the interquartile range that bounds box-plot whiskers.
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Box-plot ready summary of one group's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Number of values.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (second quartile).
    pub median: f64,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Lowest value within 1.5 IQR below Q1.
    pub whisker_low: f64,
    /// Highest value within 1.5 IQR above Q3.
    pub whisker_high: f64,
}

impl DistributionSummary {
    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Number of values outside the whiskers.
    pub fn n_outliers(&self, values: &[f64]) -> usize {
        values
            .iter()
            .filter(|&&v| v < self.whisker_low || v > self.whisker_high)
            .count()
    }
}

impl std::fmt::Display for DistributionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={} median={:.4} IQR=[{:.4}, {:.4}]",
            self.n, self.median, self.q1, self.q3
        )
    }
}

/// Quantile of sorted values by linear interpolation between order statistics.
///
/// `sorted` must be non-empty and ascending; `q` is in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Summarize a group of values.
///
/// An empty group yields `n = 0` with every statistic set to NaN.
pub fn profile_distribution(values: &[f64]) -> DistributionSummary {
    let n = values.len();
    if n == 0 {
        return DistributionSummary {
            n: 0,
            mean: f64::NAN,
            median: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            whisker_low: f64::NAN,
            whisker_high: f64::NAN,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;

    let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
    let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;
    let whisker_low = sorted
        .iter()
        .copied()
        .find(|&v| v >= low_fence)
        .unwrap_or(sorted[0]);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= high_fence)
        .unwrap_or(sorted[n - 1]);

    DistributionSummary {
        n,
        mean: sorted.iter().sum::<f64>() / n as f64,
        median,
        q1,
        q3,
        min: sorted[0],
        max: sorted[n - 1],
        whisker_low,
        whisker_high,
    }
}
