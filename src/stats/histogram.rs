//! Equal-width histogram binning.
//!
//! The same binner drives the feature-distribution charts (raw column values)
//! and the prediction-error chart (signed errors).

use serde::{Deserialize, Serialize};

pub use crate::core::constants::DEFAULT_NUM_BINS;

/// One histogram bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Display label, `"{lower:.2}-{upper:.2}"`
    pub label: String,
    /// Inclusive lower edge
    pub lower: f64,
    /// Upper edge (inclusive for the last bin only)
    pub upper: f64,
    /// Number of values in the bucket
    pub count: usize,
}

/// Bucket `values` into `num_bins` equal-width bins over `[min, max]`.
///
/// Empty input (or zero bins) yields no bins. The maximum value, whose raw
/// index equals `num_bins`, is clamped into the last bin. When every value is
/// equal the bin width is taken as 1 so all values land in the first bin.
pub fn histogram(values: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || num_bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min {
        (max - min) / num_bins as f64
    } else {
        1.0
    };

    let mut counts = vec![0usize; num_bins];
    for v in &finite {
        let index = (((v - min) / width).floor() as usize).min(num_bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = min + i as f64 * width;
            let upper = lower + width;
            HistogramBin {
                label: format!("{:.2}-{:.2}", lower, upper),
                lower,
                upper,
                count,
            }
        })
        .collect()
}

/// [`histogram`] with [`DEFAULT_NUM_BINS`] bins
pub fn default_histogram(values: &[f64]) -> Vec<HistogramBin> {
    histogram(values, DEFAULT_NUM_BINS)
}
