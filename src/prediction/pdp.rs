//! Partial dependence curves.
//!
//! The curve is a linear approximation built from the marginal statistics
//! of the feature and the target: `mean_y + r * (sd_y / sd_x) * (x - mean_x)`
//! evaluated on an even grid over the feature's observed range.

use crate::dataset::Dataset;
use crate::stats::correlation::pearson;
use crate::stats::summary::{mean, sample_std_dev};

use serde::{Deserialize, Serialize};

pub use crate::core::constants::DEFAULT_PDP_POINTS;

/// One point of a partial dependence curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdpPoint {
    /// Feature value
    pub value: f64,
    /// Expected outcome at that value
    pub outcome: f64,
}

/// Partial dependence of `target` on `feature`.
///
/// Returns an empty curve when either column is missing or non-numeric, or
/// when `num_points` is 0. A zero-variance feature gives a flat curve at the
/// target mean.
pub fn partial_dependence(
    dataset: &Dataset,
    feature: &str,
    target: &str,
    num_points: usize,
) -> Vec<PdpPoint> {
    let (xs, ys) = match (dataset.numeric_column(feature), dataset.numeric_column(target)) {
        (Ok(xs), Ok(ys)) if !xs.is_empty() => (xs, ys),
        _ => return Vec::new(),
    };
    if num_points == 0 {
        return Vec::new();
    }

    let mean_x = mean(&xs);
    let mean_y = mean(&ys);
    let sd_x = sample_std_dev(&xs);
    let slope = if sd_x > 0.0 {
        pearson(&xs, &ys) * sample_std_dev(&ys) / sd_x
    } else {
        0.0
    };

    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = if num_points > 1 {
        (max - min) / (num_points - 1) as f64
    } else {
        0.0
    };

    (0..num_points)
        .map(|i| {
            let value = min + i as f64 * step;
            PdpPoint {
                value,
                outcome: mean_y + slope * (value - mean_x),
            }
        })
        .collect()
}
