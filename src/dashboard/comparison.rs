//! Baseline versus tuned comparison.

use crate::metrics_eval::ModelMetrics;

use serde::{Deserialize, Serialize};

/// Change of one metric between the baseline and tuned models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    /// Metric name
    pub name: String,
    /// Baseline value
    pub baseline: f64,
    /// Tuned value
    pub tuned: f64,
    /// `tuned - baseline`
    pub delta: f64,
    /// Whether the tuned model is better on this metric
    pub improved: bool,
}

/// Error metrics, where lower is better
fn lower_is_better(name: &str) -> bool {
    matches!(name, "rmse" | "mae")
}

/// Per-metric deltas, or `None` when the two models are of different tasks.
pub fn compare_metrics(baseline: &ModelMetrics, tuned: &ModelMetrics) -> Option<Vec<MetricDelta>> {
    if baseline.task() != tuned.task() {
        return None;
    }

    let deltas = baseline
        .named_values()
        .into_iter()
        .zip(tuned.named_values())
        .map(|((name, b), (_, t))| {
            let delta = t - b;
            MetricDelta {
                name: name.to_string(),
                baseline: b,
                tuned: t,
                delta,
                improved: if lower_is_better(name) {
                    delta < 0.0
                } else {
                    delta > 0.0
                },
            }
        })
        .collect();
    Some(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics_eval::{ClassificationMetrics, ConfusionMatrix, RegressionMetrics};
    use approx::assert_abs_diff_eq;

    fn regression(r2: f64, rmse: f64, mae: f64) -> ModelMetrics {
        ModelMetrics::Regression(RegressionMetrics { r2, rmse, mae })
    }

    #[test]
    fn test_regression_deltas() {
        let deltas = compare_metrics(&regression(0.80, 4.0, 3.0), &regression(0.85, 3.5, 3.2)).unwrap();
        assert_eq!(deltas.len(), 3);

        assert_eq!(deltas[0].name, "r2");
        assert_abs_diff_eq!(deltas[0].delta, 0.05, epsilon = 1e-12);
        assert!(deltas[0].improved);

        assert_eq!(deltas[1].name, "rmse");
        assert!(deltas[1].improved);

        assert_eq!(deltas[2].name, "mae");
        assert!(!deltas[2].improved);
    }

    #[test]
    fn test_mismatched_tasks() {
        let classification = ModelMetrics::Classification(ClassificationMetrics {
            accuracy: 0.9,
            precision: 0.9,
            recall: 0.9,
            confusion_matrix: ConfusionMatrix::default(),
        });
        assert!(compare_metrics(&regression(0.8, 3.0, 2.0), &classification).is_none());
    }
}
