//! Prediction records and the views derived from them.
//!
//! - [`Prediction`]: one scored instance of the prediction history
//! - [`FeatureImportance`]: importance score of one feature
//! - [`forest`]: per-tree simulation of a single instance
//! - [`pdp`]: partial dependence curves

pub mod forest;
pub mod pdp;

pub use forest::{simulate_forest, ForestSimulation, TreeResult};
pub use pdp::{partial_dependence, PdpPoint};

use crate::core::types::TaskType;
use crate::dataset::Row;
use crate::metrics_eval::{evaluate_binary_classification, evaluate_regression, ModelMetrics};
use crate::stats::histogram::{histogram, HistogramBin};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scored instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Position in the history
    pub id: usize,
    /// When the prediction was produced
    pub timestamp: DateTime<Utc>,
    /// Input feature values
    pub features: Row,
    /// Observed target
    pub actual: f64,
    /// Model output
    pub predicted: f64,
    /// Outputs of individual trees, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_predictions: Option<Vec<f64>>,
}

impl Prediction {
    /// Signed error, predicted minus actual
    pub fn error(&self) -> f64 {
        self.predicted - self.actual
    }

    /// Whether a class prediction disagrees with the label
    pub fn is_misclassified(&self) -> bool {
        (self.predicted >= 0.5) != (self.actual >= 0.5)
    }

    /// Numeric feature value by name
    pub fn feature_value(&self, name: &str) -> Option<f64> {
        self.features.get(name).and_then(|v| v.as_f64())
    }
}

/// Importance score of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name
    pub feature: String,
    /// Importance score
    pub importance: f64,
}

impl FeatureImportance {
    /// Create an importance entry
    pub fn new(feature: impl Into<String>, importance: f64) -> Self {
        FeatureImportance {
            feature: feature.into(),
            importance,
        }
    }
}

/// Sort importances in descending order of score
pub fn sort_importances(importances: &mut [FeatureImportance]) {
    importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));
}

/// The `k` most important features, assuming descending order
pub fn top_features(importances: &[FeatureImportance], k: usize) -> Vec<&str> {
    importances
        .iter()
        .take(k)
        .map(|fi| fi.feature.as_str())
        .collect()
}

/// Signed errors (predicted minus actual) of a prediction history
pub fn prediction_errors(history: &[Prediction]) -> Vec<f64> {
    history.iter().map(Prediction::error).collect()
}

/// Histogram of the signed prediction errors
pub fn error_histogram(history: &[Prediction], num_bins: usize) -> Vec<HistogramBin> {
    histogram(&prediction_errors(history), num_bins)
}

/// Metrics of a prediction history against its observed targets
pub fn history_metrics(history: &[Prediction], task: TaskType) -> ModelMetrics {
    let predicted: Vec<f64> = history.iter().map(|p| p.predicted).collect();
    let actual: Vec<f64> = history.iter().map(|p| p.actual).collect();
    match task {
        TaskType::Regression => ModelMetrics::Regression(evaluate_regression(&predicted, &actual)),
        TaskType::Classification => {
            ModelMetrics::Classification(evaluate_binary_classification(&predicted, &actual))
        }
    }
}
