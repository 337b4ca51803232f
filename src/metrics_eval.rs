//! Model evaluation metrics.
//!
//! [`ModelMetrics`] is a tagged union: a model instance carries either
//! regression or classification metrics, never both. The evaluation
//! functions compute the same shapes from a prediction history for the
//! error-analysis panel.

use serde::{Deserialize, Serialize};

use crate::core::types::TaskType;

/// Regression evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination
    pub r2: f64,
    /// Root mean square error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
}

/// 2x2 confusion matrix for binary classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Actual 1, predicted 1
    pub true_positive: usize,
    /// Actual 0, predicted 1
    pub false_positive: usize,
    /// Actual 0, predicted 0
    pub true_negative: usize,
    /// Actual 1, predicted 0
    pub false_negative: usize,
}

impl ConfusionMatrix {
    /// Total number of scored instances
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Rows are actual class (0, 1), columns predicted class (0, 1)
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }

    /// Accuracy; 0 for an empty matrix
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positive + self.true_negative) as f64 / total as f64
    }

    /// Precision; 0 without positive predictions
    pub fn precision(&self) -> f64 {
        let predicted = self.true_positive + self.false_positive;
        if predicted == 0 {
            return 0.0;
        }
        self.true_positive as f64 / predicted as f64
    }

    /// Recall; 0 without positive instances
    pub fn recall(&self) -> f64 {
        let actual = self.true_positive + self.false_negative;
        if actual == 0 {
            return 0.0;
        }
        self.true_positive as f64 / actual as f64
    }
}

/// Binary classification evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Accuracy
    pub accuracy: f64,
    /// Precision
    pub precision: f64,
    /// Recall
    pub recall: f64,
    /// Confusion matrix
    pub confusion_matrix: ConfusionMatrix,
}

impl ClassificationMetrics {
    /// F1 score derived from precision and recall
    pub fn f1_score(&self) -> f64 {
        if self.precision + self.recall > 0.0 {
            2.0 * self.precision * self.recall / (self.precision + self.recall)
        } else {
            0.0
        }
    }
}

/// Metrics of one trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelMetrics {
    /// Regression model metrics
    Regression(RegressionMetrics),
    /// Classification model metrics
    Classification(ClassificationMetrics),
}

impl ModelMetrics {
    /// Task the metrics belong to
    pub fn task(&self) -> TaskType {
        match self {
            ModelMetrics::Regression(_) => TaskType::Regression,
            ModelMetrics::Classification(_) => TaskType::Classification,
        }
    }

    /// Named scalar values, in display order
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        match self {
            ModelMetrics::Regression(m) => vec![("r2", m.r2), ("rmse", m.rmse), ("mae", m.mae)],
            ModelMetrics::Classification(m) => vec![
                ("accuracy", m.accuracy),
                ("precision", m.precision),
                ("recall", m.recall),
            ],
        }
    }

    /// Headline score: R² for regression, accuracy for classification
    pub fn primary_score(&self) -> f64 {
        match self {
            ModelMetrics::Regression(m) => m.r2,
            ModelMetrics::Classification(m) => m.accuracy,
        }
    }
}

/// Evaluate regression metrics. Mismatched or empty inputs give zeros.
pub fn evaluate_regression(predictions: &[f64], true_values: &[f64]) -> RegressionMetrics {
    if predictions.is_empty() || predictions.len() != true_values.len() {
        return RegressionMetrics {
            r2: 0.0,
            rmse: 0.0,
            mae: 0.0,
        };
    }

    let n = predictions.len() as f64;
    let mut sum_squared_error = 0.0;
    let mut sum_absolute_error = 0.0;
    for (&pred, &true_val) in predictions.iter().zip(true_values) {
        let error = pred - true_val;
        sum_squared_error += error * error;
        sum_absolute_error += error.abs();
    }

    let true_mean = true_values.iter().sum::<f64>() / n;
    let total_sum_squares: f64 = true_values.iter().map(|v| (v - true_mean).powi(2)).sum();

    let r2 = if total_sum_squares > 0.0 {
        1.0 - sum_squared_error / total_sum_squares
    } else {
        0.0
    };

    RegressionMetrics {
        r2,
        rmse: (sum_squared_error / n).sqrt(),
        mae: sum_absolute_error / n,
    }
}

/// Evaluate binary classification metrics, thresholding both sides at 0.5.
pub fn evaluate_binary_classification(
    class_predictions: &[f64],
    true_labels: &[f64],
) -> ClassificationMetrics {
    let mut cm = ConfusionMatrix::default();
    for (&pred, &label) in class_predictions.iter().zip(true_labels) {
        match (pred > 0.5, label > 0.5) {
            (true, true) => cm.true_positive += 1,
            (true, false) => cm.false_positive += 1,
            (false, false) => cm.true_negative += 1,
            (false, true) => cm.false_negative += 1,
        }
    }

    ClassificationMetrics {
        accuracy: cm.accuracy(),
        precision: cm.precision(),
        recall: cm.recall(),
        confusion_matrix: cm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_evaluate_regression() {
        let metrics = evaluate_regression(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]);
        assert_abs_diff_eq!(metrics.mae, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.rmse, (1.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert!(metrics.r2 < 1.0 && metrics.r2 > 0.0);

        let empty = evaluate_regression(&[], &[]);
        assert_eq!(empty.rmse, 0.0);
    }

    #[test]
    fn test_evaluate_binary_classification() {
        let metrics = evaluate_binary_classification(&[1.0, 0.0, 1.0, 1.0], &[1.0, 0.0, 0.0, 1.0]);
        let cm = metrics.confusion_matrix;
        assert_eq!(cm.true_positive, 2);
        assert_eq!(cm.false_positive, 1);
        assert_eq!(cm.true_negative, 1);
        assert_eq!(cm.false_negative, 0);
        assert_abs_diff_eq!(metrics.accuracy, 0.75);
        assert_abs_diff_eq!(metrics.precision, 2.0 / 3.0);
        assert_abs_diff_eq!(metrics.recall, 1.0);
        assert_eq!(cm.as_rows(), [[1, 1], [0, 2]]);
    }

    #[test]
    fn test_model_metrics_tagging() {
        let metrics = ModelMetrics::Regression(RegressionMetrics {
            r2: 0.9,
            rmse: 3.0,
            mae: 2.0,
        });
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["type"], "regression");
        assert_eq!(metrics.task(), TaskType::Regression);
        assert_eq!(metrics.named_values()[0], ("r2", 0.9));

        let back: ModelMetrics = serde_json::from_value(json).unwrap();
        assert_eq!(back, metrics);
    }

    #[test]
    fn test_empty_confusion_matrix() {
        let cm = ConfusionMatrix::default();
        assert_eq!(cm.accuracy(), 0.0);
        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.recall(), 0.0);
    }
}
