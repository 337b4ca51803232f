//! Model training seam.
//!
//! The dashboard talks to a [`ModelTrainer`]; the bundled implementation is
//! [`MockTrainer`], which fabricates plausible outputs after an artificial
//! delay instead of fitting a forest.

pub mod mock;

pub use mock::MockTrainer;

use crate::config::{validate_test_size, Hyperparameters};
use crate::core::error::Result;
use crate::core::types::{RunKind, TaskType};
use crate::dataset::Dataset;
use crate::metrics_eval::ModelMetrics;
use crate::prediction::{FeatureImportance, Prediction};
use crate::tree::DecisionTree;
use crate::{config_error, ensure};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything a training call needs. Built from a snapshot of the dashboard
/// state, so later edits never reach an in-flight call.
#[derive(Debug, Clone)]
pub struct TrainingRequest {
    /// Task type
    pub task: TaskType,
    /// Slot the result is meant for
    pub run_kind: RunKind,
    /// Forest configuration
    pub hyperparameters: Hyperparameters,
    /// Feature columns to train on
    pub selected_features: Vec<String>,
    /// Target column
    pub target: String,
    /// Held-out fraction
    pub test_size: f64,
    /// Training data
    pub dataset: Arc<Dataset>,
}

impl TrainingRequest {
    /// Check the request against its dataset.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.selected_features.is_empty(),
            config_error!("At least one feature must be selected")
        );
        ensure!(
            self.dataset.has_column(&self.target),
            config_error!("Unknown target column '{}'", self.target)
        );
        ensure!(
            self.dataset.is_numeric_column(&self.target),
            config_error!("Target column '{}' is not numeric", self.target)
        );
        for feature in &self.selected_features {
            ensure!(
                self.dataset.has_column(feature),
                config_error!("Unknown feature column '{}'", feature)
            );
            ensure!(
                feature != &self.target,
                config_error!("Target '{}' cannot also be a feature", feature)
            );
        }
        validate_test_size(self.test_size)?;
        self.hyperparameters.validate_for_task(self.task)
    }

    /// Number of held-out rows, at least 1
    pub fn test_rows(&self) -> usize {
        ((self.dataset.num_rows() as f64 * self.test_size).round() as usize).max(1)
    }

    /// Number of training rows, at least 1
    pub fn train_rows(&self) -> usize {
        self.dataset.num_rows().saturating_sub(self.test_rows()).max(1)
    }
}

/// Result of a successful training call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutput {
    /// Slot the result belongs to
    pub run_kind: RunKind,
    /// Hyperparameters the model was trained with
    pub hyperparameters: Hyperparameters,
    /// Evaluation metrics
    pub metrics: ModelMetrics,
    /// Feature importances, descending
    pub importances: Vec<FeatureImportance>,
    /// A representative tree of the forest
    pub tree: DecisionTree,
    /// Scored instances from the head of the dataset
    pub history: Vec<Prediction>,
    /// Completion time
    pub trained_at: DateTime<Utc>,
}

/// Trains a forest for the dashboard.
#[async_trait]
pub trait ModelTrainer: Send + Sync {
    /// Train a model. The future may be long-running; callers must not hold
    /// locks across it.
    async fn train(&self, request: TrainingRequest) -> Result<TrainingOutput>;

    /// Name used in log messages
    fn name(&self) -> &str {
        "trainer"
    }
}

#[async_trait]
impl<T: ModelTrainer + ?Sized> ModelTrainer for Arc<T> {
    async fn train(&self, request: TrainingRequest) -> Result<TrainingOutput> {
        (**self).train(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
