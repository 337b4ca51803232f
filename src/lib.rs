//! # Forest Lab
//!
//! The engine behind an interactive random-forest exploration dashboard.
//! A user picks a task (regression or classification), configures forest
//! hyperparameters, "trains" a model against a bundled dataset and inspects
//! metrics, feature importances, tree structure and per-prediction
//! explanations. Training is simulated: outputs are plausible random values
//! produced after an artificial delay.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forest_lab::{DashboardConfig, DashboardController, MockTrainer, RunKind};
//!
//! # async fn example() -> forest_lab::Result<()> {
//! forest_lab::init()?;
//!
//! let config = DashboardConfig::default();
//! let controller = DashboardController::new(MockTrainer::from_config(&config), config)?;
//!
//! controller.train_baseline().await?;
//! controller.update_hyperparameters(|p| p.n_estimators = 300)?;
//! controller.flush_pending().await;
//!
//! let snapshot = controller.snapshot();
//! println!("{}", snapshot.tuned.status);
//! # let _ = RunKind::Tuned;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: task types, constants, error handling and initialization
//! - [`config`]: hyperparameters and dashboard runtime settings
//! - [`dataset`]: tabular datasets, CSV loading and the bundled datasets
//! - [`stats`]: summaries, correlation matrices and histograms
//! - [`ensemble`]: aggregation of per-tree predictions
//! - [`metrics_eval`]: model metrics
//! - [`tree`]: decision tree structure
//! - [`prediction`]: prediction records, forest simulation and PDP curves
//! - [`training`]: the trainer seam and the mock trainer
//! - [`insight`]: natural-language insights with fallbacks
//! - [`dashboard`]: the state controller with debounced retraining

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset management module
pub mod dataset;

// Statistics over datasets
pub mod stats;

// Aggregation of tree predictions
pub mod ensemble;

// Metrics evaluation module
pub mod metrics_eval;

// Decision tree structure
pub mod tree;

// Prediction module
pub mod prediction;

// Trainer seam and mock trainer
pub mod training;

// Insight generation
pub mod insight;

// Dashboard state controller
pub mod dashboard;

// Re-export core functionality for convenience
pub use crate::core::{
    constants::*,
    error::{DatasetError, ForestLabError, Result},
    types::*,
};

// Re-export configuration functionality
pub use config::{
    ConfigManager, ConfigValidator, DashboardConfig, DashboardConfigBuilder, Hyperparameters,
    HyperparametersBuilder, ValidationResult,
};

// Re-export dataset functionality
pub use dataset::{
    load_csv_dataset, BundledDataset, BundledDatasetProvider, CsvLoader, Dataset, DatasetBuilder,
    DatasetProvider, Row, Value,
};

// Re-export statistics
pub use stats::{
    correlation_matrix, histogram, summarize, CorrelationMatrix, DatasetSummary, HistogramBin,
    StatsCache,
};

// Re-export ensemble functionality
pub use ensemble::{aggregate, AggregatedPrediction, EnsembleMethod};

// Re-export metrics evaluation functionality
pub use metrics_eval::{
    evaluate_binary_classification, evaluate_regression, ClassificationMetrics, ConfusionMatrix,
    ModelMetrics, RegressionMetrics,
};

pub use tree::DecisionTree;

// Re-export prediction functionality
pub use prediction::{
    history_metrics, partial_dependence, prediction_errors, simulate_forest, FeatureImportance,
    ForestSimulation, PdpPoint, Prediction, TreeResult,
};

pub use training::{MockTrainer, ModelTrainer, TrainingOutput, TrainingRequest};

pub use insight::{ExplanationRequest, InsightGenerator, InsightService, TemplateInsightGenerator};

pub use dashboard::{
    DashboardController, DashboardSnapshot, Notification, NotificationLevel, TrainingStatus,
};

// Version information
pub use crate::core::constants::FOREST_LAB_VERSION as VERSION;

/// Initialize the library.
///
/// Sets up logging through `env_logger` (level from `RUST_LOG`, `info` when
/// unset). Calling it more than once is harmless.
///
/// # Examples
///
/// ```rust
/// fn main() -> forest_lab::Result<()> {
///     forest_lab::init()?;
///     assert!(forest_lab::is_initialized());
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    crate::core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    crate::core::is_core_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
        assert!(is_initialized());
        assert!(!VERSION.is_empty());
    }
}
