//! Random-forest hyperparameters and their builder.
//!
//! A [`Hyperparameters`] value is handed to a training call by value and is
//! never mutated afterwards; the dashboard replaces it wholesale when the
//! task changes.

use crate::core::constants::*;
use crate::core::error::{ForestLabError, Result};
use crate::core::types::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed-shape random-forest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum tree depth (`None` for unlimited)
    pub max_depth: Option<usize>,
    /// Minimum number of samples required to split an internal node
    pub min_samples_split: usize,
    /// Minimum number of samples required at a leaf
    pub min_samples_leaf: usize,
    /// Feature sampling mode at each split
    pub max_features: MaxFeatures,
    /// Whether trees are fit on bootstrap samples
    pub bootstrap: bool,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Class weighting mode
    pub class_weight: ClassWeight,
}

impl Hyperparameters {
    /// Baseline hyperparameters for a task. Baseline runs always use these.
    pub fn baseline(task: TaskType) -> Self {
        match task {
            TaskType::Regression => Hyperparameters {
                n_estimators: DEFAULT_N_ESTIMATORS,
                max_depth: None,
                min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
                min_samples_leaf: DEFAULT_MIN_SAMPLES_LEAF,
                max_features: MaxFeatures::All,
                bootstrap: true,
                criterion: Criterion::SquaredError,
                class_weight: ClassWeight::None,
            },
            TaskType::Classification => Hyperparameters {
                n_estimators: DEFAULT_N_ESTIMATORS,
                max_depth: None,
                min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
                min_samples_leaf: DEFAULT_MIN_SAMPLES_LEAF,
                max_features: MaxFeatures::Sqrt,
                bootstrap: true,
                criterion: Criterion::Gini,
                class_weight: ClassWeight::None,
            },
        }
    }

    /// Validate parameter ranges. Task compatibility is checked separately by
    /// [`Hyperparameters::validate_for_task`].
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 || self.n_estimators > MAX_N_ESTIMATORS {
            return Err(ForestLabError::invalid_parameter(
                "n_estimators",
                self.n_estimators.to_string(),
                format!("must be in range [1, {}]", MAX_N_ESTIMATORS),
            ));
        }

        if let Some(depth) = self.max_depth {
            if depth == 0 {
                return Err(ForestLabError::invalid_parameter(
                    "max_depth",
                    depth.to_string(),
                    "must be at least 1 or unlimited",
                ));
            }
        }

        if self.min_samples_split < 2 {
            return Err(ForestLabError::invalid_parameter(
                "min_samples_split",
                self.min_samples_split.to_string(),
                "must be at least 2",
            ));
        }

        if self.min_samples_leaf == 0 {
            return Err(ForestLabError::invalid_parameter(
                "min_samples_leaf",
                self.min_samples_leaf.to_string(),
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Validate ranges and check that the criterion matches the task.
    pub fn validate_for_task(&self, task: TaskType) -> Result<()> {
        self.validate()?;
        if !self.criterion.supports(task) {
            return Err(ForestLabError::invalid_parameter(
                "criterion",
                self.criterion.to_string(),
                format!("not applicable to {} tasks", task),
            ));
        }
        Ok(())
    }

    /// Parameter map for display next to the metrics.
    pub fn as_parameter_map(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("n_estimators".to_string(), self.n_estimators.to_string());
        params.insert(
            "max_depth".to_string(),
            self.max_depth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string()),
        );
        params.insert(
            "min_samples_split".to_string(),
            self.min_samples_split.to_string(),
        );
        params.insert(
            "min_samples_leaf".to_string(),
            self.min_samples_leaf.to_string(),
        );
        params.insert("max_features".to_string(), self.max_features.to_string());
        params.insert("bootstrap".to_string(), self.bootstrap.to_string());
        params.insert("criterion".to_string(), self.criterion.to_string());
        params.insert(
            "class_weight".to_string(),
            match self.class_weight {
                ClassWeight::None => "none".to_string(),
                ClassWeight::Balanced => "balanced".to_string(),
            },
        );
        params
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self::baseline(TaskType::default())
    }
}

/// Builder pattern for hyperparameters
#[derive(Debug)]
pub struct HyperparametersBuilder {
    params: Hyperparameters,
    validation_errors: Vec<String>,
}

impl HyperparametersBuilder {
    /// Start from the baseline hyperparameters of a task
    pub fn new(task: TaskType) -> Self {
        HyperparametersBuilder {
            params: Hyperparameters::baseline(task),
            validation_errors: Vec::new(),
        }
    }

    /// Start from an existing set of hyperparameters
    pub fn from_params(params: Hyperparameters) -> Self {
        HyperparametersBuilder {
            params,
            validation_errors: Vec::new(),
        }
    }

    /// Set the number of trees
    pub fn n_estimators(mut self, n: usize) -> Self {
        if n == 0 {
            self.validation_errors
                .push("n_estimators must be at least 1".to_string());
        }
        self.params.n_estimators = n;
        self
    }

    /// Set the maximum depth
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        if depth == Some(0) {
            self.validation_errors
                .push("max_depth must be at least 1".to_string());
        }
        self.params.max_depth = depth;
        self
    }

    /// Set the minimum samples per split
    pub fn min_samples_split(mut self, n: usize) -> Self {
        if n < 2 {
            self.validation_errors
                .push("min_samples_split must be at least 2".to_string());
        }
        self.params.min_samples_split = n;
        self
    }

    /// Set the minimum samples per leaf
    pub fn min_samples_leaf(mut self, n: usize) -> Self {
        if n == 0 {
            self.validation_errors
                .push("min_samples_leaf must be at least 1".to_string());
        }
        self.params.min_samples_leaf = n;
        self
    }

    /// Set the feature sampling mode
    pub fn max_features(mut self, mode: MaxFeatures) -> Self {
        self.params.max_features = mode;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.params.bootstrap = bootstrap;
        self
    }

    /// Set the impurity criterion
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.params.criterion = criterion;
        self
    }

    /// Set the class weighting mode
    pub fn class_weight(mut self, weight: ClassWeight) -> Self {
        self.params.class_weight = weight;
        self
    }

    /// Build the hyperparameters
    pub fn build(self) -> Result<Hyperparameters> {
        if !self.validation_errors.is_empty() {
            return Err(ForestLabError::config(format!(
                "Hyperparameter validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.params.validate()?;
        Ok(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_per_task() {
        let reg = Hyperparameters::baseline(TaskType::Regression);
        assert_eq!(reg.criterion, Criterion::SquaredError);
        assert_eq!(reg.max_features, MaxFeatures::All);

        let clf = Hyperparameters::baseline(TaskType::Classification);
        assert_eq!(clf.criterion, Criterion::Gini);
        assert_eq!(clf.max_features, MaxFeatures::Sqrt);
        assert_eq!(clf.n_estimators, DEFAULT_N_ESTIMATORS);
    }

    #[test]
    fn test_validation() {
        let mut params = Hyperparameters::default();
        assert!(params.validate().is_ok());

        params.n_estimators = 0;
        assert!(params.validate().is_err());

        params.n_estimators = 50;
        params.min_samples_split = 1;
        assert!(params.validate().is_err());

        params.min_samples_split = 4;
        params.max_depth = Some(0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_for_task() {
        let params = Hyperparameters::baseline(TaskType::Regression);
        assert!(params.validate_for_task(TaskType::Regression).is_ok());
        assert!(params.validate_for_task(TaskType::Classification).is_err());
    }

    #[test]
    fn test_builder() {
        let params = HyperparametersBuilder::new(TaskType::Classification)
            .n_estimators(250)
            .max_depth(Some(8))
            .criterion(Criterion::Entropy)
            .class_weight(ClassWeight::Balanced)
            .bootstrap(false)
            .build()
            .unwrap();

        assert_eq!(params.n_estimators, 250);
        assert_eq!(params.max_depth, Some(8));
        assert_eq!(params.criterion, Criterion::Entropy);
        assert!(!params.bootstrap);
    }

    #[test]
    fn test_builder_accumulates_errors() {
        let result = HyperparametersBuilder::new(TaskType::Regression)
            .n_estimators(0)
            .min_samples_leaf(0)
            .build();

        let message = result.unwrap_err().to_string();
        assert!(message.contains("n_estimators"));
        assert!(message.contains("min_samples_leaf"));
    }

    #[test]
    fn test_parameter_map() {
        let params = Hyperparameters::baseline(TaskType::Regression);
        let map = params.as_parameter_map();
        assert_eq!(map.get("max_depth").map(String::as_str), Some("none"));
        assert_eq!(map.get("criterion").map(String::as_str), Some("squared_error"));
        assert_eq!(map.len(), 8);
    }
}
