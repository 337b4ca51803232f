//! Hyperparameter advice shown next to the sidebar controls.
//!
//! Unlike [`Hyperparameters::validate`](crate::config::Hyperparameters::validate),
//! which rejects unusable values, the validator here also reports warnings
//! for settings that are legal but unusual for the selected task.

use crate::config::core::Hyperparameters;
use crate::core::types::*;

use serde::{Deserialize, Serialize};

/// Validation result enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationResult {
    /// Parameter has a warning (non-fatal)
    Warning(ValidationWarning),
    /// Parameter has an error (fatal)
    Error(ValidationError),
}

impl ValidationResult {
    /// Whether this result blocks training
    pub fn is_error(&self) -> bool {
        matches!(self, ValidationResult::Error(_))
    }

    /// Name of the offending parameter
    pub fn parameter(&self) -> &str {
        match self {
            ValidationResult::Warning(w) => &w.parameter,
            ValidationResult::Error(e) => &e.parameter,
        }
    }
}

/// Validation warning structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Parameter name
    pub parameter: String,
    /// Parameter value
    pub value: String,
    /// Warning message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

/// Validation error structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Parameter name
    pub parameter: String,
    /// Parameter value
    pub value: String,
    /// Error message
    pub message: String,
    /// Valid range or options
    pub valid_range: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parameter '{}' = '{}': {}",
            self.parameter, self.value, self.message
        )?;
        if let Some(ref range) = self.valid_range {
            write!(f, " (valid range: {})", range)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Hyperparameter validator for one task
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    task: TaskType,
    num_features: Option<usize>,
}

impl ConfigValidator {
    /// Create a validator for a task
    pub fn new(task: TaskType) -> Self {
        ConfigValidator {
            task,
            num_features: None,
        }
    }

    /// Attach the number of selected features
    pub fn with_num_features(mut self, num_features: usize) -> Self {
        self.num_features = Some(num_features);
        self
    }

    /// Validate hyperparameters, returning every finding
    pub fn validate(&self, params: &Hyperparameters) -> Vec<ValidationResult> {
        let mut results = Vec::new();
        results.extend(self.validate_forest_size(params));
        results.extend(self.validate_tree_shape(params));
        results.extend(self.validate_task_consistency(params));
        results.extend(self.validate_feature_sampling(params));
        results
    }

    fn validate_forest_size(&self, params: &Hyperparameters) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        if params.n_estimators == 0 {
            results.push(ValidationResult::Error(ValidationError {
                parameter: "n_estimators".to_string(),
                value: params.n_estimators.to_string(),
                message: "Must be positive".to_string(),
                valid_range: Some("1 to 1000".to_string()),
            }));
        } else if params.n_estimators < 10 {
            results.push(ValidationResult::Warning(ValidationWarning {
                parameter: "n_estimators".to_string(),
                value: params.n_estimators.to_string(),
                message: "Very small forests produce unstable predictions".to_string(),
                suggestion: Some("Use at least 50 trees".to_string()),
            }));
        } else if params.n_estimators > 500 {
            results.push(ValidationResult::Warning(ValidationWarning {
                parameter: "n_estimators".to_string(),
                value: params.n_estimators.to_string(),
                message: "Large forests rarely improve accuracy and train slowly".to_string(),
                suggestion: None,
            }));
        }

        results
    }

    fn validate_tree_shape(&self, params: &Hyperparameters) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        match params.max_depth {
            Some(0) => results.push(ValidationResult::Error(ValidationError {
                parameter: "max_depth".to_string(),
                value: "0".to_string(),
                message: "Must be positive or unlimited".to_string(),
                valid_range: Some("none or 1 to 50".to_string()),
            })),
            Some(depth) if depth > 30 => {
                results.push(ValidationResult::Warning(ValidationWarning {
                    parameter: "max_depth".to_string(),
                    value: depth.to_string(),
                    message: "Very deep trees may overfit".to_string(),
                    suggestion: Some("Consider increasing min_samples_leaf instead".to_string()),
                }))
            }
            _ => {}
        }

        if params.min_samples_split < 2 {
            results.push(ValidationResult::Error(ValidationError {
                parameter: "min_samples_split".to_string(),
                value: params.min_samples_split.to_string(),
                message: "Must be at least 2".to_string(),
                valid_range: Some("2 to 100".to_string()),
            }));
        }

        if params.min_samples_leaf == 0 {
            results.push(ValidationResult::Error(ValidationError {
                parameter: "min_samples_leaf".to_string(),
                value: params.min_samples_leaf.to_string(),
                message: "Must be at least 1".to_string(),
                valid_range: Some("1 to 100".to_string()),
            }));
        } else if params.min_samples_leaf * 2 > params.min_samples_split.max(2) * 10 {
            results.push(ValidationResult::Warning(ValidationWarning {
                parameter: "min_samples_leaf".to_string(),
                value: params.min_samples_leaf.to_string(),
                message: "Large leaves relative to min_samples_split limit tree growth"
                    .to_string(),
                suggestion: None,
            }));
        }

        results
    }

    fn validate_task_consistency(&self, params: &Hyperparameters) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        if !params.criterion.supports(self.task) {
            results.push(ValidationResult::Error(ValidationError {
                parameter: "criterion".to_string(),
                value: params.criterion.to_string(),
                message: format!("Not applicable to {} tasks", self.task),
                valid_range: Some(match self.task {
                    TaskType::Regression => "squared_error, absolute_error".to_string(),
                    TaskType::Classification => "gini, entropy".to_string(),
                }),
            }));
        }

        if self.task == TaskType::Regression && params.class_weight == ClassWeight::Balanced {
            results.push(ValidationResult::Warning(ValidationWarning {
                parameter: "class_weight".to_string(),
                value: "balanced".to_string(),
                message: "Class weighting has no effect on regression".to_string(),
                suggestion: Some("Set class_weight to none".to_string()),
            }));
        }

        results
    }

    fn validate_feature_sampling(&self, params: &Hyperparameters) -> Vec<ValidationResult> {
        let mut results = Vec::new();

        if let Some(n) = self.num_features {
            if n == 0 {
                results.push(ValidationResult::Error(ValidationError {
                    parameter: "features".to_string(),
                    value: "0".to_string(),
                    message: "At least one feature must be selected".to_string(),
                    valid_range: None,
                }));
            } else if params.max_features == MaxFeatures::All && !params.bootstrap {
                results.push(ValidationResult::Warning(ValidationWarning {
                    parameter: "bootstrap".to_string(),
                    value: "false".to_string(),
                    message: "Without bootstrap or feature sampling every tree is identical"
                        .to_string(),
                    suggestion: Some("Enable bootstrap or use sqrt feature sampling".to_string()),
                }));
            }
        }

        results
    }
}
