//! Core data types shared across the dashboard engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::ForestLabError;

/// Kind of learning task the dashboard is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Continuous target
    Regression,
    /// Binary {0, 1} target
    Classification,
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Regression
    }
}

impl TaskType {
    /// Whether the target column is treated as categorical.
    pub fn has_categorical_target(&self) -> bool {
        matches!(self, TaskType::Classification)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Regression => write!(f, "regression"),
            TaskType::Classification => write!(f, "classification"),
        }
    }
}

impl FromStr for TaskType {
    type Err = ForestLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regression" => Ok(TaskType::Regression),
            "classification" => Ok(TaskType::Classification),
            _ => Err(ForestLabError::invalid_parameter(
                "task",
                s,
                "expected 'regression' or 'classification'",
            )),
        }
    }
}

/// Which of the two result slots a training call feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// Fixed default hyperparameters, used as the comparison reference
    Baseline,
    /// User-adjusted hyperparameters
    Tuned,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Baseline => write!(f, "baseline"),
            RunKind::Tuned => write!(f, "tuned"),
        }
    }
}

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// sqrt(n_features)
    Sqrt,
    /// log2(n_features)
    Log2,
    /// Every feature
    All,
}

impl MaxFeatures {
    /// Resolve the sampling mode against a concrete feature count.
    /// Always returns at least 1 for a non-empty feature set.
    pub fn resolve(&self, num_features: usize) -> usize {
        if num_features == 0 {
            return 0;
        }
        let n = num_features as f64;
        let k = match self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::All => num_features,
        };
        k.clamp(1, num_features)
    }
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxFeatures::Sqrt => write!(f, "sqrt"),
            MaxFeatures::Log2 => write!(f, "log2"),
            MaxFeatures::All => write!(f, "all"),
        }
    }
}

/// Impurity criterion used to score splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Mean squared error (regression)
    SquaredError,
    /// Mean absolute error (regression)
    AbsoluteError,
    /// Gini impurity (classification)
    Gini,
    /// Information gain (classification)
    Entropy,
}

impl Criterion {
    /// Whether this criterion applies to the given task.
    pub fn supports(&self, task: TaskType) -> bool {
        match self {
            Criterion::SquaredError | Criterion::AbsoluteError => task == TaskType::Regression,
            Criterion::Gini | Criterion::Entropy => task == TaskType::Classification,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::SquaredError => write!(f, "squared_error"),
            Criterion::AbsoluteError => write!(f, "absolute_error"),
            Criterion::Gini => write!(f, "gini"),
            Criterion::Entropy => write!(f, "entropy"),
        }
    }
}

/// Class weighting mode for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// All classes weigh the same
    None,
    /// Weights inversely proportional to class frequency
    Balanced,
}

impl Default for ClassWeight {
    fn default() -> Self {
        ClassWeight::None
    }
}
