//! Combination of per-tree predictions into a forest prediction.
//!
//! Regression forests average their trees; classification forests take a
//! hard majority vote over the binary classes {0, 1}. When the vote is tied,
//! class 1 wins.

use crate::core::error::{ForestLabError, Result};
use crate::core::types::TaskType;
use crate::prediction::forest::TreeResult;
use crate::stats::summary::{mean, population_std_dev};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ensemble method for combining tree predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnsembleMethod {
    /// Simple averaging of predictions
    Average,
    /// Majority voting for classification
    MajorityVoting,
}

impl EnsembleMethod {
    /// Method a random forest uses for the given task
    pub fn for_task(task: TaskType) -> Self {
        match task {
            TaskType::Regression => EnsembleMethod::Average,
            TaskType::Classification => EnsembleMethod::MajorityVoting,
        }
    }
}

/// Forest-level prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AggregatedPrediction {
    /// Averaged regression output
    Regression {
        /// Mean of the tree predictions
        mean: f64,
        /// Population standard deviation of the tree predictions
        std_dev: f64,
        /// Trees combined
        num_trees: usize,
    },
    /// Majority vote
    Classification {
        /// Winning class
        class: u8,
        /// Votes per class; both classes are always present
        votes: BTreeMap<u8, usize>,
        /// Trees combined
        num_trees: usize,
    },
}

impl AggregatedPrediction {
    /// Headline value: the mean or the winning class
    pub fn value(&self) -> f64 {
        match self {
            AggregatedPrediction::Regression { mean, .. } => *mean,
            AggregatedPrediction::Classification { class, .. } => f64::from(*class),
        }
    }

    /// Number of trees that contributed
    pub fn num_trees(&self) -> usize {
        match self {
            AggregatedPrediction::Regression { num_trees, .. }
            | AggregatedPrediction::Classification { num_trees, .. } => *num_trees,
        }
    }

    /// Share of trees agreeing with the winning class. Regression
    /// predictions report 1.
    pub fn agreement(&self) -> f64 {
        match self {
            AggregatedPrediction::Regression { .. } => 1.0,
            AggregatedPrediction::Classification {
                class,
                votes,
                num_trees,
            } => {
                if *num_trees == 0 {
                    return 0.0;
                }
                votes.get(class).copied().unwrap_or(0) as f64 / *num_trees as f64
            }
        }
    }
}

/// Aggregate the per-tree results of a forest simulation.
pub fn aggregate(results: &[TreeResult], task: TaskType) -> Result<AggregatedPrediction> {
    let predictions: Vec<f64> = results.iter().map(|r| r.prediction).collect();
    aggregate_values(&predictions, task)
}

/// Aggregate raw tree predictions.
///
/// Classification predictions are read as class 1 when `>= 0.5`.
pub fn aggregate_values(predictions: &[f64], task: TaskType) -> Result<AggregatedPrediction> {
    if predictions.is_empty() {
        return Err(ForestLabError::aggregation(
            "Cannot aggregate an empty set of tree predictions",
        ));
    }

    let aggregated = match EnsembleMethod::for_task(task) {
        EnsembleMethod::Average => AggregatedPrediction::Regression {
            mean: mean(predictions),
            std_dev: population_std_dev(predictions),
            num_trees: predictions.len(),
        },
        EnsembleMethod::MajorityVoting => majority_vote(predictions),
    };

    log::debug!(
        "Aggregated {} tree predictions into {:.3}",
        predictions.len(),
        aggregated.value()
    );
    Ok(aggregated)
}

fn majority_vote(predictions: &[f64]) -> AggregatedPrediction {
    let ones = predictions.iter().filter(|&&p| p >= 0.5).count();
    let zeros = predictions.len() - ones;

    let mut votes = BTreeMap::new();
    votes.insert(0u8, zeros);
    votes.insert(1u8, ones);

    AggregatedPrediction::Classification {
        class: if ones >= zeros { 1 } else { 0 },
        votes,
        num_trees: predictions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_regression_average() {
        let result = aggregate_values(&[1.0, 2.0, 3.0], TaskType::Regression).unwrap();
        match result {
            AggregatedPrediction::Regression {
                mean,
                std_dev,
                num_trees,
            } => {
                assert_abs_diff_eq!(mean, 2.0);
                assert_abs_diff_eq!(std_dev, (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
                assert_eq!(num_trees, 3);
            }
            other => panic!("expected regression, got {:?}", other),
        }
    }

    #[test]
    fn test_majority_vote() {
        let result = aggregate_values(&[0.0, 0.0, 1.0], TaskType::Classification).unwrap();
        match &result {
            AggregatedPrediction::Classification { class, votes, .. } => {
                assert_eq!(*class, 0);
                assert_eq!(votes[&0], 2);
                assert_eq!(votes[&1], 1);
            }
            other => panic!("expected classification, got {:?}", other),
        }
        assert_abs_diff_eq!(result.agreement(), 2.0 / 3.0);
    }

    #[test]
    fn test_tie_goes_to_positive_class() {
        let result = aggregate_values(&[0.0, 1.0, 1.0, 0.0], TaskType::Classification).unwrap();
        assert_eq!(result.value(), 1.0);
    }

    #[test]
    fn test_unanimous_vote_keeps_both_classes() {
        let result = aggregate_values(&[1.0, 1.0], TaskType::Classification).unwrap();
        match result {
            AggregatedPrediction::Classification { votes, .. } => {
                assert_eq!(votes.len(), 2);
                assert_eq!(votes[&0], 0);
            }
            other => panic!("expected classification, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_an_error() {
        for task in [TaskType::Regression, TaskType::Classification] {
            let err = aggregate(&[], task).unwrap_err();
            assert!(matches!(err, ForestLabError::Aggregation { .. }));
        }
    }

    #[test]
    fn test_serde_tag() {
        let result = aggregate_values(&[4.0], TaskType::Regression).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "regression");
        assert_eq!(json["std_dev"], 0.0);
    }
}
