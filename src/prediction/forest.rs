//! Per-tree view of a single prediction.
//!
//! The explorer shows how individual trees of the forest voted on one
//! instance. Each simulated tree is a perturbed copy of the displayed tree
//! structure; their outputs go through the same aggregation the forest
//! uses.

use crate::core::constants::{MOCK_LABEL_FLIP_PROBABILITY, MOCK_REGRESSION_NOISE};
use crate::core::error::Result;
use crate::core::types::TaskType;
use crate::ensemble::{aggregate, AggregatedPrediction};
use crate::prediction::Prediction;
use crate::tree::DecisionTree;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum number of key features reported per tree
const KEY_FEATURES_PER_TREE: usize = 3;

/// Output of one tree for one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeResult {
    /// Tree index within the forest
    pub id: usize,
    /// Tree output: a value for regression, 0/1 for classification
    pub prediction: f64,
    /// Bootstrap samples the tree was grown on
    pub samples: usize,
    /// Features the tree split on, root first
    pub key_features: Vec<String>,
    /// Tree structure
    pub tree: DecisionTree,
}

/// Simulated forest for one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSimulation {
    /// Task of the forest
    pub task: TaskType,
    /// Id of the simulated instance
    pub instance_id: usize,
    /// Per-tree results in tree order
    pub trees: Vec<TreeResult>,
    /// Forest-level prediction
    pub aggregate: AggregatedPrediction,
}

impl ForestSimulation {
    /// Number of simulated trees
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Tree outputs in tree order
    pub fn predictions(&self) -> Vec<f64> {
        self.trees.iter().map(|t| t.prediction).collect()
    }
}

/// Simulate `num_trees` trees of the forest on `instance`.
///
/// Recorded per-tree predictions on the instance are used in order; missing
/// ones are drawn around the forest prediction. Fails when `num_trees` is 0
/// since there is nothing to aggregate.
pub fn simulate_forest<R: Rng + ?Sized>(
    instance: &Prediction,
    template: &DecisionTree,
    task: TaskType,
    num_trees: usize,
    rng: &mut R,
) -> Result<ForestSimulation> {
    let recorded = instance.tree_predictions.as_deref().unwrap_or(&[]);

    let trees: Vec<TreeResult> = (0..num_trees)
        .map(|id| {
            let prediction = match recorded.get(id) {
                Some(&p) => p,
                None => draw_tree_prediction(instance.predicted, task, rng),
            };
            let tree = jitter_thresholds(template, rng);
            let samples = ((template.samples() as f64) * rng.gen_range(0.6..=1.0))
                .round()
                .max(1.0) as usize;
            let key_features = tree
                .split_features()
                .into_iter()
                .take(KEY_FEATURES_PER_TREE)
                .map(str::to_string)
                .collect();

            TreeResult {
                id,
                prediction,
                samples,
                key_features,
                tree,
            }
        })
        .collect();

    let aggregate = aggregate(&trees, task)?;
    log::debug!(
        "Simulated {} trees for instance {}",
        trees.len(),
        instance.id
    );

    Ok(ForestSimulation {
        task,
        instance_id: instance.id,
        trees,
        aggregate,
    })
}

/// One tree's output around the forest prediction
pub(crate) fn draw_tree_prediction<R: Rng + ?Sized>(
    forest_prediction: f64,
    task: TaskType,
    rng: &mut R,
) -> f64 {
    match task {
        TaskType::Regression => {
            forest_prediction * rng.gen_range(MOCK_REGRESSION_NOISE.0..=MOCK_REGRESSION_NOISE.1)
        }
        TaskType::Classification => {
            let class = if forest_prediction >= 0.5 { 1.0 } else { 0.0 };
            if rng.gen_bool(MOCK_LABEL_FLIP_PROBABILITY) {
                1.0 - class
            } else {
                class
            }
        }
    }
}

fn jitter_thresholds<R: Rng + ?Sized>(tree: &DecisionTree, rng: &mut R) -> DecisionTree {
    match tree {
        DecisionTree::Leaf { value, samples } => DecisionTree::leaf(value.clone(), *samples),
        DecisionTree::Node {
            feature,
            threshold,
            impurity,
            samples,
            left,
            right,
        } => DecisionTree::node(
            feature.clone(),
            threshold * rng.gen_range(MOCK_REGRESSION_NOISE.0..=MOCK_REGRESSION_NOISE.1),
            *impurity,
            *samples,
            jitter_thresholds(left, rng),
            jitter_thresholds(right, rng),
        ),
    }
}
