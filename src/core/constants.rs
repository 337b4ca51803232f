//! System constants and default configuration values for Forest Lab.
//!
//! The mock-training bounds below are presentation choices: they keep the
//! fabricated numbers looking plausible and carry no statistical meaning.

/// Default number of histogram bins for distribution and error charts.
pub const DEFAULT_NUM_BINS: usize = 20;

/// Default debounce window for coalescing hyperparameter edits.
pub const DEFAULT_DEBOUNCE_DELAY_MS: u64 = 500;

/// Default artificial latency of a mock training call.
pub const DEFAULT_TRAINING_DELAY_MS: u64 = 1500;

/// Probability that a tuned run fails with a simulated error.
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.1;

/// Number of rows in the fabricated prediction history.
pub const DEFAULT_HISTORY_ROWS: usize = 15;

/// Default fraction of rows held out as the test set.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default number of PDP grid points.
pub const DEFAULT_PDP_POINTS: usize = 20;

/// Maximum depth of the fabricated decision tree.
pub const MOCK_TREE_MAX_DEPTH: usize = 2;

/// Probability of terminating a mock tree branch early with a leaf.
pub const MOCK_EARLY_LEAF_PROBABILITY: f64 = 0.4;

/// Number of individual trees attached to each history row and forest
/// simulation.
pub const MOCK_TREES_SHOWN: usize = 10;

/// Probability that a mock classification prediction flips the actual label.
pub const MOCK_LABEL_FLIP_PROBABILITY: f64 = 0.1;

/// Multiplicative noise range applied to regression targets.
pub const MOCK_REGRESSION_NOISE: (f64, f64) = (0.9, 1.1);

/// Range of fabricated R² values.
pub const MOCK_R2_RANGE: (f64, f64) = (0.75, 0.95);

/// Range of fabricated RMSE values.
pub const MOCK_RMSE_RANGE: (f64, f64) = (2.0, 5.0);

/// Range of fabricated MAE values.
pub const MOCK_MAE_RANGE: (f64, f64) = (1.5, 3.5);

/// Range of fabricated accuracy, precision and recall values.
pub const MOCK_CLASSIFICATION_RANGE: (f64, f64) = (0.87, 0.99);

/// Default number of trees in the forest.
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Default minimum number of samples required to split a node.
pub const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;

/// Default minimum number of samples required at a leaf.
pub const DEFAULT_MIN_SAMPLES_LEAF: usize = 1;

/// Upper bound accepted for `n_estimators`.
pub const MAX_N_ESTIMATORS: usize = 1000;

/// Notifications kept between drains; older ones are discarded first.
pub const MAX_NOTIFICATIONS: usize = 50;

/// Fallback text when importance insights cannot be generated.
pub const INSIGHT_FALLBACK: &str =
    "Unable to generate insights right now. Review the feature importance chart directly.";

/// Fallback text when a prediction explanation cannot be generated.
pub const EXPLANATION_FALLBACK: &str =
    "Unable to generate an explanation for this prediction. Please try again later.";

/// Crate version
pub const FOREST_LAB_VERSION: &str = env!("CARGO_PKG_VERSION");
