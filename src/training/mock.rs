//! Mock random-forest trainer.
//!
//! Nothing is learned. After the configured delay the trainer fabricates
//! metrics within fixed plausible ranges, random importances, a shallow
//! random tree whose thresholds lie in each feature's observed range, and a
//! noisy prediction history over the head of the dataset. Tuned runs fail
//! at random to exercise the dashboard's error path.

use crate::config::DashboardConfig;
use crate::core::constants::*;
use crate::core::error::{ForestLabError, Result};
use crate::core::types::{RunKind, TaskType};
use crate::dataset::{Dataset, Row, Value};
use crate::metrics_eval::{ClassificationMetrics, ConfusionMatrix, ModelMetrics, RegressionMetrics};
use crate::prediction::forest::draw_tree_prediction;
use crate::prediction::{sort_importances, FeatureImportance, Prediction};
use crate::stats::summary::{mean, population_std_dev};
use crate::training::{ModelTrainer, TrainingOutput, TrainingRequest};
use crate::tree::DecisionTree;
use crate::training_error;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Trainer that fabricates outputs
#[derive(Debug)]
pub struct MockTrainer {
    delay: Duration,
    failure_probability: f64,
    history_rows: usize,
    rng: Mutex<StdRng>,
}

impl MockTrainer {
    /// Trainer with default delay and failure rate, seeded from entropy
    pub fn new() -> Self {
        Self::from_config(&DashboardConfig::default())
    }

    /// Trainer using the delay, failure rate, history size and seed of
    /// `config`
    pub fn from_config(config: &DashboardConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        MockTrainer {
            delay: config.training_delay(),
            failure_probability: failure_probability(config.failure_probability),
            history_rows: config.history_rows,
            rng: Mutex::new(rng),
        }
    }

    /// Reseed the random source
    pub fn with_seed(self, seed: u64) -> Self {
        MockTrainer {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Set the artificial latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the failure probability of tuned runs
    pub fn with_failure_probability(mut self, probability: f64) -> Self {
        self.failure_probability = failure_probability(probability);
        self
    }

    /// Artificial latency
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Produce a training output without waiting.
    ///
    /// This is the synchronous core of [`ModelTrainer::train`]; it validates
    /// the request, rolls for a simulated failure on tuned runs and
    /// fabricates the output.
    pub fn fabricate(&self, request: &TrainingRequest) -> Result<TrainingOutput> {
        request.validate()?;

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        if request.run_kind == RunKind::Tuned && rng.gen_bool(self.failure_probability) {
            log::warn!(
                "Simulated failure of tuned run ({} trees)",
                request.hyperparameters.n_estimators
            );
            return Err(training_error!(
                "Model training failed with {} trees, please try again",
                request.hyperparameters.n_estimators
            ));
        }

        let targets = request.dataset.numeric_column(&request.target)?;
        let ranges = feature_ranges(&request.dataset, &request.selected_features);

        let metrics = fabricate_metrics(request, &targets, &mut *rng);
        let importances = fabricate_importances(&request.selected_features, &mut *rng);
        let tree = fabricate_tree(request, &targets, &ranges, &mut *rng);
        let history = fabricate_history(request, self.history_rows, &mut *rng)?;

        Ok(TrainingOutput {
            run_kind: request.run_kind,
            hyperparameters: request.hyperparameters.clone(),
            metrics,
            importances,
            tree,
            history,
            trained_at: Utc::now(),
        })
    }
}

impl Default for MockTrainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp to a probability; NaN falls back to the default rate.
fn failure_probability(p: f64) -> f64 {
    if p.is_nan() {
        log::warn!(
            "Failure probability is NaN, using {}",
            DEFAULT_FAILURE_PROBABILITY
        );
        DEFAULT_FAILURE_PROBABILITY
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl ModelTrainer for MockTrainer {
    async fn train(&self, request: TrainingRequest) -> Result<TrainingOutput> {
        log::info!(
            "Training {} {} model on '{}' with {} features",
            request.run_kind,
            request.task,
            request.dataset.name(),
            request.selected_features.len()
        );
        tokio::time::sleep(self.delay).await;

        let output = self.fabricate(&request)?;
        log::info!(
            "{} model trained, primary score {:.3}",
            request.run_kind,
            output.metrics.primary_score()
        );
        Ok(output)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: (f64, f64)) -> f64 {
    rng.gen_range(range.0..=range.1)
}

/// Observed [min, max] of each numeric selected feature
fn feature_ranges(dataset: &Dataset, features: &[String]) -> Vec<(String, f64, f64)> {
    features
        .iter()
        .filter_map(|name| {
            let values = dataset.numeric_column(name).ok()?;
            if values.is_empty() {
                return None;
            }
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some((name.clone(), min, max))
        })
        .collect()
}

fn fabricate_metrics<R: Rng + ?Sized>(
    request: &TrainingRequest,
    targets: &[f64],
    rng: &mut R,
) -> ModelMetrics {
    match request.task {
        TaskType::Regression => ModelMetrics::Regression(RegressionMetrics {
            r2: draw(rng, MOCK_R2_RANGE),
            rmse: draw(rng, MOCK_RMSE_RANGE),
            mae: draw(rng, MOCK_MAE_RANGE),
        }),
        TaskType::Classification => {
            let accuracy = draw(rng, MOCK_CLASSIFICATION_RANGE);
            let positive_rate = if targets.is_empty() {
                0.5
            } else {
                targets.iter().filter(|&&t| t >= 0.5).count() as f64 / targets.len() as f64
            };
            ModelMetrics::Classification(ClassificationMetrics {
                accuracy,
                precision: draw(rng, MOCK_CLASSIFICATION_RANGE),
                recall: draw(rng, MOCK_CLASSIFICATION_RANGE),
                confusion_matrix: confusion_matrix(request.test_rows(), positive_rate, accuracy),
            })
        }
    }
}

/// Confusion matrix over `total` instances with the given class balance and
/// roughly the given accuracy. Cells always sum to `total`.
fn confusion_matrix(total: usize, positive_rate: f64, accuracy: f64) -> ConfusionMatrix {
    let positives = ((total as f64 * positive_rate).round() as usize).min(total);
    let negatives = total - positives;
    let correct = ((total as f64 * accuracy).round() as usize).min(total);

    let true_positive = ((correct as f64 * positive_rate).round() as usize).min(positives);
    let true_negative = (correct - true_positive).min(negatives);
    let true_positive = (correct - true_negative).min(positives);

    ConfusionMatrix {
        true_positive,
        false_positive: negatives - true_negative,
        true_negative,
        false_negative: positives - true_positive,
    }
}

fn fabricate_importances<R: Rng + ?Sized>(features: &[String], rng: &mut R) -> Vec<FeatureImportance> {
    let mut importances: Vec<FeatureImportance> = features
        .iter()
        .map(|f| FeatureImportance::new(f.clone(), rng.gen::<f64>()))
        .collect();
    sort_importances(&mut importances);
    importances
}

fn fabricate_tree<R: Rng + ?Sized>(
    request: &TrainingRequest,
    targets: &[f64],
    ranges: &[(String, f64, f64)],
    rng: &mut R,
) -> DecisionTree {
    let max_depth = request
        .hyperparameters
        .max_depth
        .map_or(MOCK_TREE_MAX_DEPTH, |d| d.min(MOCK_TREE_MAX_DEPTH));
    let ctx = TreeContext {
        task: request.task,
        target_mean: mean(targets),
        target_spread: population_std_dev(targets).powi(2),
        ranges,
    };
    grow(&ctx, 0, max_depth, request.train_rows(), rng)
}

struct TreeContext<'a> {
    task: TaskType,
    target_mean: f64,
    target_spread: f64,
    ranges: &'a [(String, f64, f64)],
}

/// Root always splits when depth allows; deeper levels stop early at random.
fn grow<R: Rng + ?Sized>(
    ctx: &TreeContext<'_>,
    depth: usize,
    max_depth: usize,
    samples: usize,
    rng: &mut R,
) -> DecisionTree {
    let stop = depth >= max_depth
        || ctx.ranges.is_empty()
        || samples < 2
        || (depth > 0 && rng.gen_bool(MOCK_EARLY_LEAF_PROBABILITY));
    if stop {
        return fabricate_leaf(ctx, samples, rng);
    }

    let (feature, min, max) = &ctx.ranges[rng.gen_range(0..ctx.ranges.len())];
    let threshold = if max > min {
        rng.gen_range(*min..=*max)
    } else {
        *min
    };
    let impurity = match ctx.task {
        TaskType::Classification => rng.gen_range(0.0..=0.5),
        TaskType::Regression => ctx.target_spread * rng.gen_range(0.3..=1.0),
    };

    let left_samples = ((samples as f64 * rng.gen_range(0.3..=0.7)).round() as usize).clamp(1, samples - 1);
    let right_samples = samples - left_samples;

    DecisionTree::node(
        feature.clone(),
        threshold,
        impurity,
        samples,
        grow(ctx, depth + 1, max_depth, left_samples, rng),
        grow(ctx, depth + 1, max_depth, right_samples, rng),
    )
}

fn fabricate_leaf<R: Rng + ?Sized>(ctx: &TreeContext<'_>, samples: usize, rng: &mut R) -> DecisionTree {
    let value = match ctx.task {
        TaskType::Regression => vec![ctx.target_mean * draw(rng, MOCK_REGRESSION_NOISE)],
        TaskType::Classification => {
            let p: f64 = rng.gen();
            vec![1.0 - p, p]
        }
    };
    DecisionTree::leaf(value, samples)
}

fn fabricate_history<R: Rng + ?Sized>(
    request: &TrainingRequest,
    rows: usize,
    rng: &mut R,
) -> Result<Vec<Prediction>> {
    let head = request.dataset.head(rows);
    let trees_shown = request.hyperparameters.n_estimators.min(MOCK_TREES_SHOWN);
    let now = Utc::now();
    let selected: HashSet<&str> = request.selected_features.iter().map(String::as_str).collect();

    head.iter()
        .enumerate()
        .map(|(id, row)| {
            let actual = row
                .get(&request.target)
                .and_then(Value::as_f64)
                .ok_or_else(|| ForestLabError::dataset(format!("Row {} has no numeric target", id)))?;

            let predicted = match request.task {
                TaskType::Regression => actual * draw(rng, MOCK_REGRESSION_NOISE),
                TaskType::Classification => {
                    if rng.gen_bool(MOCK_LABEL_FLIP_PROBABILITY) {
                        1.0 - actual
                    } else {
                        actual
                    }
                }
            };

            let tree_predictions = (0..trees_shown)
                .map(|_| draw_tree_prediction(predicted, request.task, rng))
                .collect();

            let features: Row = row
                .iter()
                .filter(|(name, _)| selected.contains(name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();

            Ok(Prediction {
                id,
                timestamp: now - chrono::Duration::seconds((head.len() - id) as i64),
                features,
                actual,
                predicted,
                tree_predictions: Some(tree_predictions),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hyperparameters;
    use crate::dataset::{DIABETES, HOUSING};
    use std::sync::Arc;

    fn trainer() -> MockTrainer {
        MockTrainer::new().with_seed(42).with_delay(Duration::ZERO)
    }

    fn request(task: TaskType, run_kind: RunKind) -> TrainingRequest {
        let (dataset, target, features): (Arc<Dataset>, &str, Vec<&str>) = match task {
            TaskType::Regression => (HOUSING.load().unwrap(), "price", vec!["sqft", "age", "neighborhood"]),
            TaskType::Classification => (DIABETES.load().unwrap(), "outcome", vec!["glucose", "bmi"]),
        };
        TrainingRequest {
            task,
            run_kind,
            hyperparameters: Hyperparameters::baseline(task),
            selected_features: features.into_iter().map(String::from).collect(),
            target: target.to_string(),
            test_size: 0.2,
            dataset,
        }
    }

    #[test]
    fn test_regression_metrics_in_range() {
        let output = trainer()
            .fabricate(&request(TaskType::Regression, RunKind::Baseline))
            .unwrap();
        match output.metrics {
            ModelMetrics::Regression(m) => {
                assert!((0.75..=0.95).contains(&m.r2));
                assert!((2.0..=5.0).contains(&m.rmse));
                assert!((1.5..=3.5).contains(&m.mae));
            }
            other => panic!("expected regression metrics, got {:?}", other),
        }
    }

    #[test]
    fn test_confusion_matrix_sums_to_test_size() {
        let req = request(TaskType::Classification, RunKind::Baseline);
        let output = trainer().fabricate(&req).unwrap();
        match output.metrics {
            ModelMetrics::Classification(m) => {
                assert_eq!(m.confusion_matrix.total(), req.test_rows());
                for v in [m.accuracy, m.precision, m.recall] {
                    assert!((0.87..=0.99).contains(&v));
                }
            }
            other => panic!("expected classification metrics, got {:?}", other),
        }
    }

    #[test]
    fn test_confusion_matrix_edge_cases() {
        assert_eq!(confusion_matrix(1, 0.0, 0.9).total(), 1);
        assert_eq!(confusion_matrix(5, 1.0, 0.5).total(), 5);
        let cm = confusion_matrix(100, 0.3, 0.9);
        assert_eq!(cm.total(), 100);
        assert_eq!(cm.true_positive + cm.true_negative, 90);
    }

    #[test]
    fn test_importances_cover_selected_features_descending() {
        let req = request(TaskType::Regression, RunKind::Baseline);
        let output = trainer().fabricate(&req).unwrap();
        assert_eq!(output.importances.len(), req.selected_features.len());
        for pair in output.importances.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
    }

    #[test]
    fn test_tree_respects_depth_and_ranges() {
        let trainer = trainer();
        let mut req = request(TaskType::Classification, RunKind::Baseline);
        let ranges = feature_ranges(&req.dataset, &req.selected_features);
        for _ in 0..20 {
            let tree = trainer.fabricate(&req).unwrap().tree;
            assert!(tree.depth() <= MOCK_TREE_MAX_DEPTH);
            check_thresholds(&tree, &ranges);
        }

        req.hyperparameters.max_depth = Some(1);
        for _ in 0..10 {
            assert!(trainer.fabricate(&req).unwrap().tree.depth() <= 1);
        }
    }

    fn check_thresholds(tree: &DecisionTree, ranges: &[(String, f64, f64)]) {
        if let DecisionTree::Node {
            feature,
            threshold,
            left,
            right,
            ..
        } = tree
        {
            let (_, min, max) = ranges.iter().find(|(name, _, _)| name == feature).unwrap();
            assert!(threshold >= min && threshold <= max);
            check_thresholds(left, ranges);
            check_thresholds(right, ranges);
        }
    }

    #[test]
    fn test_categorical_features_never_split() {
        let trainer = trainer();
        let mut req = request(TaskType::Regression, RunKind::Baseline);
        req.selected_features = vec!["neighborhood".to_string()];
        let output = trainer.fabricate(&req).unwrap();
        assert!(output.tree.is_leaf());
    }

    #[test]
    fn test_history_shape() {
        let req = request(TaskType::Classification, RunKind::Baseline);
        let output = trainer().fabricate(&req).unwrap();
        assert_eq!(output.history.len(), DEFAULT_HISTORY_ROWS);
        for p in &output.history {
            assert!(p.predicted == 0.0 || p.predicted == 1.0);
            assert_eq!(p.tree_predictions.as_ref().map(Vec::len), Some(MOCK_TREES_SHOWN));
            assert_eq!(p.features.len(), 2);
        }
        for pair in output.history.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_regression_history_noise() {
        let output = trainer()
            .fabricate(&request(TaskType::Regression, RunKind::Baseline))
            .unwrap();
        for p in &output.history {
            let ratio = p.predicted / p.actual;
            assert!((0.9..=1.1).contains(&ratio));
        }
    }

    #[test]
    fn test_baseline_never_fails() {
        let trainer = trainer().with_failure_probability(1.0);
        assert!(trainer
            .fabricate(&request(TaskType::Regression, RunKind::Baseline))
            .is_ok());

        let err = trainer
            .fabricate(&request(TaskType::Regression, RunKind::Tuned))
            .unwrap_err();
        assert!(err.to_string().contains("Model training failed"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_tuned_failure_rate() {
        let trainer = trainer();
        let req = request(TaskType::Regression, RunKind::Tuned);
        let trials = 2000;
        let failures = (0..trials)
            .filter(|_| trainer.fabricate(&req).is_err())
            .count();
        let rate = failures as f64 / trials as f64;
        assert!((0.07..=0.13).contains(&rate), "failure rate {}", rate);
    }

    #[test]
    fn test_out_of_range_failure_probability() {
        let trainer = MockTrainer::new()
            .with_seed(4)
            .with_failure_probability(f64::NAN);
        assert_eq!(trainer.failure_probability, DEFAULT_FAILURE_PROBABILITY);
        for _ in 0..50 {
            let _ = trainer.fabricate(&request(TaskType::Regression, RunKind::Tuned));
        }
        assert!(trainer
            .fabricate(&request(TaskType::Regression, RunKind::Baseline))
            .is_ok());

        let always = MockTrainer::new().with_failure_probability(f64::INFINITY);
        assert!(always
            .fabricate(&request(TaskType::Regression, RunKind::Tuned))
            .is_err());
        let never = MockTrainer::new().with_failure_probability(-3.0);
        assert!(never
            .fabricate(&request(TaskType::Regression, RunKind::Tuned))
            .is_ok());
    }

    #[test]
    fn test_seeded_trainers_agree() {
        let req = request(TaskType::Regression, RunKind::Baseline);
        let a = trainer().fabricate(&req).unwrap();
        let b = trainer().fabricate(&req).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.tree, b.tree);
    }

    #[tokio::test(start_paused = true)]
    async fn test_train_waits_for_delay() {
        let trainer = MockTrainer::new()
            .with_seed(1)
            .with_delay(Duration::from_millis(1500));
        let start = tokio::time::Instant::now();
        let output = trainer
            .train(request(TaskType::Classification, RunKind::Baseline))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert_eq!(output.run_kind, RunKind::Baseline);
    }
}
