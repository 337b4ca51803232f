//! Mock training, forest simulation and insight generation over the bundled
//! datasets.

mod common;

use forest_lab::config::validate_test_size;
use forest_lab::{
    simulate_forest, AggregatedPrediction, BundledDataset, ExplanationRequest, Hyperparameters,
    InsightService, MockTrainer, ModelMetrics, ModelTrainer, RunKind, TaskType,
    TemplateInsightGenerator, TrainingRequest, MOCK_TREES_SHOWN,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn request(task: TaskType, run_kind: RunKind) -> TrainingRequest {
    let bundled = BundledDataset::for_task(task);
    let dataset = bundled.load().unwrap();
    TrainingRequest {
        task,
        run_kind,
        hyperparameters: Hyperparameters::baseline(task),
        selected_features: dataset.feature_columns(bundled.target),
        target: bundled.target.to_string(),
        test_size: 0.2,
        dataset,
    }
}

#[tokio::test]
async fn test_regression_run_on_housing() {
    let trainer = MockTrainer::new().with_seed(3).with_delay(Duration::ZERO);
    let output = trainer
        .train(request(TaskType::Regression, RunKind::Baseline))
        .await
        .unwrap();

    match &output.metrics {
        ModelMetrics::Regression(m) => {
            assert!((0.75..=0.95).contains(&m.r2));
            assert!(m.rmse > 0.0 && m.mae > 0.0);
        }
        other => panic!("expected regression metrics, got {:?}", other),
    }
    assert!(!output.importances.is_empty());
    assert!(!output.history.is_empty());
    assert!(output.tree.depth() <= 2);
    assert_eq!(output.run_kind, RunKind::Baseline);
}

#[tokio::test]
async fn test_classification_run_on_diabetes() {
    let trainer = MockTrainer::new().with_seed(5).with_delay(Duration::ZERO);
    let req = request(TaskType::Classification, RunKind::Baseline);
    let test_rows = req.test_rows();
    let output = trainer.train(req).await.unwrap();

    match &output.metrics {
        ModelMetrics::Classification(m) => {
            assert_eq!(m.confusion_matrix.total(), test_rows);
            assert!((0.87..=0.99).contains(&m.accuracy));
        }
        other => panic!("expected classification metrics, got {:?}", other),
    }
    for p in &output.history {
        assert!(p.actual == 0.0 || p.actual == 1.0);
        assert!(p.predicted == 0.0 || p.predicted == 1.0);
    }
}

#[tokio::test]
async fn test_tuned_failure_rate_is_about_ten_percent() {
    let trainer = MockTrainer::new().with_seed(99).with_delay(Duration::ZERO);
    let trials = 1000;
    let mut failures = 0;
    for _ in 0..trials {
        if trainer
            .train(request(TaskType::Regression, RunKind::Tuned))
            .await
            .is_err()
        {
            failures += 1;
        }
    }
    let rate = failures as f64 / trials as f64;
    assert!((0.06..=0.14).contains(&rate), "failure rate {}", rate);
}

#[tokio::test]
async fn test_invalid_request_is_rejected() {
    let trainer = MockTrainer::new().with_delay(Duration::ZERO);
    let mut req = request(TaskType::Regression, RunKind::Baseline);
    req.selected_features.clear();
    assert!(trainer.train(req).await.is_err());

    assert!(validate_test_size(0.0).is_err());
    assert!(validate_test_size(0.5).is_ok());
}

#[tokio::test]
async fn test_forest_simulation_matches_history() {
    let trainer = MockTrainer::new().with_seed(8).with_delay(Duration::ZERO);
    let output = trainer
        .train(request(TaskType::Classification, RunKind::Baseline))
        .await
        .unwrap();
    let instance = &output.history[0];

    let mut rng = StdRng::seed_from_u64(1);
    let forest = simulate_forest(
        instance,
        &output.tree,
        TaskType::Classification,
        MOCK_TREES_SHOWN,
        &mut rng,
    )
    .unwrap();

    assert_eq!(forest.num_trees(), MOCK_TREES_SHOWN);
    assert_eq!(forest.instance_id, instance.id);
    match &forest.aggregate {
        AggregatedPrediction::Classification { votes, num_trees, .. } => {
            assert_eq!(votes.values().sum::<usize>(), *num_trees);
        }
        other => panic!("expected a vote, got {:?}", other),
    }
    for tree in &forest.trees {
        assert!(tree.key_features.len() <= 3);
        assert!(tree.samples >= 1);
    }
}

#[tokio::test]
async fn test_template_insights_for_trained_model() {
    let trainer = MockTrainer::new().with_seed(21).with_delay(Duration::ZERO);
    let output = trainer
        .train(request(TaskType::Regression, RunKind::Baseline))
        .await
        .unwrap();

    let service = InsightService::new(TemplateInsightGenerator);
    let summary = service.importance_insights(&output.importances, "price").await;
    assert!(summary.contains(&output.importances[0].feature));

    let explanation = service
        .explain(&ExplanationRequest {
            task: TaskType::Regression,
            target: "price".to_string(),
            prediction: output.history[0].clone(),
            importances: output.importances.clone(),
            aggregate: None,
        })
        .await;
    assert!(!explanation.is_empty());
}
