//! Common test utilities for Forest Lab integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use forest_lab::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Dashboard settings with no training delay and a fixed seed
pub fn fast_config() -> DashboardConfig {
    DashboardConfig {
        training_delay_ms: 0,
        random_seed: Some(2024),
        ..DashboardConfig::default()
    }
}

/// Small regression dataset with a perfectly linear target
pub fn linear_dataset(rows: usize) -> Dataset {
    let mut builder = DatasetBuilder::new("linear", &["x", "noise", "group", "y"]);
    for i in 0..rows {
        let x = i as f64;
        let group = if i % 2 == 0 { "even" } else { "odd" };
        builder = builder.row(vec![
            Value::from(x),
            Value::from(((i * 7) % 5) as f64),
            Value::from(group),
            Value::from(3.0 * x + 2.0),
        ]);
    }
    builder.build().expect("valid linear dataset")
}

/// Trainer that counts calls per run kind and delegates to a seeded
/// [`MockTrainer`]
#[derive(Debug)]
pub struct CountingTrainer {
    inner: MockTrainer,
    baseline_calls: AtomicUsize,
    tuned_calls: AtomicUsize,
}

impl CountingTrainer {
    pub fn new(delay: Duration, failure_probability: f64) -> Self {
        CountingTrainer {
            inner: MockTrainer::new()
                .with_seed(11)
                .with_delay(delay)
                .with_failure_probability(failure_probability),
            baseline_calls: AtomicUsize::new(0),
            tuned_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self, kind: RunKind) -> usize {
        match kind {
            RunKind::Baseline => self.baseline_calls.load(Ordering::SeqCst),
            RunKind::Tuned => self.tuned_calls.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl ModelTrainer for CountingTrainer {
    async fn train(&self, request: TrainingRequest) -> Result<TrainingOutput> {
        match request.run_kind {
            RunKind::Baseline => self.baseline_calls.fetch_add(1, Ordering::SeqCst),
            RunKind::Tuned => self.tuned_calls.fetch_add(1, Ordering::SeqCst),
        };
        self.inner.train(request).await
    }
}

/// Controller over the bundled datasets backed by a shared counting trainer
pub fn counting_controller(
    delay: Duration,
    failure_probability: f64,
) -> (DashboardController<Arc<CountingTrainer>>, Arc<CountingTrainer>) {
    let trainer = Arc::new(CountingTrainer::new(delay, failure_probability));
    let controller = DashboardController::new(Arc::clone(&trainer), fast_config())
        .expect("controller over bundled datasets");
    (controller, trainer)
}
