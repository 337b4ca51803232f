//! Dashboard state controller.
//!
//! The controller owns the dashboard state behind a mutex and drives the
//! trainer. The lock is released before every trainer await, so edits stay
//! responsive while a model trains. Overlapping calls of the same run kind
//! are not cancelled: whichever resolves last is what the slot shows.
//! Results of calls started before a task switch are dropped.

use crate::config::{
    validate_test_size, ConfigValidator, DashboardConfig, Hyperparameters, ValidationResult,
};
use crate::core::error::{ForestLabError, Result};
use crate::core::types::{RunKind, TaskType};
use crate::dashboard::debounce::{Debouncer, Flush};
use crate::dashboard::state::{DashboardSnapshot, DashboardState, NotificationLevel, RunSlot};
use crate::dataset::{BundledDatasetProvider, Dataset, DatasetProvider};
use crate::metrics_eval::ModelMetrics;
use crate::prediction::{error_histogram, history_metrics};
use crate::stats::{histogram, CorrelationMatrix, DatasetSummary, HistogramBin, StatsCache};
use crate::training::{ModelTrainer, TrainingRequest};
use crate::{config_error, ensure};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Drives training and owns the dashboard state
pub struct DashboardController<T> {
    state: Arc<Mutex<DashboardState>>,
    trainer: Arc<T>,
    provider: Arc<dyn DatasetProvider>,
    debouncer: Arc<Mutex<Debouncer>>,
    stats: Arc<Mutex<StatsCache>>,
    config: DashboardConfig,
}

impl<T> Clone for DashboardController<T> {
    fn clone(&self) -> Self {
        DashboardController {
            state: Arc::clone(&self.state),
            trainer: Arc::clone(&self.trainer),
            provider: Arc::clone(&self.provider),
            debouncer: Arc::clone(&self.debouncer),
            stats: Arc::clone(&self.stats),
            config: self.config.clone(),
        }
    }
}

impl<T> fmt::Debug for DashboardController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: ModelTrainer + 'static> DashboardController<T> {
    /// Controller over the bundled datasets, starting on the regression task
    pub fn new(trainer: T, config: DashboardConfig) -> Result<Self> {
        Self::with_provider(
            trainer,
            Arc::new(BundledDatasetProvider),
            config,
            TaskType::default(),
        )
    }

    /// Controller with a custom dataset source and initial task
    pub fn with_provider(
        trainer: T,
        provider: Arc<dyn DatasetProvider>,
        config: DashboardConfig,
        task: TaskType,
    ) -> Result<Self> {
        config.validate()?;
        let (dataset, target) = provider.load(task)?;
        let state = DashboardState::new(task, dataset, target, config.default_test_size);

        log::info!(
            "Dashboard ready: {} on '{}' (debounce {} ms)",
            task,
            state.dataset.name(),
            config.debounce_delay_ms
        );

        Ok(DashboardController {
            state: Arc::new(Mutex::new(state)),
            trainer: Arc::new(trainer),
            provider,
            debouncer: Arc::new(Mutex::new(Debouncer::new(config.debounce_delay()))),
            stats: Arc::new(Mutex::new(StatsCache::new())),
            config,
        })
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runtime settings
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Current task
    pub fn task(&self) -> TaskType {
        self.state().task
    }

    /// Dataset of the current task
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.state().dataset)
    }

    /// Read-only copy of the state
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state().snapshot()
    }

    /// Status and output of one run kind
    pub fn slot(&self, kind: RunKind) -> RunSlot {
        self.state().slot(kind).clone()
    }

    /// Remove and return pending notifications
    pub fn take_notifications(&self) -> Vec<crate::dashboard::state::Notification> {
        std::mem::take(&mut self.state().notifications)
    }

    /// Switch task. Resets both result slots, cancels a pending retrain,
    /// loads the task's dataset and resets hyperparameters, target, test
    /// size and feature selection. Selecting the current task does nothing.
    pub fn set_task(&self, task: TaskType) -> Result<()> {
        if self.task() == task {
            return Ok(());
        }

        self.debouncer().cancel();
        let (dataset, target) = self.provider.load(task)?;

        let mut state = self.state();
        let epoch = state.epoch + 1;
        let notifications = std::mem::take(&mut state.notifications);
        *state = DashboardState::new(task, dataset, target, self.config.default_test_size);
        state.epoch = epoch;
        state.notifications = notifications;
        let message = format!("Switched to {} on '{}'", task, state.dataset.name());
        state.notify(NotificationLevel::Info, message);

        log::info!("Task switched to {}", task);
        Ok(())
    }

    /// Replace the tuned hyperparameters. Legal but unusual settings are
    /// reported as info notifications.
    pub fn set_hyperparameters(&self, params: Hyperparameters) -> Result<()> {
        {
            let mut state = self.state();
            params.validate_for_task(state.task)?;
            let warnings: Vec<String> = ConfigValidator::new(state.task)
                .with_num_features(state.selected_features.len())
                .validate(&params)
                .into_iter()
                .filter_map(|result| match result {
                    ValidationResult::Warning(w) => Some(format!("{}: {}", w.parameter, w.message)),
                    ValidationResult::Error(_) => None,
                })
                .collect();
            for warning in warnings {
                state.notify(NotificationLevel::Info, warning);
            }
            state.hyperparameters = params;
        }
        self.schedule_retrain();
        Ok(())
    }

    /// Edit the tuned hyperparameters in place. The edit is discarded when
    /// the result does not validate.
    pub fn update_hyperparameters<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Hyperparameters),
    {
        let mut params = self.state().hyperparameters.clone();
        edit(&mut params);
        self.set_hyperparameters(params)
    }

    /// Change the target column. The new target leaves the feature
    /// selection.
    pub fn set_target(&self, target: &str) -> Result<()> {
        {
            let mut state = self.state();
            ensure!(
                state.dataset.is_numeric_column(target),
                config_error!("'{}' is not a numeric column of '{}'", target, state.dataset.name())
            );
            state.target = target.to_string();
            state.selected_features.retain(|f| f != target);
        }
        self.schedule_retrain();
        Ok(())
    }

    /// Change the held-out fraction
    pub fn set_test_size(&self, test_size: f64) -> Result<()> {
        validate_test_size(test_size)?;
        self.state().test_size = test_size;
        self.schedule_retrain();
        Ok(())
    }

    /// Flip selection of one feature; returns whether it is now selected
    pub fn toggle_feature(&self, feature: &str) -> Result<bool> {
        let mut state = self.state();
        ensure!(
            state.dataset.has_column(feature) && feature != state.target,
            config_error!("'{}' is not a feature of '{}'", feature, state.dataset.name())
        );

        if let Some(pos) = state.selected_features.iter().position(|f| f == feature) {
            state.selected_features.remove(pos);
            Ok(false)
        } else {
            state.selected_features.push(feature.to_string());
            Ok(true)
        }
    }

    /// Replace the feature selection
    pub fn set_selected_features(&self, features: Vec<String>) -> Result<()> {
        let mut state = self.state();
        for feature in &features {
            ensure!(
                state.dataset.has_column(feature) && feature != &state.target,
                config_error!("'{}' is not a feature of '{}'", feature, state.dataset.name())
            );
        }
        state.selected_features = features;
        Ok(())
    }

    /// Train the baseline model with the task's default hyperparameters
    pub async fn train_baseline(&self) -> Result<()> {
        self.train(RunKind::Baseline).await
    }

    /// Train the tuned model with the current hyperparameters. Supersedes a
    /// pending debounced retrain.
    pub async fn train_tuned(&self) -> Result<()> {
        self.debouncer().cancel();
        self.train(RunKind::Tuned).await
    }

    /// Run a pending debounced retrain now, or wait for one already running.
    /// Returns whether there was one.
    pub async fn flush_pending(&self) -> bool {
        let flush = self.debouncer().flush();
        match flush {
            Flush::Idle => false,
            Flush::Cancelled => {
                // Failures are already recorded in the tuned slot.
                let _ = self.train(RunKind::Tuned).await;
                true
            }
            Flush::Running(handle) => {
                if let Err(e) = handle.await {
                    log::warn!("Debounced retrain task ended abnormally: {}", e);
                }
                true
            }
        }
    }

    /// Whether a debounced retrain is waiting or running
    pub fn has_pending_retrain(&self) -> bool {
        self.debouncer().is_pending()
    }

    async fn train(&self, kind: RunKind) -> Result<()> {
        let (request, epoch) = {
            let mut state = self.state();
            let hyperparameters = match kind {
                RunKind::Baseline => Hyperparameters::baseline(state.task),
                RunKind::Tuned => state.hyperparameters.clone(),
            };
            let request = TrainingRequest {
                task: state.task,
                run_kind: kind,
                hyperparameters,
                selected_features: state.selected_features.clone(),
                target: state.target.clone(),
                test_size: state.test_size,
                dataset: Arc::clone(&state.dataset),
            };
            state.slot_mut(kind).start();
            (request, state.epoch)
        };

        log::debug!("Starting {} run with {}", kind, self.trainer.name());
        let result = self.trainer.train(request).await;

        let mut state = self.state();
        if state.epoch != epoch {
            log::debug!("Dropping {} result from a previous task", kind);
            return result.map(|_| ());
        }

        match result {
            Ok(output) => {
                state.slot_mut(kind).succeed(output);
                if kind == RunKind::Baseline {
                    state.baseline_trained = true;
                }
                state.notify(
                    NotificationLevel::Success,
                    format!("{} model trained successfully", capitalize(kind)),
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("{} training failed ({}): {}", kind, e.category(), e);
                state.slot_mut(kind).fail(e.to_string());
                state.notify(NotificationLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    fn schedule_retrain(&self) {
        if !self.state().baseline_trained {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            log::warn!("No async runtime; automatic retrain skipped");
            return;
        }

        let this = self.clone();
        self.debouncer().schedule(async move {
            let _ = this.train(RunKind::Tuned).await;
        });
        log::debug!("Tuned retrain scheduled in {} ms", self.config.debounce_delay_ms);
    }

    /// Numeric summary of the current dataset, memoized
    pub fn dataset_summary(&self) -> Arc<DatasetSummary> {
        let (dataset, task, target) = self.stats_identity();
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary(&dataset, task, &target)
    }

    /// Correlation matrix of the current dataset, memoized
    pub fn correlations(&self) -> Arc<CorrelationMatrix> {
        let (dataset, task, target) = self.stats_identity();
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .correlation(&dataset, task, &target)
    }

    /// Distribution of one numeric column
    pub fn feature_histogram(&self, feature: &str) -> Result<Vec<HistogramBin>> {
        let values = self.dataset().numeric_column(feature)?;
        Ok(histogram(&values, self.config.histogram_bins))
    }

    /// Distribution of prediction errors of one slot's history
    pub fn error_histogram(&self, kind: RunKind) -> Result<Vec<HistogramBin>> {
        let state = self.state();
        let output = state
            .slot(kind)
            .output
            .as_ref()
            .ok_or_else(|| ForestLabError::config(format!("No {} model has been trained", kind)))?;
        Ok(error_histogram(&output.history, self.config.histogram_bins))
    }

    /// Validator findings for the current tuned hyperparameters
    pub fn hyperparameter_advice(&self) -> Vec<ValidationResult> {
        let state = self.state();
        ConfigValidator::new(state.task)
            .with_num_features(state.selected_features.len())
            .validate(&state.hyperparameters)
    }

    /// Metrics of one slot's prediction history
    pub fn history_metrics(&self, kind: RunKind) -> Result<ModelMetrics> {
        let state = self.state();
        let output = state
            .slot(kind)
            .output
            .as_ref()
            .ok_or_else(|| ForestLabError::config(format!("No {} model has been trained", kind)))?;
        Ok(history_metrics(&output.history, state.task))
    }

    fn stats_identity(&self) -> (Arc<Dataset>, TaskType, String) {
        let state = self.state();
        (Arc::clone(&state.dataset), state.task, state.target.clone())
    }
}

fn capitalize(kind: RunKind) -> String {
    match kind {
        RunKind::Baseline => "Baseline".to_string(),
        RunKind::Tuned => "Tuned".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DEFAULT_TEST_SIZE;
    use crate::dashboard::state::TrainingStatus;
    use crate::training::MockTrainer;
    use std::time::Duration;

    fn config() -> DashboardConfig {
        DashboardConfig {
            training_delay_ms: 0,
            random_seed: Some(9),
            ..DashboardConfig::default()
        }
    }

    fn controller(failure_probability: f64) -> DashboardController<MockTrainer> {
        let config = config();
        let trainer = MockTrainer::from_config(&config).with_failure_probability(failure_probability);
        DashboardController::new(trainer, config).unwrap()
    }

    #[tokio::test]
    async fn test_baseline_success() {
        let controller = controller(0.0);
        controller.train_baseline().await.unwrap();

        let slot = controller.slot(RunKind::Baseline);
        assert_eq!(slot.status, TrainingStatus::Success);
        assert_eq!(
            slot.output.unwrap().hyperparameters,
            Hyperparameters::baseline(TaskType::Regression)
        );
        let notes = controller.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_tuned_failure_clears_slot() {
        let controller = controller(0.0);
        controller.train_tuned().await.unwrap();
        assert!(controller.slot(RunKind::Tuned).output.is_some());

        let failing = self::controller(1.0);
        failing.train_tuned().await.unwrap_err();
        let slot = failing.slot(RunKind::Tuned);
        assert!(matches!(slot.status, TrainingStatus::Error(ref m) if m.contains("Model training failed")));
        assert!(slot.output.is_none());
        let notes = failing.take_notifications();
        assert_eq!(notes.last().map(|n| n.level), Some(NotificationLevel::Error));
    }

    #[tokio::test]
    async fn test_validation_on_edits() {
        let controller = controller(0.0);
        assert!(controller.set_test_size(1.0).is_err());
        assert!(controller.set_test_size(f64::NAN).is_err());
        assert_eq!(controller.snapshot().test_size, DEFAULT_TEST_SIZE);
        assert!(controller.set_target("neighborhood").is_err());
        assert!(controller
            .update_hyperparameters(|p| p.n_estimators = 0)
            .is_err());
        assert_eq!(controller.snapshot().hyperparameters.n_estimators, 100);

        assert!(!controller.toggle_feature("sqft").unwrap());
        assert!(controller.toggle_feature("sqft").unwrap());
        assert!(controller.toggle_feature("price").is_err());
    }

    #[tokio::test]
    async fn test_set_target_removes_feature() {
        let controller = controller(0.0);
        controller.set_target("sqft").unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.target, "sqft");
        assert!(!snapshot.selected_features.contains(&"sqft".to_string()));
    }

    #[tokio::test]
    async fn test_unusual_hyperparameters_raise_advice() {
        let controller = controller(0.0);
        assert!(controller.hyperparameter_advice().is_empty());

        controller
            .update_hyperparameters(|p| p.n_estimators = 5)
            .unwrap();
        let advice = controller.hyperparameter_advice();
        assert!(advice.iter().any(|r| !r.is_error() && r.parameter() == "n_estimators"));

        let notes = controller.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Info);
        assert!(notes[0].message.starts_with("n_estimators"));
    }

    #[tokio::test]
    async fn test_history_metrics_follow_slot() {
        let controller = controller(0.0);
        assert!(controller.history_metrics(RunKind::Baseline).is_err());

        controller.train_baseline().await.unwrap();
        let metrics = controller.history_metrics(RunKind::Baseline).unwrap();
        assert_eq!(metrics.task(), TaskType::Regression);
        assert!(metrics.primary_score().is_finite());
    }

    #[tokio::test]
    async fn test_edits_before_baseline_do_not_retrain() {
        let controller = controller(0.0);
        controller.update_hyperparameters(|p| p.n_estimators = 50).unwrap();
        assert!(!controller.has_pending_retrain());
        assert!(!controller.flush_pending().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_runs_pending_retrain() {
        let controller = controller(0.0);
        controller.train_baseline().await.unwrap();
        controller.update_hyperparameters(|p| p.n_estimators = 250).unwrap();
        assert!(controller.has_pending_retrain());

        assert!(controller.flush_pending().await);
        let tuned = controller.slot(RunKind::Tuned).output.unwrap();
        assert_eq!(tuned.hyperparameters.n_estimators, 250);
        assert!(controller.snapshot().comparison.is_some());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!controller.has_pending_retrain());
    }

    #[tokio::test]
    async fn test_stats_views() {
        let controller = controller(0.0);
        let summary = controller.dataset_summary();
        assert!(summary.column("price").is_none());
        assert!(Arc::ptr_eq(&summary, &controller.dataset_summary()));

        let corr = controller.correlations();
        assert_eq!(corr.get("price", "price"), Some(1.0));

        assert_eq!(controller.feature_histogram("sqft").unwrap().len(), 20);
        assert!(controller.feature_histogram("neighborhood").is_err());
        assert!(controller.error_histogram(RunKind::Tuned).is_err());

        controller.train_baseline().await.unwrap();
        let bins = controller.error_histogram(RunKind::Baseline).unwrap();
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 15);
    }
}
