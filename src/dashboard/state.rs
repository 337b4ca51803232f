//! Dashboard state and its read-only snapshot.

use crate::config::Hyperparameters;
use crate::core::constants::MAX_NOTIFICATIONS;
use crate::core::types::{RunKind, TaskType};
use crate::dashboard::comparison::{compare_metrics, MetricDelta};
use crate::dataset::Dataset;
use crate::training::TrainingOutput;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Lifecycle of one result slot.
///
/// `Idle -> Loading` on a training call, then `Loading -> Success` or
/// `Loading -> Error`. Any state may go back to `Loading`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum TrainingStatus {
    /// Nothing trained yet
    #[default]
    Idle,
    /// A call is in flight
    Loading,
    /// The last call to resolve succeeded
    Success,
    /// The last call to resolve failed
    Error(String),
}

impl TrainingStatus {
    /// Whether a call is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, TrainingStatus::Loading)
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingStatus::Idle => write!(f, "idle"),
            TrainingStatus::Loading => write!(f, "loading"),
            TrainingStatus::Success => write!(f, "success"),
            TrainingStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Status and latest output of one run kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSlot {
    /// Current status
    pub status: TrainingStatus,
    /// Output of the last successful call; cleared on failure
    pub output: Option<TrainingOutput>,
}

impl RunSlot {
    pub(crate) fn start(&mut self) {
        self.status = TrainingStatus::Loading;
    }

    pub(crate) fn succeed(&mut self, output: TrainingOutput) {
        self.status = TrainingStatus::Success;
        self.output = Some(output);
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.status = TrainingStatus::Error(message);
        self.output = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = RunSlot::default();
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Informational
    Info,
    /// A run finished
    Success,
    /// A run failed
    Error,
}

/// Toast-style message for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Message text
    pub message: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped now
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Notification {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Mutable state owned by the controller
#[derive(Debug)]
pub struct DashboardState {
    pub(crate) task: TaskType,
    pub(crate) dataset: Arc<Dataset>,
    pub(crate) target: String,
    pub(crate) selected_features: Vec<String>,
    pub(crate) hyperparameters: Hyperparameters,
    pub(crate) test_size: f64,
    pub(crate) baseline: RunSlot,
    pub(crate) tuned: RunSlot,
    pub(crate) notifications: Vec<Notification>,
    /// Set after the first successful baseline run; arms debounced retrains
    pub(crate) baseline_trained: bool,
    /// Bumped on every task switch so results of older calls are dropped
    pub(crate) epoch: u64,
}

impl DashboardState {
    /// Fresh state for `task` over `dataset`. Every non-target column starts
    /// selected.
    pub fn new(task: TaskType, dataset: Arc<Dataset>, target: String, test_size: f64) -> Self {
        let selected_features = dataset.feature_columns(&target);
        DashboardState {
            task,
            dataset,
            target,
            selected_features,
            hyperparameters: Hyperparameters::baseline(task),
            test_size,
            baseline: RunSlot::default(),
            tuned: RunSlot::default(),
            notifications: Vec::new(),
            baseline_trained: false,
            epoch: 0,
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: RunKind) -> &mut RunSlot {
        match kind {
            RunKind::Baseline => &mut self.baseline,
            RunKind::Tuned => &mut self.tuned,
        }
    }

    /// Slot of a run kind
    pub fn slot(&self, kind: RunKind) -> &RunSlot {
        match kind {
            RunKind::Baseline => &self.baseline,
            RunKind::Tuned => &self.tuned,
        }
    }

    /// Queue a toast. Only the newest [`MAX_NOTIFICATIONS`] are kept until
    /// the queue is drained.
    pub(crate) fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    /// Read-only copy for presentation
    pub fn snapshot(&self) -> DashboardSnapshot {
        let comparison = match (&self.baseline.output, &self.tuned.output) {
            (Some(baseline), Some(tuned)) => compare_metrics(&baseline.metrics, &tuned.metrics),
            _ => None,
        };

        DashboardSnapshot {
            task: self.task,
            dataset: self.dataset.name().to_string(),
            num_rows: self.dataset.num_rows(),
            target: self.target.clone(),
            selected_features: self.selected_features.clone(),
            hyperparameters: self.hyperparameters.clone(),
            test_size: self.test_size,
            baseline: self.baseline.clone(),
            tuned: self.tuned.clone(),
            comparison,
            notifications: self.notifications.clone(),
        }
    }
}

/// Serializable view of the whole dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Task type
    pub task: TaskType,
    /// Dataset name
    pub dataset: String,
    /// Dataset row count
    pub num_rows: usize,
    /// Target column
    pub target: String,
    /// Selected feature columns
    pub selected_features: Vec<String>,
    /// Hyperparameters of the next tuned run
    pub hyperparameters: Hyperparameters,
    /// Held-out fraction
    pub test_size: f64,
    /// Baseline slot
    pub baseline: RunSlot,
    /// Tuned slot
    pub tuned: RunSlot,
    /// Per-metric deltas when both slots hold results
    pub comparison: Option<Vec<MetricDelta>>,
    /// Pending notifications, oldest first
    pub notifications: Vec<Notification>,
}

impl DashboardSnapshot {
    /// Export as pretty-printed JSON
    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
