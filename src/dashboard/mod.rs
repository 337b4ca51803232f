//! Dashboard engine: state, controller and debounced retraining.
//!
//! The [`DashboardController`] is the only writer of [`DashboardState`];
//! presentation code reads [`DashboardSnapshot`]s.

pub mod comparison;
pub mod controller;
pub mod debounce;
pub mod state;

pub use comparison::{compare_metrics, MetricDelta};
pub use controller::DashboardController;
pub use debounce::{Debouncer, Flush};
pub use state::{
    DashboardSnapshot, DashboardState, Notification, NotificationLevel, RunSlot, TrainingStatus,
};
