//! Natural-language insights about a trained model.
//!
//! Text generation sits behind the [`InsightGenerator`] trait. The bundled
//! [`TemplateInsightGenerator`] writes text from templates and needs no
//! network. [`InsightService`] never fails: generator errors are logged and
//! replaced by static fallback text.

use crate::core::constants::{EXPLANATION_FALLBACK, INSIGHT_FALLBACK};
use crate::core::error::{ForestLabError, Result};
use crate::core::types::TaskType;
use crate::ensemble::AggregatedPrediction;
use crate::prediction::{FeatureImportance, Prediction};

use async_trait::async_trait;

/// Number of features named in an importance summary
const SUMMARY_TOP_FEATURES: usize = 3;

/// Inputs for explaining one prediction
#[derive(Debug, Clone)]
pub struct ExplanationRequest {
    /// Task type
    pub task: TaskType,
    /// Target column
    pub target: String,
    /// Instance to explain
    pub prediction: Prediction,
    /// Model feature importances, descending
    pub importances: Vec<FeatureImportance>,
    /// Forest-level aggregate for the instance, when simulated
    pub aggregate: Option<AggregatedPrediction>,
}

/// Produces insight text.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Summarize what the importances say about the target
    async fn summarize_importances(
        &self,
        importances: &[FeatureImportance],
        target: &str,
    ) -> Result<String>;

    /// Explain a single prediction
    async fn explain_prediction(&self, request: &ExplanationRequest) -> Result<String>;
}

/// Offline generator built from text templates
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInsightGenerator;

#[async_trait]
impl InsightGenerator for TemplateInsightGenerator {
    async fn summarize_importances(
        &self,
        importances: &[FeatureImportance],
        target: &str,
    ) -> Result<String> {
        if importances.is_empty() {
            return Err(ForestLabError::insight("No feature importances to summarize"));
        }

        let total: f64 = importances.iter().map(|fi| fi.importance).sum();
        let top: Vec<String> = importances
            .iter()
            .take(SUMMARY_TOP_FEATURES)
            .map(|fi| {
                let share = if total > 0.0 {
                    fi.importance / total * 100.0
                } else {
                    0.0
                };
                format!("{} ({:.1}%)", fi.feature, share)
            })
            .collect();

        let mut text = format!(
            "The strongest drivers of {} are {}.",
            target,
            join_names(&top)
        );
        if let Some(weakest) = importances.last().filter(|_| importances.len() > SUMMARY_TOP_FEATURES) {
            text.push_str(&format!(
                " {} contributes the least and is a candidate for removal.",
                weakest.feature
            ));
        }
        Ok(text)
    }

    async fn explain_prediction(&self, request: &ExplanationRequest) -> Result<String> {
        let p = &request.prediction;
        let drivers: Vec<String> = request
            .importances
            .iter()
            .filter_map(|fi| {
                p.features
                    .get(&fi.feature)
                    .map(|value| format!("{} = {}", fi.feature, value))
            })
            .take(SUMMARY_TOP_FEATURES)
            .collect();
        if drivers.is_empty() {
            return Err(ForestLabError::insight(format!(
                "Instance {} carries none of the important features",
                p.id
            )));
        }

        let outcome = match request.task {
            TaskType::Regression => format!(
                "The model predicts {} = {:.2} against an actual value of {:.2} (error {:+.2}).",
                request.target,
                p.predicted,
                p.actual,
                p.error()
            ),
            TaskType::Classification => format!(
                "The model predicts class {} for {}; the actual class is {}.",
                class_label(p.predicted),
                request.target,
                class_label(p.actual)
            ),
        };

        let mut text = format!("{} The deciding inputs were {}.", outcome, join_names(&drivers));
        if let Some(aggregate) = &request.aggregate {
            match aggregate {
                AggregatedPrediction::Regression { std_dev, num_trees, .. } => text.push_str(&format!(
                    " Across {} trees the spread was {:.2}.",
                    num_trees, std_dev
                )),
                AggregatedPrediction::Classification { .. } => text.push_str(&format!(
                    " {:.0}% of {} trees agreed.",
                    aggregate.agreement() * 100.0,
                    aggregate.num_trees()
                )),
            }
        }
        Ok(text)
    }
}

fn class_label(value: f64) -> u8 {
    if value >= 0.5 {
        1
    } else {
        0
    }
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Wraps a generator and substitutes fallback text on failure
#[derive(Debug, Clone, Default)]
pub struct InsightService<G> {
    generator: G,
}

impl<G: InsightGenerator> InsightService<G> {
    /// Wrap a generator
    pub fn new(generator: G) -> Self {
        InsightService { generator }
    }

    /// Importance summary, or the fallback text
    pub async fn importance_insights(&self, importances: &[FeatureImportance], target: &str) -> String {
        match self.generator.summarize_importances(importances, target).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Insight generation failed ({}): {}", e.category(), e);
                INSIGHT_FALLBACK.to_string()
            }
        }
    }

    /// Prediction explanation, or the fallback text. Only called on explicit
    /// user request.
    pub async fn explain(&self, request: &ExplanationRequest) -> String {
        match self.generator.explain_prediction(request).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "Explanation of instance {} failed ({}): {}",
                    request.prediction.id,
                    e.category(),
                    e
                );
                EXPLANATION_FALLBACK.to_string()
            }
        }
    }
}
