//! Numeric summary statistics for the dataset overview table.

use crate::core::types::TaskType;
use crate::dataset::Dataset;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Column name
    pub name: String,
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Median (mean of the two middle values on even counts)
    pub median: f64,
    /// Sample standard deviation (n - 1); 0 when count <= 1
    pub std_dev: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
}

/// Summary of a whole dataset for one target/task choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Number of rows
    pub num_rows: usize,
    /// Per-column statistics, in dataset column order, excluding the target
    pub columns: Vec<ColumnSummary>,
    /// Occurrences of each target value (classification only)
    pub class_counts: Option<BTreeMap<String, usize>>,
}

impl DatasetSummary {
    /// Statistics for one column
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Summarize every numeric column except `target`. For classification the
/// target's class counts are included.
pub fn summarize(dataset: &Dataset, target: &str, task: TaskType) -> DatasetSummary {
    let columns = dataset
        .numeric_columns()
        .into_iter()
        .filter(|&name| name != target)
        .filter_map(|name| {
            let values = dataset.numeric_column(name).ok()?;
            summarize_column(name, &values)
        })
        .collect();

    let class_counts = match task {
        TaskType::Classification => Some(class_counts(dataset, target)),
        TaskType::Regression => None,
    };

    DatasetSummary {
        num_rows: dataset.num_rows(),
        columns,
        class_counts,
    }
}

/// Summarize a slice of values; `None` for an empty slice.
pub fn summarize_column(name: &str, values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(ColumnSummary {
        name: name.to_string(),
        count: values.len(),
        mean: mean(values),
        median: median(values),
        std_dev: sample_std_dev(values),
        min,
        max,
    })
}

/// Count occurrences of each value in `target`. Unknown columns yield an
/// empty map.
pub fn class_counts(dataset: &Dataset, target: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    if let Ok(values) = dataset.column_values(target) {
        for value in values {
            *counts.entry(value.label()).or_insert(0) += 1;
        }
    }
    counts
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; 0 for an empty slice
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation with denominator n - 1; 0 when n <= 1
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Population standard deviation with denominator n; 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / values.len() as f64).sqrt()
}
