//! Pearson correlation matrix over the numeric columns of a dataset.
//!
//! The target column takes part for regression and is left out for
//! classification, where it is a class code rather than a measurement.

use crate::core::types::TaskType;
use crate::dataset::Dataset;
use crate::stats::summary::mean;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Square, symmetric correlation matrix keyed by column name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

/// One off-diagonal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    /// First column
    pub a: String,
    /// Second column
    pub b: String,
    /// Pearson r
    pub r: f64,
}

impl CorrelationMatrix {
    /// Columns on both axes, in dataset order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw matrix, rows and columns in [`CorrelationMatrix::columns`] order
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the matrix has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Correlation between two named columns
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[[i, j]])
    }

    /// Nested map form for heatmap rendering
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let row = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(j, b)| (b.clone(), self.values[[i, j]]))
                    .collect();
                (a.clone(), row)
            })
            .collect()
    }

    /// The `k` off-diagonal pairs with the largest |r|
    pub fn strongest_pairs(&self, k: usize) -> Vec<CorrelationPair> {
        let n = self.columns.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push(CorrelationPair {
                    a: self.columns[i].clone(),
                    b: self.columns[j].clone(),
                    r: self.values[[i, j]],
                });
            }
        }
        pairs.sort_by(|x, y| y.r.abs().total_cmp(&x.r.abs()));
        pairs.truncate(k);
        pairs
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Build the correlation matrix for a dataset.
///
/// Each unordered pair is computed once and mirrored; the diagonal is 1.
/// A pair involving a zero-variance column has correlation 0.
pub fn correlation_matrix(dataset: &Dataset, task: TaskType, target: &str) -> CorrelationMatrix {
    let columns: Vec<String> = dataset
        .numeric_columns()
        .into_iter()
        .filter(|&c| !(task.has_categorical_target() && c == target))
        .map(str::to_string)
        .collect();

    let data: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| dataset.numeric_column(c).unwrap_or_default())
        .collect();

    let n = columns.len();
    let mut values = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        values[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&data[i], &data[j]);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    log::debug!(
        "Computed {}x{} correlation matrix for '{}' ({})",
        n,
        n,
        dataset.name(),
        task
    );
    CorrelationMatrix { columns, values }
}

/// Pearson correlation of two equal-length series. Returns 0 when either
/// series has zero variance or the inputs are empty or mismatched.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || x.len() != y.len() {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut covariance = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    if sum_sq_x == 0.0 || sum_sq_y == 0.0 {
        return 0.0;
    }
    (covariance / (sum_sq_x.sqrt() * sum_sq_y.sqrt())).clamp(-1.0, 1.0)
}
