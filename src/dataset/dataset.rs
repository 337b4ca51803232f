//! Tabular dataset representation.
//!
//! A [`Dataset`] is an ordered sequence of rows keyed by column name. All
//! rows share the same column set; this is checked once at construction and
//! the dataset is immutable afterwards.

use crate::core::error::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric value
    Number(f64),
    /// Categorical value
    Category(String),
}

impl Value {
    /// Parse a raw field, preferring a numeric interpretation.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Value::Number(v),
            _ => Value::Category(trimmed.to_string()),
        }
    }

    /// Numeric content, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Category(_) => None,
        }
    }

    /// Whether this value is numeric
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Display label used for class counts and table cells. Integral numbers
    /// print without a fractional part.
    pub fn label(&self) -> String {
        match self {
            Value::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Value::Number(v) => v.to_string(),
            Value::Category(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Category(s.to_string())
    }
}

/// One dataset row: column name to value.
pub type Row = BTreeMap<String, Value>;

/// Immutable tabular dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Create a dataset, checking that every row carries exactly `columns`.
    pub fn new<S: Into<String>>(name: S, columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(DatasetError::DuplicateColumn {
                    name: column.clone(),
                }
                .into());
            }
        }

        for (index, row) in rows.iter().enumerate() {
            let matches = row.len() == columns.len() && columns.iter().all(|c| row.contains_key(c));
            if !matches {
                return Err(DatasetError::ColumnMismatch {
                    row: index,
                    expected: columns.clone(),
                    actual: row.keys().cloned().collect(),
                }
                .into());
            }
        }

        Ok(Dataset {
            name: name.into(),
            columns,
            rows,
        })
    }

    /// Dataset name, used as part of memoization keys
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// A column is numeric when the dataset is non-empty and every value in
    /// it is a number.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        self.has_column(name)
            && !self.rows.is_empty()
            && self
                .rows
                .iter()
                .all(|row| row.get(name).map_or(false, Value::is_number))
    }

    /// Numeric columns in file order
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| self.is_numeric_column(c))
            .map(String::as_str)
            .collect()
    }

    /// All values of a column
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        if !self.has_column(name) {
            return Err(DatasetError::UnknownColumn {
                name: name.to_string(),
            }
            .into());
        }
        Ok(self.rows.iter().filter_map(|row| row.get(name)).collect())
    }

    /// Values of a numeric column
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let values = self.column_values(name)?;
        values
            .into_iter()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    DatasetError::NotNumeric {
                        name: name.to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }

    /// Every column except `target`
    pub fn feature_columns(&self, target: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.as_str() != target)
            .cloned()
            .collect()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Incremental dataset construction
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl DatasetBuilder {
    /// Start a dataset with the given name and columns
    pub fn new<S: Into<String>>(name: S, columns: &[&str]) -> Self {
        DatasetBuilder {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row given in column order
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let row = self
            .columns
            .iter()
            .cloned()
            .zip(values.into_iter().map(Into::into))
            .collect();
        self.rows.push(row);
        self
    }

    /// Build and validate the dataset
    pub fn build(self) -> Result<Dataset> {
        Dataset::new(self.name, self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        DatasetBuilder::new("sample", &["x", "kind", "y"])
            .row([Value::from(1.0), Value::from("a"), Value::from(2.0)])
            .row([Value::from(2.0), Value::from("b"), Value::from(4.0)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse(" 3.5 "), Value::Number(3.5));
        assert_eq!(Value::parse("hills"), Value::Category("hills".to_string()));
        assert_eq!(Value::parse("NaN"), Value::Category("NaN".to_string()));
        assert_eq!(Value::Number(1.0).label(), "1");
        assert_eq!(Value::Number(1.5).label(), "1.5");
    }

    #[test]
    fn test_numeric_columns() {
        let ds = sample();
        assert_eq!(ds.numeric_columns(), vec!["x", "y"]);
        assert_eq!(ds.numeric_column("y").unwrap(), vec![2.0, 4.0]);
        assert!(ds.numeric_column("kind").is_err());
        assert!(ds.numeric_column("missing").is_err());
        assert_eq!(ds.feature_columns("y"), vec!["x", "kind"]);
    }

    #[test]
    fn test_column_mismatch_rejected() {
        let mut row = Row::new();
        row.insert("x".to_string(), Value::Number(1.0));
        let result = Dataset::new("bad", vec!["x".to_string(), "y".to_string()], vec![row]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = Dataset::new("dup", vec!["x".to_string(), "x".to_string()], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_dataset_has_no_numeric_columns() {
        let ds = DatasetBuilder::new("empty", &["x"]).build().unwrap();
        assert!(ds.is_empty());
        assert!(ds.numeric_columns().is_empty());
        assert_eq!(ds.head(5).len(), 0);
    }
}
