//! The two datasets shipped with the dashboard, one per task.

use crate::core::error::Result;
use crate::core::types::TaskType;
use crate::dataset::dataset::Dataset;
use crate::dataset::loader::CsvLoader;

use std::sync::Arc;

const HOUSING_CSV: &str = include_str!("../../data/housing.csv");
const DIABETES_CSV: &str = include_str!("../../data/diabetes.csv");

/// Description of a bundled dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundledDataset {
    /// Dataset name
    pub name: &'static str,
    /// Task the dataset is meant for
    pub task: TaskType,
    /// Default target column
    pub target: &'static str,
    source: &'static str,
}

/// House prices, regression on `price`. Includes the categorical
/// `neighborhood` column.
pub const HOUSING: BundledDataset = BundledDataset {
    name: "housing",
    task: TaskType::Regression,
    target: "price",
    source: HOUSING_CSV,
};

/// Diabetes screening, binary classification on `outcome`.
pub const DIABETES: BundledDataset = BundledDataset {
    name: "diabetes",
    task: TaskType::Classification,
    target: "outcome",
    source: DIABETES_CSV,
};

impl BundledDataset {
    /// Bundled dataset for a task
    pub fn for_task(task: TaskType) -> Self {
        match task {
            TaskType::Regression => HOUSING,
            TaskType::Classification => DIABETES,
        }
    }

    /// Parse the embedded CSV
    pub fn load(&self) -> Result<Arc<Dataset>> {
        let dataset = CsvLoader::new().load_from_reader(self.name, self.source.as_bytes())?;
        log::info!(
            "Loaded bundled dataset '{}' ({} rows) for {}",
            self.name,
            dataset.num_rows(),
            self.task
        );
        Ok(Arc::new(dataset))
    }
}

/// Source of task datasets for the dashboard controller.
pub trait DatasetProvider: Send + Sync {
    /// Dataset and default target column for a task
    fn load(&self, task: TaskType) -> Result<(Arc<Dataset>, String)>;
}

/// Serves the embedded datasets
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledDatasetProvider;

impl DatasetProvider for BundledDatasetProvider {
    fn load(&self, task: TaskType) -> Result<(Arc<Dataset>, String)> {
        let bundled = BundledDataset::for_task(task);
        Ok((bundled.load()?, bundled.target.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_datasets_parse() {
        for task in [TaskType::Regression, TaskType::Classification] {
            let bundled = BundledDataset::for_task(task);
            let ds = bundled.load().unwrap();
            assert_eq!(ds.name(), bundled.name);
            assert!(ds.num_rows() >= 50);
            assert!(ds.is_numeric_column(bundled.target));
        }
    }

    #[test]
    fn test_housing_has_categorical_column() {
        let ds = HOUSING.load().unwrap();
        assert!(ds.has_column("neighborhood"));
        assert!(!ds.is_numeric_column("neighborhood"));
    }

    #[test]
    fn test_diabetes_target_is_binary() {
        let ds = DIABETES.load().unwrap();
        let targets = ds.numeric_column("outcome").unwrap();
        assert!(targets.iter().all(|&v| v == 0.0 || v == 1.0));
    }
}
