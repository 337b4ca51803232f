//! Dataset management module for Forest Lab.
//!
//! Datasets are loaded once per task selection and shared read-only as
//! `Arc<Dataset>` between the controller, the trainer and the statistics
//! functions.

pub mod bundled;
pub mod dataset;
pub mod loader;

pub use bundled::{BundledDataset, BundledDatasetProvider, DatasetProvider, DIABETES, HOUSING};
pub use dataset::{Dataset, DatasetBuilder, Row, Value};
pub use loader::{load_csv_dataset, CsvConfig, CsvLoader};
