//! Pure statistics over datasets and trainer outputs.
//!
//! Everything here is a side-effect-free function of its inputs. Degenerate
//! inputs (empty columns, zero variance) produce zeroed or empty results
//! instead of errors.

pub mod cache;
pub mod correlation;
pub mod histogram;
pub mod summary;

pub use cache::{CacheStats, StatsCache, StatsKey};
pub use correlation::{correlation_matrix, pearson, CorrelationMatrix, CorrelationPair};
pub use histogram::{default_histogram, histogram, HistogramBin};
pub use summary::{
    class_counts, mean, median, population_std_dev, sample_std_dev, summarize, summarize_column,
    ColumnSummary, DatasetSummary,
};
