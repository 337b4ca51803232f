//! Memoization of dataset statistics.
//!
//! Statistics are recomputed only when the (dataset, task, target) identity
//! changes. Presentation code asks the cache on every redraw.

use crate::core::types::TaskType;
use crate::dataset::Dataset;
use crate::stats::correlation::{correlation_matrix, CorrelationMatrix};
use crate::stats::summary::{summarize, DatasetSummary};

use std::collections::HashMap;
use std::sync::Arc;

/// Identity of a statistics computation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatsKey {
    /// Dataset name
    pub dataset: String,
    /// Row count, guards against two datasets sharing a name
    pub num_rows: usize,
    /// Task type
    pub task: TaskType,
    /// Target column
    pub target: String,
}

impl StatsKey {
    /// Key for a dataset/task/target combination
    pub fn new(dataset: &Dataset, task: TaskType, target: &str) -> Self {
        StatsKey {
            dataset: dataset.name().to_string(),
            num_rows: dataset.num_rows(),
            task,
            target: target.to_string(),
        }
    }
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: usize,
    /// Lookups that computed a fresh value
    pub misses: usize,
}

/// Memoized correlation matrices and dataset summaries
#[derive(Debug, Default)]
pub struct StatsCache {
    correlations: HashMap<StatsKey, Arc<CorrelationMatrix>>,
    summaries: HashMap<StatsKey, Arc<DatasetSummary>>,
    stats: CacheStats,
}

impl StatsCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Correlation matrix for the given identity
    pub fn correlation(
        &mut self,
        dataset: &Dataset,
        task: TaskType,
        target: &str,
    ) -> Arc<CorrelationMatrix> {
        let key = StatsKey::new(dataset, task, target);
        if let Some(hit) = self.correlations.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(hit);
        }
        self.stats.misses += 1;
        let matrix = Arc::new(correlation_matrix(dataset, task, target));
        self.correlations.insert(key, Arc::clone(&matrix));
        matrix
    }

    /// Dataset summary for the given identity
    pub fn summary(&mut self, dataset: &Dataset, task: TaskType, target: &str) -> Arc<DatasetSummary> {
        let key = StatsKey::new(dataset, task, target);
        if let Some(hit) = self.summaries.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(hit);
        }
        self.stats.misses += 1;
        let summary = Arc::new(summarize(dataset, target, task));
        self.summaries.insert(key, Arc::clone(&summary));
        summary
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every cached value
    pub fn clear(&mut self) {
        self.correlations.clear();
        self.summaries.clear();
    }
}
