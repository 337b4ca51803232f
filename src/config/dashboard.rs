//! Runtime settings of the dashboard engine.
//!
//! Settings load from `.json` or `.toml` files and from `FOREST_LAB_*`
//! environment variables.

use crate::core::constants::*;
use crate::core::error::{ForestLabError, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Dashboard engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Debounce window for coalescing edits, in milliseconds
    pub debounce_delay_ms: u64,
    /// Artificial latency of each mock training call, in milliseconds
    pub training_delay_ms: u64,
    /// Probability that a tuned run fails
    pub failure_probability: f64,
    /// Rows in the fabricated prediction history
    pub history_rows: usize,
    /// Histogram bin count
    pub histogram_bins: usize,
    /// Initial held-out fraction
    pub default_test_size: f64,
    /// Seed for the mock trainer (`None` draws from entropy)
    pub random_seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            debounce_delay_ms: DEFAULT_DEBOUNCE_DELAY_MS,
            training_delay_ms: DEFAULT_TRAINING_DELAY_MS,
            failure_probability: DEFAULT_FAILURE_PROBABILITY,
            history_rows: DEFAULT_HISTORY_ROWS,
            histogram_bins: DEFAULT_NUM_BINS,
            default_test_size: DEFAULT_TEST_SIZE,
            random_seed: None,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Debounce window as a [`Duration`]
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    /// Training latency as a [`Duration`]
    pub fn training_delay(&self) -> Duration {
        Duration::from_millis(self.training_delay_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(ForestLabError::invalid_parameter(
                "failure_probability",
                self.failure_probability.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }

        if self.history_rows == 0 {
            return Err(ForestLabError::invalid_parameter(
                "history_rows",
                self.history_rows.to_string(),
                "must be at least 1",
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ForestLabError::invalid_parameter(
                "histogram_bins",
                self.histogram_bins.to_string(),
                "must be at least 1",
            ));
        }

        validate_test_size(self.default_test_size)?;
        Ok(())
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ForestLabError::config(format!("Failed to read config file: {}", e)))?;

        let config: DashboardConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(ForestLabError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        log::debug!("Loaded dashboard configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => {
                return Err(ForestLabError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from environment variables, starting from defaults
    pub fn load_from_environment() -> Result<Self> {
        let mut config = DashboardConfig::default();
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Apply `FOREST_LAB_*` overrides to this configuration
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("FOREST_LAB_DEBOUNCE_DELAY_MS")? {
            self.debounce_delay_ms = val;
        }
        if let Some(val) = env_var("FOREST_LAB_TRAINING_DELAY_MS")? {
            self.training_delay_ms = val;
        }
        if let Some(val) = env_var("FOREST_LAB_FAILURE_PROBABILITY")? {
            self.failure_probability = val;
        }
        if let Some(val) = env_var("FOREST_LAB_HISTORY_ROWS")? {
            self.history_rows = val;
        }
        if let Some(val) = env_var("FOREST_LAB_HISTOGRAM_BINS")? {
            self.histogram_bins = val;
        }
        if let Some(val) = env_var("FOREST_LAB_TEST_SIZE")? {
            self.default_test_size = val;
        }
        if let Some(val) = env_var("FOREST_LAB_RANDOM_SEED")? {
            self.random_seed = Some(val);
        }

        self.validate()
    }
}

/// Held-out fraction must leave rows on both sides. NaN is rejected.
pub fn validate_test_size(test_size: f64) -> Result<()> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ForestLabError::invalid_parameter(
            "test_size",
            test_size.to_string(),
            "must be in range (0.0, 1.0)",
        ));
    }
    Ok(())
}

fn env_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map(Some)
            .map_err(|_| ForestLabError::config(format!("Invalid {}", key))),
        Err(_) => Ok(None),
    }
}

/// Builder pattern for dashboard configuration
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    config: DashboardConfig,
}

impl DashboardConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce window
    pub fn debounce_delay_ms(mut self, ms: u64) -> Self {
        self.config.debounce_delay_ms = ms;
        self
    }

    /// Set the artificial training latency
    pub fn training_delay_ms(mut self, ms: u64) -> Self {
        self.config.training_delay_ms = ms;
        self
    }

    /// Set the tuned-run failure probability
    pub fn failure_probability(mut self, p: f64) -> Self {
        self.config.failure_probability = p;
        self
    }

    /// Set the history length
    pub fn history_rows(mut self, rows: usize) -> Self {
        self.config.history_rows = rows;
        self
    }

    /// Set the histogram bin count
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.config.histogram_bins = bins;
        self
    }

    /// Set the initial test fraction
    pub fn default_test_size(mut self, test_size: f64) -> Self {
        self.config.default_test_size = test_size;
        self
    }

    /// Fix the mock trainer seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
