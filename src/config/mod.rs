//! Configuration management for Forest Lab.
//!
//! Two kinds of configuration live here: the random-forest
//! [`Hyperparameters`] a user edits in the sidebar, and the
//! [`DashboardConfig`] runtime settings (debounce window, training delay,
//! failure rate) the engine itself runs with.

pub mod core;
pub mod dashboard;
pub mod validation;

pub use self::core::{Hyperparameters, HyperparametersBuilder};
pub use dashboard::{validate_test_size, DashboardConfig, DashboardConfigBuilder};
pub use validation::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};

use crate::core::error::Result;
use std::path::Path;

/// Default settings file looked up by [`ConfigManager::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "forest_lab.toml";

/// Where the active settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// A settings file
    File(String),
    /// Environment variables layered on defaults
    Environment,
}

/// Loads dashboard settings and remembers their origin
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: DashboardConfig,
    source: ConfigSource,
}

impl ConfigManager {
    /// Manager holding default settings
    pub fn new() -> Self {
        ConfigManager {
            config: DashboardConfig::default(),
            source: ConfigSource::Default,
        }
    }

    /// Load settings from a file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = DashboardConfig::load_from_file(path)?;
        config.apply_environment_overrides()?;
        Ok(ConfigManager {
            config,
            source: ConfigSource::File(path.display().to_string()),
        })
    }

    /// Load settings from the environment only
    pub fn from_environment() -> Result<Self> {
        Ok(ConfigManager {
            config: DashboardConfig::load_from_environment()?,
            source: ConfigSource::Environment,
        })
    }

    /// Use [`DEFAULT_CONFIG_FILE`] in `dir` when present, the environment
    /// otherwise.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let candidate = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::from_file(candidate)
        } else {
            log::debug!(
                "{} not found, using environment settings",
                candidate.display()
            );
            Self::from_environment()
        }
    }

    /// Active settings
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Origin of the active settings
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Consume the manager, returning the settings
    pub fn into_config(self) -> DashboardConfig {
        self.config
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Configuration Summary:\n  Source: {:?}\n  Debounce: {} ms\n  Training delay: {} ms\n  Failure probability: {}\n  Histogram bins: {}",
            self.source,
            self.config.debounce_delay_ms,
            self.config.training_delay_ms,
            self.config.failure_probability,
            self.config.histogram_bins,
        )
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_manager_creation() {
        let manager = ConfigManager::new();
        assert!(matches!(manager.source(), ConfigSource::Default));
        assert_eq!(manager.config(), &DashboardConfig::default());
    }

    #[test]
    fn test_discover_prefers_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "training_delay_ms = 10\nrandom_seed = 3\n",
        )
        .unwrap();

        let manager = ConfigManager::discover(dir.path()).unwrap();
        assert!(matches!(manager.source(), ConfigSource::File(_)));
        assert_eq!(manager.config().random_seed, Some(3));
    }

    #[test]
    fn test_summary() {
        let summary = ConfigManager::new().summary();
        assert!(summary.contains("Configuration Summary"));
        assert!(summary.contains("Source: Default"));
        assert!(summary.contains("Debounce: 500 ms"));
    }
}
