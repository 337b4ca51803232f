//! Error handling and error types for Forest Lab.
//!
//! Every fallible operation in the crate returns [`Result`]. Failures are
//! recovered locally by the dashboard (slot reset, fallback text, zeroed
//! statistics); nothing in this crate is fatal to the process.

use std::io;
use thiserror::Error;

/// Main error type for the Forest Lab library.
#[derive(Error, Debug)]
pub enum ForestLabError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Dataset-related errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Training-related errors (including simulated failures)
    #[error("Training error: {message}")]
    Training { message: String },

    /// Aggregation of per-tree predictions failed
    #[error("Aggregation error: {message}")]
    Aggregation { message: String },

    /// Insight or explanation generation failed
    #[error("Insight generation error: {message}")]
    Insight { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[error("CSV parsing error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML parsing error: {source}")]
    TomlDe {
        #[from]
        source: toml::de::Error,
    },

    /// TOML serialization errors
    #[error("TOML serialization error: {source}")]
    TomlSer {
        #[from]
        source: toml::ser::Error,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Dataset construction and lookup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Empty dataset provided")]
    Empty,

    #[error("Row {row} has columns {actual:?}, expected {expected:?}")]
    ColumnMismatch {
        row: usize,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Column {name} is not numeric")]
    NotNumeric { name: String },

    #[error("Duplicate column name: {name}")]
    DuplicateColumn { name: String },
}

/// Type alias for Results using ForestLabError
pub type Result<T> = std::result::Result<T, ForestLabError>;

impl ForestLabError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ForestLabError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        ForestLabError::Dataset {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        ForestLabError::Training {
            message: message.into(),
        }
    }

    /// Create an aggregation error
    pub fn aggregation<S: Into<String>>(message: S) -> Self {
        ForestLabError::Aggregation {
            message: message.into(),
        }
    }

    /// Create an insight generation error
    pub fn insight<S: Into<String>>(message: S) -> Self {
        ForestLabError::Insight {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        ForestLabError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        ForestLabError::Internal {
            message: message.into(),
        }
    }

    /// Whether the dashboard can carry on after this error by resetting
    /// local state.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ForestLabError::Config { .. } => false,
            ForestLabError::Dataset { .. } => false,
            ForestLabError::Training { .. } => true,
            ForestLabError::Aggregation { .. } => true,
            ForestLabError::Insight { .. } => true,
            ForestLabError::IO { .. } => false,
            ForestLabError::Csv { .. } => false,
            ForestLabError::Json { .. } => false,
            ForestLabError::TomlDe { .. } => false,
            ForestLabError::TomlSer { .. } => false,
            ForestLabError::InvalidParameter { .. } => false,
            ForestLabError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ForestLabError::Config { .. } => "config",
            ForestLabError::Dataset { .. } => "dataset",
            ForestLabError::Training { .. } => "training",
            ForestLabError::Aggregation { .. } => "aggregation",
            ForestLabError::Insight { .. } => "insight",
            ForestLabError::IO { .. } => "io",
            ForestLabError::Csv { .. } => "csv",
            ForestLabError::Json { .. } => "json",
            ForestLabError::TomlDe { .. } => "toml",
            ForestLabError::TomlSer { .. } => "toml",
            ForestLabError::InvalidParameter { .. } => "invalid_parameter",
            ForestLabError::Internal { .. } => "internal",
        }
    }
}

impl From<DatasetError> for ForestLabError {
    fn from(err: DatasetError) -> Self {
        ForestLabError::Dataset {
            message: err.to_string(),
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::ForestLabError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::ForestLabError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! dataset_error {
    ($msg:expr) => {
        $crate::core::error::ForestLabError::dataset($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::ForestLabError::dataset(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! training_error {
    ($msg:expr) => {
        $crate::core::error::ForestLabError::training($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::ForestLabError::training(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ForestLabError::config("test configuration error");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());

        let err = ForestLabError::training("Model training failed");
        assert_eq!(err.category(), "training");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("test error");
        assert!(matches!(err, ForestLabError::Config { .. }));

        let err = dataset_error!("bad column: {}", "price");
        assert!(matches!(err, ForestLabError::Dataset { .. }));
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_dataset_error_conversion() {
        let err: ForestLabError = DatasetError::UnknownColumn {
            name: "sqft".to_string(),
        }
        .into();
        assert!(matches!(err, ForestLabError::Dataset { .. }));
        assert!(err.to_string().contains("sqft"));
    }

    #[test]
    fn test_parameter_errors() {
        let err = ForestLabError::invalid_parameter("n_estimators", "0", "must be at least 1");
        assert_eq!(err.category(), "invalid_parameter");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: n_estimators = 0, must be at least 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ForestLabError = io_err.into();
        assert!(matches!(err, ForestLabError::IO { .. }));
        assert_eq!(err.category(), "io");
    }
}
