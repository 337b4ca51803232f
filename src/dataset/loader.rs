//! CSV loading for dashboard datasets.
//!
//! Fields that parse as finite numbers become [`Value::Number`]; everything
//! else is kept as a [`Value::Category`].

use crate::core::error::{ForestLabError, Result};
use crate::dataset::dataset::{Dataset, Row, Value};
use crate::dataset_error;

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: char,
    /// Quote character
    pub quote_char: char,
    /// Comment character
    pub comment_char: Option<char>,
    /// Maximum number of rows to read
    pub max_rows: Option<usize>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: ',',
            quote_char: '"',
            comment_char: None,
            max_rows: None,
        }
    }
}

/// CSV data loader. The first record is always the header row.
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    csv_config: CsvConfig,
}

impl CsvLoader {
    /// Create a loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom settings
    pub fn with_csv_config(mut self, csv_config: CsvConfig) -> Self {
        self.csv_config = csv_config;
        self
    }

    /// Set delimiter character
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.csv_config.delimiter = delimiter;
        self
    }

    /// Set maximum rows to read
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.csv_config.max_rows = Some(max_rows);
        self
    }

    /// Load a CSV file; the dataset is named after the file stem
    pub fn load_csv<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        log::info!("Loading CSV file: {}", path.display());

        if !path.is_file() {
            return Err(ForestLabError::dataset(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset")
            .to_string();
        let file = File::open(path)?;
        self.load_from_reader(name, file)
    }

    /// Load CSV data from any reader
    pub fn load_from_reader<R: Read>(&self, name: impl Into<String>, reader: R) -> Result<Dataset> {
        let name = name.into();
        let delimiter = ascii_byte("delimiter", self.csv_config.delimiter)?;
        let quote = ascii_byte("quote character", self.csv_config.quote_char)?;
        let comment = self
            .csv_config
            .comment_char
            .map(|c| ascii_byte("comment character", c))
            .transpose()?;
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(quote)
            .comment(comment)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(ForestLabError::dataset(format!(
                "CSV input for '{}' has no header row",
                name
            )));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            if let Some(max) = self.csv_config.max_rows {
                if rows.len() >= max {
                    break;
                }
            }
            rows.push(parse_record(&columns, &record?));
        }

        log::debug!(
            "Parsed dataset '{}': {} rows, {} columns",
            name,
            rows.len(),
            columns.len()
        );
        Dataset::new(name, columns, rows)
    }
}

/// Load a CSV dataset from a reader with default settings
pub fn load_csv_dataset<R: Read>(name: impl Into<String>, reader: R) -> Result<Dataset> {
    CsvLoader::new().load_from_reader(name, reader)
}

/// The csv reader works on single bytes
fn ascii_byte(role: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(dataset_error!("CSV {} '{}' is not an ASCII character", role, c))
    }
}

fn parse_record(columns: &[String], record: &StringRecord) -> Row {
    columns
        .iter()
        .zip(record.iter())
        .map(|(column, field)| (column.clone(), Value::parse(field)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_reader() {
        let data = "a,b,label\n1,x,0\n2.5,y,1\n";
        let ds = CsvLoader::new().load_from_reader("inline", data.as_bytes()).unwrap();
        assert_eq!(ds.name(), "inline");
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.numeric_columns(), vec!["a", "label"]);
        assert_eq!(ds.rows()[1]["b"], Value::Category("y".to_string()));
    }

    #[test]
    fn test_ragged_rows_fail() {
        let data = "a,b\n1,2\n3\n";
        assert!(CsvLoader::new().load_from_reader("ragged", data.as_bytes()).is_err());
    }

    #[test]
    fn test_max_rows_and_delimiter() {
        let data = "a;b\n1;2\n3;4\n5;6\n";
        let ds = CsvLoader::new()
            .with_delimiter(';')
            .with_max_rows(2)
            .load_from_reader("semi", data.as_bytes())
            .unwrap();
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.numeric_column("b").unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_non_ascii_delimiters_rejected() {
        let data = "a,b\n1,2\n";
        let err = CsvLoader::new()
            .with_delimiter('¦')
            .load_from_reader("wide", data.as_bytes())
            .unwrap_err();
        assert_eq!(err.category(), "dataset");

        let config = CsvConfig {
            comment_char: Some('§'),
            ..CsvConfig::default()
        };
        assert!(CsvLoader::new()
            .with_csv_config(config)
            .load_from_reader("wide", data.as_bytes())
            .is_err());
    }

    #[test]
    fn test_load_csv_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.csv");
        std::fs::write(&path, "x,y\n1,2\n").unwrap();
        let ds = CsvLoader::new().load_csv(&path).unwrap();
        assert_eq!(ds.name(), "scores");

        assert!(CsvLoader::new().load_csv(dir.path().join("missing.csv")).is_err());
    }
}
