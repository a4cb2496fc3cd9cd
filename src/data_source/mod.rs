//! Data source module - Abstraction for acquiring the touchpoint table
//!
//! This module provides a trait-based abstraction for loading the rectangular
//! input table from multiple sources (exported JSON files, built-in sample data).

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub mod file;
pub mod mock;
pub mod models;

use crate::cli::DataSourceType;
pub use models::{InputTable, Row};

/// Data source trait for loading touchpoint tables
///
/// Implementations provide different backends:
/// - `FileDataSource`: Reads a JSON export from disk
/// - `SampleDataSource`: Provides hardcoded demo journeys
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load the full input table
    async fn load_table(&self) -> Result<InputTable>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// Create a data source instance based on type
pub fn create_data_source(
    source_type: DataSourceType,
    input: Option<PathBuf>,
) -> Result<Box<dyn DataSource>> {
    match source_type {
        DataSourceType::File => {
            let path = input.ok_or_else(|| {
                Error::data_source("--input is required when reading from a file")
            })?;
            Ok(Box::new(file::FileDataSource::new(path)))
        }
        DataSourceType::Sample => Ok(Box::new(mock::SampleDataSource::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_requires_input() {
        let err = create_data_source(DataSourceType::File, None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::DataSource(_)));
    }

    #[test]
    fn test_create_sources() {
        let ds = create_data_source(DataSourceType::File, Some("paths.json".into())).unwrap();
        assert_eq!(ds.describe(), "file paths.json");

        let ds = create_data_source(DataSourceType::Sample, None).unwrap();
        assert_eq!(ds.describe(), "built-in sample");
    }
}
