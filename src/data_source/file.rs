//! JSON file data source
//!
//! Reads an exported query result from disk. Both the `{columns, data}`
//! records shape and a bare array of row objects are accepted.

use super::{DataSource, InputTable};
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Data source backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileDataSource {
    path: PathBuf,
}

impl FileDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    async fn load_table(&self) -> Result<InputTable> {
        tracing::debug!("Reading input table from {:?}", self.path);
        let contents = fs::read_to_string(&self.path).await?;

        let table = InputTable::from_json_str(&contents).map_err(|e| Error::InputParse {
            file: self.path.clone(),
            message: e.to_string(),
        })?;

        tracing::info!(
            "Loaded {} rows and {} columns from {:?}",
            table.len(),
            table.columns.len(),
            self.path
        );
        Ok(table)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"columns": ["id", "source"], "data": [{{"id": "C1", "source": "google"}}]}}"#
        )
        .unwrap();

        let source = FileDataSource::new(file.path());
        let table = source.load_table().await.unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.has_column("source"));
    }

    #[tokio::test]
    async fn test_load_table_missing_file() {
        let source = FileDataSource::new("/nonexistent/touchpoints.json");
        let err = source.load_table().await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_load_table_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let source = FileDataSource::new(file.path());
        let err = source.load_table().await.unwrap_err();
        assert!(matches!(err, Error::InputParse { .. }));
    }
}
