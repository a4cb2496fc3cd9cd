//! This module defines all error types used throughout the application.

use crate::attribution::ColumnRole;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A required column role is unmapped or absent from the input table
    #[error("Missing column for {role}: '{column}' is unset or absent from the input table")]
    MissingColumn { role: ColumnRole, column: String },

    /// Unexpected failure while building paths, the transition matrix or solving
    #[error("Computation error: {0}")]
    Computation(String),

    /// Data source errors
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Input file parsing errors
    #[error("Parser error: {0}")]
    Parser(String),

    /// Input file parsing errors with file context
    #[error("Failed to parse input table {file:?}: {message}")]
    InputParse { file: PathBuf, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a missing column error for a role, naming the mapped column if any
    pub fn missing_column(role: ColumnRole, column: Option<&str>) -> Self {
        Self::MissingColumn {
            role,
            column: column.unwrap_or("<unset>").to_string(),
        }
    }

    /// Create a computation error
    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    /// Create a data source error
    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::DataSource(msg.into())
    }
}

// Implement From traits for common external error types

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parser(format!("JSON error: {}", err))
    }
}
