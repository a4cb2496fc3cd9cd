//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Configuration files (TOML)
//! - Defaults

use crate::attribution::ColumnMapping;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub columns: ColumnMapping,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Result truncation limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum number of channel attribution records
    #[serde(default = "default_attribution_limit")]
    pub attribution_limit: usize,

    /// Maximum number of path records
    #[serde(default = "default_path_limit")]
    pub path_limit: usize,

    /// Maximum number of channel pair records
    #[serde(default = "default_pair_limit")]
    pub pair_limit: usize,
}

/// Attribution engine settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Run the per-channel removal loop on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_attribution_limit() -> usize {
    15
}

fn default_path_limit() -> usize {
    10
}

fn default_pair_limit() -> usize {
    10
}

fn default_parallel() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            attribution_limit: default_attribution_limit(),
            path_limit: default_path_limit(),
            pair_limit: default_pair_limit(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./markov-attribution.toml
    /// 2. ~/.markov-attribution/config.toml
    /// 3. /etc/markov-attribution/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("markov-attribution.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".markov-attribution").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/markov-attribution/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.attribution_limit, 15);
        assert_eq!(config.output.path_limit, 10);
        assert_eq!(config.output.pair_limit, 10);
        assert!(config.engine.parallel);
        assert_eq!(config.logging.level, "info");
        assert!(config.columns.id.is_none());
        assert!(config.columns.first_click.is_none());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[columns]
id = "conversion_id"
channel = "source_medium"
timestamp = "interaction_datetime"
last_click = "is_last"

[output]
path_limit = 5

[engine]
parallel = false

[logging]
level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.columns.id.as_deref(), Some("conversion_id"));
        assert_eq!(config.columns.channel.as_deref(), Some("source_medium"));
        assert_eq!(config.columns.last_click.as_deref(), Some("is_last"));
        assert!(config.columns.first_click.is_none());
        assert_eq!(config.output.path_limit, 5);
        assert_eq!(config.output.attribution_limit, 15);
        assert!(!config.engine.parallel);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[columns]\nchannel = \"source\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.columns.channel.as_deref(), Some("source"));
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[columns\nchannel = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
