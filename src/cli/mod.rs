//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::attribution::ColumnMapping;
use crate::{Config, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// Markov removal-effect attribution CLI
#[derive(Parser, Debug)]
#[command(name = "markov-attribution")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (overrides config; RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute channel attribution from a touchpoint table
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// List the columns of a touchpoint table
    Columns {
        #[command(flatten)]
        input: InputArgs,
    },
}

/// Where the touchpoint table comes from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Data source type
    #[arg(short, long, value_enum, default_value = "file")]
    pub source: DataSourceType,

    /// Path to a JSON table (`{columns, data}` or an array of rows)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Column role overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ColumnArgs {
    /// Conversion identifier column
    #[arg(long)]
    pub id_col: Option<String>,

    /// Channel (source/medium) column
    #[arg(long)]
    pub channel_col: Option<String>,

    /// Event timestamp column
    #[arg(long)]
    pub date_col: Option<String>,

    /// First click flag column
    #[arg(long)]
    pub first_click_col: Option<String>,

    /// Last click flag column
    #[arg(long)]
    pub last_click_col: Option<String>,

    /// Post click flag column
    #[arg(long)]
    pub post_click_col: Option<String>,
}

impl From<ColumnArgs> for ColumnMapping {
    fn from(args: ColumnArgs) -> Self {
        ColumnMapping {
            id: args.id_col,
            channel: args.channel_col,
            timestamp: args.date_col,
            first_click: args.first_click_col,
            last_click: args.last_click_col,
            post_click: args.post_click_col,
        }
    }
}

/// Data source types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataSourceType {
    /// JSON file on disk
    File,
    /// Built-in sample journeys
    Sample,
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON report (or `{"error": ...}`)
    Json,
    /// Plain text tables
    Table,
    /// Transition graph in DOT format (Graphviz)
    Dot,
}

/// Execute the CLI command
pub async fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Analyze {
            input,
            columns,
            output,
        } => commands::analyze::execute(input, columns, output, config).await,
        Commands::Columns { input } => commands::columns::execute(input).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "markov-attribution",
            "analyze",
            "--input",
            "touchpoints.json",
            "--id-col",
            "conversion_id",
            "--channel-col",
            "source_medium",
            "--date-col",
            "interaction_datetime",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                input,
                columns,
                output,
            } => {
                assert_eq!(input.source, DataSourceType::File);
                assert_eq!(input.input, Some(PathBuf::from("touchpoints.json")));
                assert_eq!(output, OutputFormat::Json);

                let mapping = ColumnMapping::from(columns);
                assert_eq!(mapping.id.as_deref(), Some("conversion_id"));
                assert_eq!(mapping.timestamp.as_deref(), Some("interaction_datetime"));
                assert!(mapping.first_click.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_columns_command_with_sample() {
        let cli = Cli::try_parse_from([
            "markov-attribution",
            "--log-level",
            "debug",
            "columns",
            "--source",
            "sample",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Commands::Columns {
                input: InputArgs {
                    source: DataSourceType::Sample,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_output() {
        let cli = Cli::try_parse_from(["markov-attribution", "analyze", "--output", "tui"]);
        assert!(cli.is_err());
    }
}
