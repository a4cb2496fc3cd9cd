//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::cli::{DataSourceType, InputArgs};
use crate::data_source::{InputTable, create_data_source};
use crate::{Config, Result};

/// Load the input table from the selected data source
async fn load_table(input: InputArgs) -> Result<InputTable> {
    let data_source = create_data_source(input.source, input.input)?;
    tracing::info!("Loading touchpoints from {}", data_source.describe());
    data_source.load_table().await
}

/// Analyze command implementation
pub mod analyze {
    use super::*;
    use crate::attribution::{self, AnalysisOptions, ColumnMapping};
    use crate::cli::{ColumnArgs, OutputFormat};
    use crate::data_source::mock;

    /// Column roles for a run: sample defaults, then config, then CLI flags
    pub fn resolve_mapping(
        source: DataSourceType,
        config: &ColumnMapping,
        overrides: ColumnArgs,
    ) -> ColumnMapping {
        let base = match source {
            DataSourceType::Sample => ColumnMapping::new(
                mock::SAMPLE_ID_COLUMN,
                mock::SAMPLE_CHANNEL_COLUMN,
                mock::SAMPLE_TIMESTAMP_COLUMN,
            )
            .with_first_click(mock::SAMPLE_FIRST_CLICK_COLUMN)
            .with_last_click(mock::SAMPLE_LAST_CLICK_COLUMN),
            DataSourceType::File => ColumnMapping::default(),
        };
        base.merged_with(config)
            .merged_with(&ColumnMapping::from(overrides))
    }

    /// Execute the analyze command
    pub async fn execute(
        input: InputArgs,
        columns: ColumnArgs,
        output_format: OutputFormat,
        config: Config,
    ) -> Result<()> {
        let mapping = resolve_mapping(input.source, &config.columns, columns);
        tracing::debug!("Column mapping: {:?}", mapping);

        let table = load_table(input).await?;
        let options = AnalysisOptions::from_config(&config);

        match output_format {
            OutputFormat::Json => {
                let outcome = attribution::run(&table, &mapping, &options);
                crate::cli::output::output_json(&mut std::io::stdout(), &outcome)?;
                if outcome.is_error() {
                    return Err(crate::Error::custom("attribution run failed"));
                }
            }
            OutputFormat::Table => {
                let analysis = attribution::run_pipeline(&table, &mapping, options.parallel)?;
                let structure = attribution::detect_pattern(&analysis.matrix);
                tracing::debug!("Journey structure: {:?}", structure);
                crate::cli::output::output_table(
                    &mut std::io::stdout(),
                    &analysis.report(&options.limits),
                    &structure,
                    &analysis.model_comparison(&options.limits),
                )?;
            }
            OutputFormat::Dot => {
                tracing::info!("Building transition graph for DOT output...");
                let paths = attribution::build_paths(&table, &mapping)?;
                let matrix = attribution::TransitionMatrix::from_paths(&paths);
                crate::cli::output::output_dot(&mut std::io::stdout(), &matrix)?;
            }
        }

        Ok(())
    }
}

/// Columns command implementation
pub mod columns {
    use super::*;

    /// Execute the columns command
    pub async fn execute(input: InputArgs) -> Result<()> {
        let table = load_table(input).await?;
        crate::cli::output::output_columns(&mut std::io::stdout(), &table)
    }
}
