//! Attribution module - Markov removal-effect attribution over conversion paths
//!
//! Pipeline: table -> paths -> transition matrix -> removal effects ->
//! attribution weights -> path and pair aggregates -> report.

use crate::config::{Config, OutputConfig};
use crate::data_source::InputTable;
use crate::Result;
use std::collections::BTreeMap;

pub mod analytics;
pub mod analyzer;
pub mod engine;
pub mod heuristic;
pub mod path;
pub mod report;
pub mod solver;
pub mod touchpoint;
pub mod transition;

// Re-export key types
pub use analytics::{PairAggregate, PathAggregate, aggregate_pairs, aggregate_paths};
pub use analyzer::{JourneyPattern, JourneyStructure, detect_pattern};
pub use engine::{AttributionEngine, AttributionResult, AttributionWeights};
pub use heuristic::{ModelComparison, TouchModel, TouchShares, compare_models};
pub use path::{ConversionPath, PATH_SEPARATOR, PathBuilder, build_paths};
pub use report::{AnalysisOutcome, AttributionReport, ChannelAttribution, Summary};
pub use solver::{Absorption, AbsorptionSolver};
pub use touchpoint::{ColumnMapping, ColumnRole, Touchpoint};
pub use transition::{CONVERSION_LABEL, State, TransitionMatrix};

/// Knobs for one pipeline run
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub limits: OutputConfig,
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AnalysisOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            limits: config.output,
            parallel: config.engine.parallel,
        }
    }
}

/// Every intermediate product of a run, untruncated
#[derive(Debug, Clone)]
pub struct Analysis {
    pub paths: Vec<ConversionPath>,
    pub matrix: TransitionMatrix,
    pub attribution: AttributionResult,
    pub path_aggregates: Vec<PathAggregate>,
    pub pair_aggregates: Vec<PairAggregate>,
    pub first_click: TouchShares,
    pub last_click: TouchShares,
    pub post_click_touches: BTreeMap<String, usize>,
}

impl Analysis {
    /// Truncated report for presentation
    pub fn report(&self, limits: &OutputConfig) -> AttributionReport {
        AttributionReport::new(
            &self.attribution,
            &self.path_aggregates,
            &self.pair_aggregates,
            self.paths.len(),
            limits,
        )
    }

    /// Data-driven weights next to first-click and last-click shares
    pub fn model_comparison(&self, limits: &OutputConfig) -> Vec<ModelComparison> {
        let mut rows = compare_models(
            &self.attribution.weights,
            &self.first_click,
            &self.last_click,
            &self.post_click_touches,
        );
        rows.truncate(limits.attribution_limit);
        rows
    }
}

/// Run the full pipeline and keep every intermediate result
pub fn run_pipeline(
    table: &InputTable,
    mapping: &ColumnMapping,
    parallel: bool,
) -> Result<Analysis> {
    tracing::info!("Building conversion paths from {} rows", table.len());
    let paths = build_paths(table, mapping)?;

    let matrix = TransitionMatrix::from_paths(&paths);

    tracing::info!("Computing removal effects");
    let attribution = AttributionEngine::new()
        .with_parallel(parallel)
        .run(&matrix, &paths);

    let path_aggregates = aggregate_paths(&paths, &attribution.weights);
    let pair_aggregates = aggregate_pairs(&path_aggregates);

    let first_click = TouchShares::compute(TouchModel::FirstClick, &paths);
    let last_click = TouchShares::compute(TouchModel::LastClick, &paths);
    let post_click_touches = heuristic::post_click_touches(&paths);

    tracing::info!(
        "Attributed {} paths across {} channels (base conversion probability {:.4})",
        paths.len(),
        attribution.weights.len(),
        attribution.base_conversion_probability
    );

    Ok(Analysis {
        paths,
        matrix,
        attribution,
        path_aggregates,
        pair_aggregates,
        first_click,
        last_click,
        post_click_touches,
    })
}

/// Analyze a table into a truncated report
pub fn analyze(
    table: &InputTable,
    mapping: &ColumnMapping,
    options: &AnalysisOptions,
) -> Result<AttributionReport> {
    let analysis = run_pipeline(table, mapping, options.parallel)?;
    Ok(analysis.report(&options.limits))
}

/// Engine boundary: never fails, errors become `{ "error": message }`
pub fn run(
    table: &InputTable,
    mapping: &ColumnMapping,
    options: &AnalysisOptions,
) -> AnalysisOutcome {
    let outcome = AnalysisOutcome::from(analyze(table, mapping, options));
    if let AnalysisOutcome::Failed { error } = &outcome {
        tracing::error!("Attribution run failed: {}", error);
    }
    outcome
}
