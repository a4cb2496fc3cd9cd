//! Result bundle handed to presentation and export layers

use super::analytics::{PairAggregate, PathAggregate};
use super::engine::AttributionResult;
use crate::config::OutputConfig;
use crate::Error;
use serde::Serialize;

/// One ranked channel record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAttribution {
    pub channel: String,
    pub attribution_weight: f64,
}

/// Run-level counts and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub path_count: usize,
    pub channel_count: usize,
    pub base_conversion_probability: f64,
}

/// Ranked attribution, path and pair tables plus summary counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionReport {
    pub attribution: Vec<ChannelAttribution>,
    pub paths: Vec<PathAggregate>,
    pub pairs: Vec<PairAggregate>,
    pub summary: Summary,
}

impl AttributionReport {
    /// Assemble the report, truncating each ranked table to its limit
    pub fn new(
        result: &AttributionResult,
        paths: &[PathAggregate],
        pairs: &[PairAggregate],
        path_count: usize,
        limits: &OutputConfig,
    ) -> Self {
        let attribution = result
            .weights
            .ranked()
            .into_iter()
            .take(limits.attribution_limit)
            .map(|(channel, weight)| ChannelAttribution {
                channel: channel.to_string(),
                attribution_weight: weight,
            })
            .collect();

        Self {
            attribution,
            paths: paths.iter().take(limits.path_limit).cloned().collect(),
            pairs: pairs.iter().take(limits.pair_limit).cloned().collect(),
            summary: Summary {
                path_count,
                channel_count: result.weights.len(),
                base_conversion_probability: result.base_conversion_probability,
            },
        }
    }
}

/// All-or-nothing outcome of one run: the report or `{ "error": message }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(AttributionReport),
    Failed { error: String },
}

impl AnalysisOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutcome::Failed { .. })
    }

    pub fn report(&self) -> Option<&AttributionReport> {
        match self {
            AnalysisOutcome::Report(report) => Some(report),
            AnalysisOutcome::Failed { .. } => None,
        }
    }
}

impl From<crate::Result<AttributionReport>> for AnalysisOutcome {
    fn from(result: crate::Result<AttributionReport>) -> Self {
        match result {
            Ok(report) => AnalysisOutcome::Report(report),
            Err(err) => AnalysisOutcome::from(err),
        }
    }
}

impl From<Error> for AnalysisOutcome {
    fn from(err: Error) -> Self {
        AnalysisOutcome::Failed {
            error: err.to_string(),
        }
    }
}
