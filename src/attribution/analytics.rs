//! Path and channel-pair value aggregation
//!
//! Paths are scored by the attribution weight of every channel they visit and
//! grouped by signature. Aggregated paths are then broken into adjacent
//! channel pairs.

use super::engine::AttributionWeights;
use super::path::ConversionPath;
use serde::Serialize;
use std::collections::BTreeMap;

/// One row per distinct path signature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathAggregate {
    pub path_signature: String,
    pub order_count: usize,
    pub mean_score: f64,
    pub mean_path_length: f64,
    pub value: f64,
    #[serde(skip)]
    pub channels: Vec<String>,
}

/// One row per adjacent (source, destination) channel pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairAggregate {
    pub source: String,
    pub destination: String,
    pub total_value: f64,
    pub frequency: usize,
}

/// Sum of weights over the path's channels; repeat visits count every time
pub fn path_score(path: &ConversionPath, weights: &AttributionWeights) -> f64 {
    path.channels().map(|c| weights.get(c)).sum()
}

#[derive(Default)]
struct PathGroup {
    channels: Vec<String>,
    count: usize,
    score_sum: f64,
    length_sum: usize,
}

/// Group paths by signature and rank by value (count x mean score), descending.
///
/// Groups are formed in signature order; equal values keep that order.
pub fn aggregate_paths(
    paths: &[ConversionPath],
    weights: &AttributionWeights,
) -> Vec<PathAggregate> {
    let mut groups: BTreeMap<String, PathGroup> = BTreeMap::new();
    for path in paths {
        let group = groups.entry(path.signature()).or_insert_with(|| PathGroup {
            channels: path.channels().map(str::to_string).collect(),
            ..Default::default()
        });
        group.count += 1;
        group.score_sum += path_score(path, weights);
        group.length_sum += path.len();
    }

    let mut aggregates: Vec<PathAggregate> = groups
        .into_iter()
        .map(|(signature, group)| {
            let count = group.count as f64;
            let mean_score = group.score_sum / count;
            PathAggregate {
                path_signature: signature,
                order_count: group.count,
                mean_score,
                mean_path_length: group.length_sum as f64 / count,
                value: count * mean_score,
                channels: group.channels,
            }
        })
        .collect();

    aggregates.sort_by(|a, b| b.value.total_cmp(&a.value));
    tracing::debug!("Aggregated {} distinct paths", aggregates.len());
    aggregates
}

/// Sum value and order count per adjacent channel pair, ranked by value descending.
///
/// Single-channel paths contribute nothing; no multi-hop paths yields an empty list.
pub fn aggregate_pairs(paths: &[PathAggregate]) -> Vec<PairAggregate> {
    let mut groups: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for aggregate in paths {
        for pair in aggregate.channels.windows(2) {
            let entry = groups
                .entry((pair[0].as_str(), pair[1].as_str()))
                .or_insert((0.0, 0));
            entry.0 += aggregate.value;
            entry.1 += aggregate.order_count;
        }
    }

    let mut pairs: Vec<PairAggregate> = groups
        .into_iter()
        .map(|((source, destination), (total_value, frequency))| PairAggregate {
            source: source.to_string(),
            destination: destination.to_string(),
            total_value,
            frequency,
        })
        .collect();

    pairs.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    tracing::debug!("Aggregated {} channel pairs", pairs.len());
    pairs
}
