//! Single-touch attribution models
//!
//! First-click and last-click credit, reported next to the removal-effect
//! weights for comparison. A path credits its flagged touch when one carries
//! the flag, otherwise its first (or last) touch.

use super::engine::AttributionWeights;
use super::path::ConversionPath;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchModel {
    FirstClick,
    LastClick,
}

impl TouchModel {
    pub fn display_name(&self) -> &'static str {
        match self {
            TouchModel::FirstClick => "First Click",
            TouchModel::LastClick => "Last Click",
        }
    }

    /// Channel credited for one path, and whether a flag picked it
    pub fn credited_channel<'p>(&self, path: &'p ConversionPath) -> (&'p str, bool) {
        let touchpoints = path.touchpoints();
        let flagged = match self {
            TouchModel::FirstClick => touchpoints.iter().find(|t| t.first_click),
            TouchModel::LastClick => touchpoints.iter().rev().find(|t| t.last_click),
        };
        match (flagged, self) {
            (Some(t), _) => (t.channel.as_str(), true),
            (None, TouchModel::FirstClick) => (path.first_touch(), false),
            (None, TouchModel::LastClick) => (path.last_touch(), false),
        }
    }
}

/// Share of paths credited to each channel under one single-touch model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchShares {
    shares: BTreeMap<String, f64>,
    flagged_paths: usize,
}

impl TouchShares {
    pub fn compute(model: TouchModel, paths: &[ConversionPath]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut flagged_paths = 0;
        for path in paths {
            let (channel, flagged) = model.credited_channel(path);
            *counts.entry(channel).or_default() += 1;
            if flagged {
                flagged_paths += 1;
            }
        }

        tracing::debug!(
            "{}: {} of {} paths credited through a flag",
            model.display_name(),
            flagged_paths,
            paths.len()
        );

        let total = paths.len() as f64;
        Self {
            shares: counts
                .into_iter()
                .map(|(channel, count)| (channel.to_string(), count as f64 / total))
                .collect(),
            flagged_paths,
        }
    }

    /// Share of a channel, zero when never credited
    pub fn get(&self, channel: &str) -> f64 {
        self.shares.get(channel).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.shares.iter().map(|(c, s)| (c.as_str(), *s))
    }

    pub fn total(&self) -> f64 {
        self.shares.values().sum()
    }

    /// Paths whose credit came from a flagged touch rather than position
    pub fn flagged_paths(&self) -> usize {
        self.flagged_paths
    }
}

/// Touchpoints flagged as post-click, per channel
pub fn post_click_touches(paths: &[ConversionPath]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for touchpoint in paths.iter().flat_map(|p| p.touchpoints()) {
        if touchpoint.post_click {
            *counts.entry(touchpoint.channel.clone()).or_default() += 1;
        }
    }
    counts
}

/// One channel's credit under every model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelComparison {
    pub channel: String,
    pub data_driven: f64,
    pub first_click: f64,
    pub last_click: f64,
    pub post_click_touches: usize,
}

/// Side-by-side credit per channel, in data-driven rank order
pub fn compare_models(
    weights: &AttributionWeights,
    first_click: &TouchShares,
    last_click: &TouchShares,
    post_click: &BTreeMap<String, usize>,
) -> Vec<ModelComparison> {
    weights
        .ranked()
        .into_iter()
        .map(|(channel, weight)| ModelComparison {
            channel: channel.to_string(),
            data_driven: weight,
            first_click: first_click.get(channel),
            last_click: last_click.get(channel),
            post_click_touches: post_click.get(channel).copied().unwrap_or(0),
        })
        .collect()
}
