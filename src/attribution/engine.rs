//! Removal-effect attribution
//!
//! Runs the absorption solver once with every channel available and once per
//! channel with that channel removed. The drop in conversion probability is
//! the channel's removal effect; positive effects are normalized into weights.

use super::path::ConversionPath;
use super::solver::AbsorptionSolver;
use super::transition::TransitionMatrix;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Normalized, non-negative credit per channel. Sums to 1.0 when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributionWeights {
    weights: BTreeMap<String, f64>,
    uniform_fallback: bool,
}

impl AttributionWeights {
    /// Normalize removal effects, falling back to a uniform split when no
    /// channel has a positive effect
    pub fn from_removal_effects(effects: &BTreeMap<String, f64>) -> Self {
        if effects.is_empty() {
            return Self::default();
        }

        let total: f64 = effects.values().map(|e| e.max(0.0)).sum();
        if total > 0.0 {
            let weights = effects
                .iter()
                .map(|(channel, effect)| (channel.clone(), effect.max(0.0) / total))
                .collect();
            return Self {
                weights,
                uniform_fallback: false,
            };
        }

        tracing::info!(
            "No channel shows a positive removal effect, using uniform attribution over {} channels",
            effects.len()
        );
        let share = 1.0 / effects.len() as f64;
        Self {
            weights: effects.keys().map(|c| (c.clone(), share)).collect(),
            uniform_fallback: true,
        }
    }

    /// Weight of a channel, zero when unknown
    pub fn get(&self, channel: &str) -> f64 {
        self.weights.get(channel).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(c, w)| (c.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn is_uniform_fallback(&self) -> bool {
        self.uniform_fallback
    }

    /// Channels by descending weight, ties by channel label
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Everything the engine derives for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributionResult {
    pub weights: AttributionWeights,
    pub removal_effects: BTreeMap<String, f64>,
    pub base_conversion_probability: f64,
}

/// Orchestrates baseline and per-channel removal solves
#[derive(Debug, Clone, Copy)]
pub struct AttributionEngine {
    parallel: bool,
}

impl Default for AttributionEngine {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl AttributionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spread the per-channel removal solves over the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(&self, matrix: &TransitionMatrix, paths: &[ConversionPath]) -> AttributionResult {
        let universe = channel_universe(paths);
        let start = start_distribution(paths);
        let solver = AbsorptionSolver::new(matrix, &start);

        let base = solver.conversion_probability(&universe);
        tracing::debug!(
            "Baseline conversion probability {:.6} over {} channels",
            base,
            universe.len()
        );

        let removal_effect = |channel: &str| -> f64 {
            let mut available = universe.clone();
            available.remove(channel);
            base - solver.conversion_probability(&available)
        };

        let channels: Vec<&str> = universe.iter().copied().collect();
        let effects: Vec<f64> = if self.parallel {
            channels.par_iter().map(|c| removal_effect(*c)).collect()
        } else {
            channels.iter().map(|c| removal_effect(*c)).collect()
        };

        let removal_effects: BTreeMap<String, f64> = channels
            .iter()
            .zip(effects)
            .map(|(c, e)| (c.to_string(), e))
            .collect();

        for (channel, effect) in &removal_effects {
            tracing::trace!("Removal effect {}: {:.6}", channel, effect);
        }

        AttributionResult {
            weights: AttributionWeights::from_removal_effects(&removal_effects),
            removal_effects,
            base_conversion_probability: base,
        }
    }
}

/// Every channel seen in any path
pub fn channel_universe(paths: &[ConversionPath]) -> BTreeSet<&str> {
    paths.iter().flat_map(|p| p.channels()).collect()
}

/// Empirical first-touch frequency across paths
pub fn start_distribution(paths: &[ConversionPath]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for path in paths {
        *counts.entry(path.first_touch()).or_default() += 1;
    }
    let total = paths.len() as f64;
    counts
        .into_iter()
        .map(|(channel, count)| (channel.to_string(), count as f64 / total))
        .collect()
}
