//! Absorption probability estimation
//!
//! Power iteration over the sub-stochastic chain restricted to a set of
//! available channels. Mass sent toward an unavailable channel is dropped
//! instead of being redistributed, and nothing flows out of an unavailable
//! channel.

use super::transition::{State, TransitionMatrix};
use std::collections::{BTreeMap, BTreeSet};

/// Hard cap on propagation rounds
pub const MAX_ITERATIONS: usize = 100;

/// Convergence threshold for the conversion entry and the in-transit mass
pub const TOLERANCE: f64 = 1e-6;

/// Probability mass over available channels plus the absorbing state
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector<'a> {
    /// Mass currently sitting on each available channel
    pub transit: BTreeMap<&'a str, f64>,
    /// Mass absorbed so far
    pub conversion: f64,
}

impl<'a> StateVector<'a> {
    /// Starting vector: the start distribution restricted to `available`, normalized.
    ///
    /// Returns `None` when no starting mass falls on an available channel.
    pub fn initial(start: &BTreeMap<String, f64>, available: &BTreeSet<&'a str>) -> Option<Self> {
        let mut transit: BTreeMap<&'a str, f64> = available
            .iter()
            .map(|channel| (*channel, start.get(*channel).copied().unwrap_or(0.0)))
            .collect();

        let total: f64 = transit.values().sum();
        if total <= 0.0 {
            return None;
        }
        for mass in transit.values_mut() {
            *mass /= total;
        }

        Some(Self {
            transit,
            conversion: 0.0,
        })
    }

    pub fn in_transit(&self) -> f64 {
        self.transit.values().sum()
    }
}

/// One propagation round. Pure: `prev` is left untouched.
///
/// The conversion entry carries forward and accumulates newly absorbed mass;
/// channel entries are rebuilt from scratch as the mass one hop later.
pub fn propagate<'a>(
    matrix: &TransitionMatrix,
    available: &BTreeSet<&'a str>,
    prev: &StateVector<'a>,
) -> StateVector<'a> {
    let mut transit: BTreeMap<&'a str, f64> = available.iter().map(|c| (*c, 0.0)).collect();
    let mut conversion = prev.conversion;

    for (from, mass) in &prev.transit {
        let Some(targets) = matrix.outgoing(from) else {
            continue;
        };
        for (to, prob) in targets {
            match to {
                State::Conversion => conversion += mass * prob,
                State::Channel(label) => {
                    if let Some(slot) = transit.get_mut(label.as_str()) {
                        *slot += mass * prob;
                    }
                }
            }
        }
    }

    StateVector {
        transit,
        conversion,
    }
}

/// Outcome of a solver run
#[derive(Debug, Clone, PartialEq)]
pub struct Absorption {
    /// P(eventually reach conversion)
    pub probability: f64,
    /// Propagation rounds performed
    pub iterations: usize,
    /// Stopped on tolerance rather than the round cap
    pub converged: bool,
    /// Conversion entry after each round, starting with the initial 0.0
    pub trajectory: Vec<f64>,
}

impl Absorption {
    fn unreachable() -> Self {
        Self {
            probability: 0.0,
            iterations: 0,
            converged: true,
            trajectory: vec![0.0],
        }
    }
}

/// Estimates absorption probabilities for a fixed matrix and start distribution
#[derive(Debug, Clone, Copy)]
pub struct AbsorptionSolver<'m> {
    matrix: &'m TransitionMatrix,
    start: &'m BTreeMap<String, f64>,
}

impl<'m> AbsorptionSolver<'m> {
    pub fn new(matrix: &'m TransitionMatrix, start: &'m BTreeMap<String, f64>) -> Self {
        Self { matrix, start }
    }

    /// Run the propagation loop with only `available` channels reachable
    pub fn solve(&self, available: &BTreeSet<&str>) -> Absorption {
        let Some(mut state) = StateVector::initial(self.start, available) else {
            return Absorption::unreachable();
        };

        let mut trajectory = Vec::with_capacity(MAX_ITERATIONS + 1);
        trajectory.push(state.conversion);

        let mut converged = false;
        let mut iterations = 0;
        while iterations < MAX_ITERATIONS {
            let next = propagate(self.matrix, available, &state);
            iterations += 1;

            let delta = (next.conversion - state.conversion).abs();
            state = next;
            trajectory.push(state.conversion);

            if delta < TOLERANCE && state.in_transit() < TOLERANCE {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::debug!(
                "Absorption solver hit the {} round cap (conversion={:.6}, in transit={:.6})",
                MAX_ITERATIONS,
                state.conversion,
                state.in_transit()
            );
        }

        Absorption {
            probability: state.conversion,
            iterations,
            converged,
            trajectory,
        }
    }

    /// P(eventually reach conversion) with only `available` channels reachable
    pub fn conversion_probability(&self, available: &BTreeSet<&str>) -> f64 {
        self.solve(available).probability
    }
}
