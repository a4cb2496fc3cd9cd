//! First-order transition model over channels
//!
//! Counts adjacent channel pairs inside every path plus one implicit move from
//! each path's last channel into the absorbing `conversion` state, then turns
//! the counts into per-state probabilities.

use super::path::ConversionPath;
use std::collections::BTreeMap;
use std::fmt;

/// Label of the absorbing state
pub const CONVERSION_LABEL: &str = "conversion";

/// Target of a transition: another channel or the absorbing conversion state
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    Channel(String),
    Conversion,
}

impl State {
    pub fn channel(label: impl Into<String>) -> Self {
        State::Channel(label.into())
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, State::Conversion)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            State::Channel(label) => f.write_str(label),
            State::Conversion => f.write_str(CONVERSION_LABEL),
        }
    }
}

/// Empirical transition probabilities, keyed by source channel.
///
/// Every source row sums to 1.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionMatrix {
    rows: BTreeMap<String, BTreeMap<State, f64>>,
}

impl TransitionMatrix {
    /// Estimate transition probabilities from observed paths
    pub fn from_paths(paths: &[ConversionPath]) -> Self {
        let mut counts: BTreeMap<String, BTreeMap<State, u64>> = BTreeMap::new();

        for path in paths {
            let channels: Vec<&str> = path.channels().collect();
            for pair in channels.windows(2) {
                *counts
                    .entry(pair[0].to_string())
                    .or_default()
                    .entry(State::channel(pair[1]))
                    .or_default() += 1;
            }
            *counts
                .entry(path.last_touch().to_string())
                .or_default()
                .entry(State::Conversion)
                .or_default() += 1;
        }

        let rows = counts
            .into_iter()
            .map(|(from, targets)| {
                let total: u64 = targets.values().sum();
                let probs = targets
                    .into_iter()
                    .map(|(to, count)| (to, count as f64 / total as f64))
                    .collect();
                (from, probs)
            })
            .collect();

        let matrix = Self { rows };
        tracing::debug!(
            "Transition matrix: {} source states, {} transitions",
            matrix.len(),
            matrix.transition_count()
        );
        matrix
    }

    /// Outgoing probabilities for a source channel
    pub fn outgoing(&self, from: &str) -> Option<&BTreeMap<State, f64>> {
        self.rows.get(from)
    }

    /// P(from -> to), zero when never observed
    pub fn probability(&self, from: &str, to: &State) -> f64 {
        self.rows
            .get(from)
            .and_then(|targets| targets.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    /// Iterate source channels with their outgoing probabilities, in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<State, f64>)> {
        self.rows.iter().map(|(from, targets)| (from.as_str(), targets))
    }

    /// Number of source states
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct (from, to) pairs
    pub fn transition_count(&self) -> usize {
        self.rows.values().map(|t| t.len()).sum()
    }

    /// Export to DOT format for Graphviz.
    ///
    /// Channels are declared as `c<N>` nodes and the absorbing state as
    /// `conversion_state`, so a channel labelled `conversion` stays distinct.
    pub fn to_dot(&self) -> String {
        let mut dot = "digraph TransitionMatrix {\n".to_string();
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=filled, fillcolor=\"lightblue\"];\n");
        dot.push_str(&format!(
            "  conversion_state [label=\"{}\", shape=doublecircle, fillcolor=\"green\"];\n",
            CONVERSION_LABEL
        ));

        let mut ids: BTreeMap<&str, String> = BTreeMap::new();
        for (from, targets) in &self.rows {
            ids.insert(from.as_str(), String::new());
            for to in targets.keys() {
                if let State::Channel(label) = to {
                    ids.insert(label.as_str(), String::new());
                }
            }
        }
        for (i, (label, id)) in ids.iter_mut().enumerate() {
            *id = format!("c{}", i);
            dot.push_str(&format!("  {} [label=\"{}\"];\n", id, escape_dot(label)));
        }
        dot.push('\n');

        let channel_id = |label: &str| ids.get(label).cloned().unwrap_or_default();

        for (from, targets) in &self.rows {
            for (to, prob) in targets {
                let target = match to {
                    State::Channel(label) => channel_id(label),
                    State::Conversion => "conversion_state".to_string(),
                };
                dot.push_str(&format!(
                    "  {} -> {} [label=\"{:.3}\"];\n",
                    channel_id(from),
                    target,
                    prob
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape_dot(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::attribution::touchpoint::Touchpoint;
    use chrono::{Duration, NaiveDate};

    /// Build a path from channel labels with one-minute spacing
    pub(crate) fn path(id: &str, channels: &[&str]) -> ConversionPath {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let touchpoints = channels
            .iter()
            .enumerate()
            .map(|(i, c)| Touchpoint::new(id, *c, start + Duration::minutes(i as i64)))
            .collect();
        ConversionPath::new(id, touchpoints).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_matrix() {
        let matrix = TransitionMatrix::from_paths(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.transition_count(), 0);
    }

    #[test]
    fn test_single_chain() {
        let matrix = TransitionMatrix::from_paths(&[path("C1", &["google", "email", "direct"])]);
        assert_eq!(matrix.probability("google", &State::channel("email")), 1.0);
        assert_eq!(matrix.probability("email", &State::channel("direct")), 1.0);
        assert_eq!(matrix.probability("direct", &State::Conversion), 1.0);
        assert_eq!(matrix.probability("google", &State::Conversion), 0.0);
        assert_eq!(matrix.len(), 3);
    }

    #[test]
    fn test_counts_become_probabilities() {
        let paths = vec![
            path("C1", &["google", "email"]),
            path("C2", &["google", "direct"]),
            path("C3", &["google"]),
            path("C4", &["google", "email"]),
        ];
        let matrix = TransitionMatrix::from_paths(&paths);
        assert_eq!(matrix.probability("google", &State::channel("email")), 0.5);
        assert_eq!(matrix.probability("google", &State::channel("direct")), 0.25);
        assert_eq!(matrix.probability("google", &State::Conversion), 0.25);
    }

    #[test]
    fn test_rows_sum_to_one() {
        let paths = vec![
            path("C1", &["a", "b", "a", "c"]),
            path("C2", &["b", "b", "c"]),
            path("C3", &["c", "a"]),
            path("C4", &["a"]),
            path("C5", &["b", "c", "b"]),
        ];
        let matrix = TransitionMatrix::from_paths(&paths);
        for (from, targets) in matrix.iter() {
            let total: f64 = targets.values().sum();
            assert!((total - 1.0).abs() < 1e-9, "row {} sums to {}", from, total);
        }
    }

    #[test]
    fn test_self_loop_recorded() {
        let matrix = TransitionMatrix::from_paths(&[path("C1", &["email", "email"])]);
        assert_eq!(matrix.probability("email", &State::channel("email")), 0.5);
        assert_eq!(matrix.probability("email", &State::Conversion), 0.5);
    }

    #[test]
    fn test_channel_named_conversion_is_distinct() {
        let matrix = TransitionMatrix::from_paths(&[path("C1", &["conversion", "email"])]);
        assert_eq!(
            matrix.probability("conversion", &State::channel("email")),
            1.0
        );
        assert_eq!(matrix.probability("conversion", &State::Conversion), 0.0);
    }

    #[test]
    fn test_to_dot_output() {
        let matrix = TransitionMatrix::from_paths(&[path("C1", &["google", "email"])]);
        let dot = matrix.to_dot();
        assert!(dot.starts_with("digraph TransitionMatrix"));
        // Nodes are numbered in label order: email=c0, google=c1
        assert!(dot.contains("c0 [label=\"email\"]"));
        assert!(dot.contains("c1 [label=\"google\"]"));
        assert!(dot.contains("c1 -> c0 [label=\"1.000\"]"));
        assert!(dot.contains("c0 -> conversion_state"));
        assert!(dot.contains("doublecircle"));
    }

    #[test]
    fn test_to_dot_keeps_channel_named_conversion_apart() {
        let matrix = TransitionMatrix::from_paths(&[path("C1", &["conversion", "email"])]);
        let dot = matrix.to_dot();
        // conversion=c0, email=c1
        assert!(dot.contains("c0 [label=\"conversion\"]"));
        assert!(dot.contains("c0 -> c1 [label=\"1.000\"]"));
        assert!(dot.contains("c1 -> conversion_state"));
        assert!(!dot.contains("c0 -> conversion_state"));
        assert_eq!(dot.matches("doublecircle").count(), 1);
    }
}
