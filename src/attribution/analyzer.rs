//! Journey structure analyzer
//!
//! Builds a directed graph from the transition matrix and classifies the
//! channel journeys as linear, branching or cyclic.

use super::transition::{State, TransitionMatrix};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyPattern {
    /// No transitions observed
    Empty,

    /// A -> B -> C -> conversion
    Linear,

    /// A -> B
    ///   -> C
    Branching,

    /// A -> B -> A
    Cyclic,
}

impl JourneyPattern {
    pub fn display_name(&self) -> &'static str {
        match self {
            JourneyPattern::Empty => "Empty",
            JourneyPattern::Linear => "Linear",
            JourneyPattern::Branching => "Branching",
            JourneyPattern::Cyclic => "Cyclic",
        }
    }
}

/// Structural summary of the channel graph
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyStructure {
    pub pattern: JourneyPattern,
    /// Mean out-degree over channel nodes
    pub branching_factor: f64,
    pub has_cycles: bool,
    /// Longest hop count from any channel into conversion; `None` when cyclic
    pub max_depth: Option<usize>,
}

/// Directed graph of channels plus the conversion node, weighted by probability
pub struct JourneyGraph {
    pub graph: DiGraph<State, f64>,
    pub node_index: HashMap<State, NodeIndex>,
}

impl JourneyGraph {
    pub fn from_matrix(matrix: &TransitionMatrix) -> Self {
        let mut journey = Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        };

        for (from, targets) in matrix.iter() {
            let from_idx = journey.node(State::channel(from));
            for (to, prob) in targets {
                let to_idx = journey.node(to.clone());
                journey.graph.add_edge(from_idx, to_idx, *prob);
            }
        }
        journey
    }

    fn node(&mut self, state: State) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&state) {
            return idx;
        }
        let idx = self.graph.add_node(state.clone());
        self.node_index.insert(state, idx);
        idx
    }

    fn channel_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(|&idx| !self.graph[idx].is_conversion())
    }

    fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Longest hop count into conversion, or `None` when the graph has a cycle
    fn max_depth(&self) -> Option<usize> {
        let order = petgraph::algo::toposort(&self.graph, None).ok()?;
        let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
        for &idx in order.iter().rev() {
            let d = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|next| depth.get(&next).copied().unwrap_or(0) + 1)
                .max()
                .unwrap_or(0);
            depth.insert(idx, d);
        }
        Some(depth.values().copied().max().unwrap_or(0))
    }
}

/// Detect the journey pattern of a transition matrix
pub fn detect_pattern(matrix: &TransitionMatrix) -> JourneyStructure {
    let journey = JourneyGraph::from_matrix(matrix);
    let channel_count = journey.channel_nodes().count();

    if channel_count == 0 {
        return JourneyStructure {
            pattern: JourneyPattern::Empty,
            branching_factor: 0.0,
            has_cycles: false,
            max_depth: None,
        };
    }

    let has_cycles = petgraph::algo::is_cyclic_directed(&journey.graph);

    let total_out_degree: usize = journey
        .channel_nodes()
        .map(|idx| journey.out_degree(idx))
        .sum();
    let branching_factor = total_out_degree as f64 / channel_count as f64;

    let max_out = journey
        .channel_nodes()
        .map(|idx| journey.out_degree(idx))
        .max()
        .unwrap_or(0);

    let pattern = if has_cycles {
        JourneyPattern::Cyclic
    } else if max_out <= 1 {
        JourneyPattern::Linear
    } else {
        JourneyPattern::Branching
    };

    JourneyStructure {
        pattern,
        branching_factor,
        has_cycles,
        max_depth: journey.max_depth(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::transition::tests::path;

    #[test]
    fn test_empty_matrix() {
        let report = detect_pattern(&TransitionMatrix::default());
        assert_eq!(report.pattern, JourneyPattern::Empty);
        assert!(!report.has_cycles);
        assert_eq!(report.max_depth, None);
    }

    #[test]
    fn test_linear_journey() {
        let matrix = TransitionMatrix::from_paths(&[path("C1", &["google", "email", "direct"])]);
        let report = detect_pattern(&matrix);
        assert_eq!(report.pattern, JourneyPattern::Linear);
        assert_eq!(report.branching_factor, 1.0);
        assert_eq!(report.max_depth, Some(3));
    }

    #[test]
    fn test_branching_journey() {
        let paths = vec![path("C1", &["google", "email"]), path("C2", &["google"])];
        let report = detect_pattern(&TransitionMatrix::from_paths(&paths));
        assert_eq!(report.pattern, JourneyPattern::Branching);
        assert!(!report.has_cycles);
        assert_eq!(report.max_depth, Some(2));
        assert_eq!(report.branching_factor, 1.5);
    }

    #[test]
    fn test_cyclic_journey() {
        let paths = vec![path("C1", &["a", "b", "a"])];
        let report = detect_pattern(&TransitionMatrix::from_paths(&paths));
        assert_eq!(report.pattern, JourneyPattern::Cyclic);
        assert!(report.has_cycles);
        assert_eq!(report.max_depth, None);
    }

    #[test]
    fn test_self_loop_is_cyclic() {
        let report = detect_pattern(&TransitionMatrix::from_paths(&[path("C1", &["a", "a"])]));
        assert!(report.has_cycles);
        assert_eq!(report.pattern.display_name(), "Cyclic");
    }

    #[test]
    fn test_graph_contains_conversion_node() {
        let matrix = TransitionMatrix::from_paths(&[path("C1", &["a", "b"])]);
        let journey = JourneyGraph::from_matrix(&matrix);
        assert!(journey.node_index.contains_key(&State::Conversion));
        assert_eq!(journey.graph.node_count(), 3);
        assert_eq!(journey.graph.edge_count(), 2);
    }
}
