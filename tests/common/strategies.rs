//! proptest strategies for generated workflow shapes.

#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::Just;

/// Strategy for generating acyclic DAG structures
pub fn acyclic_dag_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop_oneof![
        Just(vec![(0, 1)]),                 // Simple 2-node chain
        Just(vec![(0, 1), (1, 2)]),         // Simple 3-node chain
        Just(vec![(0, 1), (0, 2), (1, 2)]), // Triangle DAG
        Just(vec![(0, 1), (0, 2)]),         // Fan-out from 0
        Just(vec![(0, 2), (1, 2)]),         // Fan-in to 2
        Just(vec![(0, 2), (1, 3), (2, 4), (3, 4), (0, 5)]), // Two branches and a straggler
    ]
}

/// Realistic workflow shapes; edges run from dependency to dependent
#[derive(Debug, Clone)]
pub enum WorkflowPattern {
    Linear(usize),                // Linear chain of N steps
    Diamond,                      // Diamond: 0 -> 1,2 -> 3
    FanOut(usize),                // 0 -> N
    FanIn(usize),                 // N -> 1
    Complex(Vec<(usize, usize)>), // Custom DAG structure
}

pub fn workflow_pattern_strategy() -> impl Strategy<Value = WorkflowPattern> {
    prop_oneof![
        (2usize..=10).prop_map(WorkflowPattern::Linear),
        Just(WorkflowPattern::Diamond),
        (2usize..=8).prop_map(WorkflowPattern::FanOut),
        (2usize..=8).prop_map(WorkflowPattern::FanIn),
        acyclic_dag_strategy().prop_map(WorkflowPattern::Complex),
    ]
}

/// Steps of a pattern paired with per-step outcome flags
pub fn pattern_with_failures_strategy() -> impl Strategy<Value = (WorkflowPattern, Vec<bool>)> {
    workflow_pattern_strategy().prop_flat_map(|pattern| {
        let count = pattern.step_count();
        (Just(pattern), prop::collection::vec(any::<bool>(), count))
    })
}

impl WorkflowPattern {
    /// Get the number of steps in this workflow pattern
    pub fn step_count(&self) -> usize {
        match self {
            WorkflowPattern::Linear(n) => *n,
            WorkflowPattern::Diamond => 4,
            WorkflowPattern::FanOut(n) => n + 1,
            WorkflowPattern::FanIn(n) => n + 1,
            WorkflowPattern::Complex(edges) => edges
                .iter()
                .flat_map(|(from, to)| [*from, *to])
                .max()
                .map(|max| max + 1)
                .unwrap_or(1),
        }
    }

    /// Get the edges for this workflow pattern
    pub fn edges(&self) -> Vec<(usize, usize)> {
        match self {
            WorkflowPattern::Linear(n) => (0..(*n - 1)).map(|i| (i, i + 1)).collect(),
            WorkflowPattern::Diamond => vec![(0, 1), (0, 2), (1, 3), (2, 3)],
            WorkflowPattern::FanOut(n) => (1..=*n).map(|i| (0, i)).collect(),
            WorkflowPattern::FanIn(n) => (0..*n).map(|i| (i, *n)).collect(),
            WorkflowPattern::Complex(edges) => edges.clone(),
        }
    }

    pub fn step_name(index: usize) -> String {
        format!("step_{index}")
    }

    /// Dependency names of step `index`
    pub fn dependencies_of(&self, index: usize) -> Vec<String> {
        self.edges()
            .into_iter()
            .filter(|(_, to)| *to == index)
            .map(|(from, _)| Self::step_name(from))
            .collect()
    }

    /// Length of the longest dependency chain, counted in steps
    pub fn depth(&self) -> usize {
        let count = self.step_count();
        let mut depth = vec![1usize; count];
        // Every generated edge points from a lower index to a higher one
        let mut edges = self.edges();
        edges.sort_by_key(|(_, to)| *to);
        for (from, to) in edges {
            depth[to] = depth[to].max(depth[from] + 1);
        }
        depth.into_iter().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_patterns() {
        let linear = WorkflowPattern::Linear(3);
        assert_eq!(linear.step_count(), 3);
        assert_eq!(linear.edges(), vec![(0, 1), (1, 2)]);
        assert_eq!(linear.depth(), 3);

        let diamond = WorkflowPattern::Diamond;
        assert_eq!(diamond.step_count(), 4);
        assert_eq!(diamond.dependencies_of(3), vec!["step_1", "step_2"]);
        assert_eq!(diamond.depth(), 3);

        let fan_in = WorkflowPattern::FanIn(3);
        assert_eq!(fan_in.step_count(), 4);
        assert_eq!(fan_in.depth(), 2);
    }
}
