//! # Dependency Graph
//!
//! Validated directed acyclic graph over step names.
//!
//! The graph is built once, when the orchestrator is constructed, and rejects:
//! - empty or duplicate step names
//! - `depends_on` entries naming undeclared steps
//! - cycles, found by depth-first traversal that tracks the in-progress path
//!
//! Declaration order is retained so that ready sets and dry-run plans are
//! reproducible between runs.

use crate::orchestration::errors::ConfigurationError;
use crate::orchestration::step::WorkflowStep;
use std::collections::{HashMap, HashSet};

/// Dependency relation between declared steps
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Step names in declaration order
    order: Vec<String>,
    /// Forward edges: step -> steps it depends on
    dependencies: HashMap<String, Vec<String>>,
    /// Reverse edges: step -> steps that depend on it
    dependents: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Build and validate the graph for a set of declarations
    pub fn build(steps: &[WorkflowStep]) -> Result<Self, ConfigurationError> {
        let mut graph = Self::default();

        for step in steps {
            if step.name().is_empty() {
                return Err(ConfigurationError::EmptyStepName);
            }
            if graph.dependencies.contains_key(step.name()) {
                return Err(ConfigurationError::DuplicateStep {
                    step_name: step.name().to_string(),
                });
            }
            graph.insert_node(step.name(), step.dependencies().to_vec());
        }

        graph.validate()?;
        Ok(graph)
    }

    fn insert_node(&mut self, name: &str, dependencies: Vec<String>) {
        self.order.push(name.to_string());
        self.dependents.entry(name.to_string()).or_default();
        for dep in &dependencies {
            self.dependents
                .entry(dep.clone())
                .or_default()
                .push(name.to_string());
        }
        self.dependencies.insert(name.to_string(), dependencies);
    }

    /// Check referential integrity, then acyclicity
    fn validate(&self) -> Result<(), ConfigurationError> {
        for name in &self.order {
            for dep in self.dependencies(name) {
                if !self.dependencies.contains_key(dep) {
                    return Err(ConfigurationError::UnknownDependency {
                        step_name: name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        if let Some(cycle) = self.find_cycle() {
            let step_name = cycle.last().cloned().unwrap_or_default();
            return Err(ConfigurationError::CircularDependency { step_name, cycle });
        }

        Ok(())
    }

    /// Returns the first cycle found, as a path that starts and ends on the
    /// re-encountered step (`a -> b -> a`)
    ///
    /// Traversal keeps its own frame stack, so chain depth is bounded by the
    /// heap rather than the thread stack.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        // (step, index of the next dependency to explore)
        let mut stack: Vec<(&str, usize)> = Vec::new();

        for root in &self.order {
            if visited.contains(root.as_str()) {
                continue;
            }
            on_path.insert(root.as_str());
            stack.push((root.as_str(), 0));

            while let Some(frame) = stack.last_mut() {
                let (name, next) = *frame;
                match self.dependencies(name).get(next) {
                    Some(dep) => {
                        frame.1 += 1;
                        let dep = dep.as_str();
                        if on_path.contains(dep) {
                            return Some(Self::cycle_path(&stack, dep));
                        }
                        if !visited.contains(dep) {
                            on_path.insert(dep);
                            stack.push((dep, 0));
                        }
                    }
                    None => {
                        stack.pop();
                        on_path.remove(name);
                        visited.insert(name);
                    }
                }
            }
        }
        None
    }

    fn cycle_path(stack: &[(&str, usize)], reentered: &str) -> Vec<String> {
        let start = stack
            .iter()
            .position(|(name, _)| *name == reentered)
            .unwrap_or(0);
        let mut cycle: Vec<String> = stack[start..]
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        cycle.push(reentered.to_string());
        cycle
    }

    /// Step names in declaration order
    pub fn step_names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Steps that `name` depends on; empty for unknown names
    pub fn dependencies(&self, name: &str) -> &[String] {
        self.dependencies
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Steps that declare a dependency on `name`
    pub fn dependents(&self, name: &str) -> &[String] {
        self.dependents
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Steps without dependencies, in declaration order
    pub fn roots(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.dependencies(name).is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Whether every dependency of `name` satisfies `is_terminated`
    pub fn is_ready<F>(&self, name: &str, is_terminated: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        self.dependencies(name)
            .iter()
            .all(|dep| is_terminated(dep.as_str()))
    }

    /// Waves the scheduler would dispatch, assuming every step terminates.
    ///
    /// No executor is invoked; this is a dry run of the ready-set loop.
    pub fn plan_waves(&self) -> Vec<Vec<String>> {
        let mut terminated: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = self.order.iter().map(String::as_str).collect();
        let mut waves = Vec::new();

        while !pending.is_empty() {
            let ready: Vec<&str> = pending
                .iter()
                .copied()
                .filter(|name| self.is_ready(name, |dep| terminated.contains(dep)))
                .collect();

            if ready.is_empty() {
                break;
            }

            terminated.extend(ready.iter().copied());
            pending.retain(|name| !terminated.contains(name));
            waves.push(ready.into_iter().map(str::to_string).collect());
        }

        waves
    }

    /// Builds a graph without validation, for exercising invariant checks
    #[cfg(test)]
    pub(crate) fn from_edges_unchecked(nodes: &[(&str, Vec<&str>)]) -> Self {
        let mut graph = Self::default();
        for (name, deps) in nodes {
            graph.insert_node(name, deps.iter().map(|d| d.to_string()).collect());
        }
        graph
    }
}
