//! # Execution State
//!
//! Bookkeeping owned by the coordinating control flow of a single run: which
//! steps are still pending, which have terminated, and the lifecycle status of
//! each. Step executors never see this structure; they receive copies of the
//! data they need, built by [`ExecutionState::build_step_context`].

use crate::constants::result_key;
use crate::orchestration::dependency_graph::DependencyGraph;
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};
use crate::orchestration::types::{StepContext, StepOutcome, StepOutcomes, StepStatus};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ExecutionState {
    statuses: HashMap<String, StepStatus>,
    /// Not yet terminated, in declaration order
    pending: Vec<String>,
    /// Terminated steps, regardless of success
    terminated: StepOutcomes,
}

impl ExecutionState {
    pub fn new(graph: &DependencyGraph) -> Self {
        let pending = graph.step_names().to_vec();
        let statuses = pending
            .iter()
            .map(|name| (name.clone(), StepStatus::Pending))
            .collect();

        Self {
            statuses,
            pending,
            terminated: StepOutcomes::new(),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_steps(&self) -> &[String] {
        &self.pending
    }

    pub fn status(&self, name: &str) -> Option<StepStatus> {
        self.statuses.get(name).copied()
    }

    pub fn is_terminated(&self, name: &str) -> bool {
        self.terminated.contains_key(name)
    }

    pub fn outcome(&self, name: &str) -> Option<&StepOutcome> {
        self.terminated.get(name)
    }

    /// Pending steps whose dependencies have all terminated, successfully or not.
    ///
    /// An empty ready set while steps remain pending means the graph invariant
    /// is broken, and is reported as [`OrchestrationError::Deadlock`].
    pub fn ready_steps(&self, graph: &DependencyGraph) -> OrchestrationResult<Vec<String>> {
        let ready: Vec<String> = self
            .pending
            .iter()
            .filter(|name| self.status(name) == Some(StepStatus::Pending))
            .filter(|name| graph.is_ready(name, |dep| self.is_terminated(dep)))
            .cloned()
            .collect();

        if ready.is_empty() && self.has_pending() {
            return Err(OrchestrationError::Deadlock {
                pending: self.pending.clone(),
            });
        }

        Ok(ready)
    }

    pub fn mark_running(&mut self, name: &str) -> OrchestrationResult<()> {
        self.transition(name, StepStatus::Running)
    }

    /// Store a terminal outcome and drop the step from the pending set
    pub fn record(&mut self, outcome: StepOutcome) -> OrchestrationResult<()> {
        self.transition(&outcome.name, outcome.status)?;
        self.pending.retain(|name| name != &outcome.name);
        debug!(
            step_name = %outcome.name,
            status = %outcome.status,
            remaining = self.pending.len(),
            "Step outcome recorded"
        );
        self.terminated.insert(outcome.name.clone(), outcome);
        Ok(())
    }

    fn transition(&mut self, name: &str, to: StepStatus) -> OrchestrationResult<()> {
        let current = self
            .statuses
            .get_mut(name)
            .ok_or_else(|| OrchestrationError::StepNotFound {
                step_name: name.to_string(),
            })?;

        if !current.can_transition_to(to) {
            return Err(OrchestrationError::InvalidStateTransition {
                step_name: name.to_string(),
                from: *current,
                to,
            });
        }

        *current = to;
        Ok(())
    }

    /// Shallow copy of `base` plus one `"<dep>_result"` entry per dependency.
    ///
    /// Failed dependencies contribute `null`.
    pub fn build_step_context(&self, base: &StepContext, dependencies: &[String]) -> StepContext {
        let mut context = base.clone();
        for dep in dependencies {
            let value = self
                .terminated
                .get(dep)
                .and_then(|outcome| outcome.result.clone())
                .unwrap_or(serde_json::Value::Null);
            context.insert(result_key(dep), value);
        }
        context
    }

    pub fn into_outcomes(self) -> StepOutcomes {
        self.terminated
    }
}
