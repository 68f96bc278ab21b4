//! # Agent Workflows
//!
//! Runs tasks against an agent through an [`AgentTaskExecutor`], either all at
//! once or as a chain where each task sees the previous task's result.

use crate::constants::{DEFAULT_MAX_CONCURRENCY, LAST_RESULT_KEY};
use crate::orchestration::{ConfigurationError, StepContext};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Executes a single task on behalf of an agent
#[async_trait]
pub trait AgentTaskExecutor: Send + Sync {
    type Agent: Send + Sync;

    async fn execute_task(
        &self,
        agent: &Self::Agent,
        task: &str,
        context: &StepContext,
    ) -> anyhow::Result<Value>;
}

/// One entry of a sequential workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialStep {
    pub task: String,

    /// Expose this task's result to the next one under `"last_result"`
    #[serde(default = "default_update_context")]
    pub update_context: bool,
}

fn default_update_context() -> bool {
    true
}

impl SequentialStep {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            update_context: true,
        }
    }

    /// Leave the context untouched after this task
    pub fn without_context_update(mut self) -> Self {
        self.update_context = false;
        self
    }
}

#[derive(Debug)]
pub struct AgentWorkflowOrchestrator<E> {
    executor: E,
    max_concurrency: usize,
}

impl<E: AgentTaskExecutor> AgentWorkflowOrchestrator<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Bound the number of parallel tasks in flight
    pub fn with_max_concurrency(
        executor: E,
        max_concurrency: usize,
    ) -> Result<Self, ConfigurationError> {
        if max_concurrency == 0 {
            return Err(ConfigurationError::InvalidConcurrency { max_concurrency });
        }
        Ok(Self {
            executor,
            max_concurrency,
        })
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run every task concurrently against the same context.
    ///
    /// Results are returned in task order. A failed task yields
    /// `{"error": "<message>"}` in its slot instead of aborting the others.
    pub async fn execute_parallel_tasks<S: AsRef<str>>(
        &self,
        agent: &E::Agent,
        tasks: &[S],
        context: &StepContext,
    ) -> Vec<Value> {
        stream::iter(tasks)
            .map(|task| async move {
                let task = task.as_ref();
                match self.executor.execute_task(agent, task, context).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(task = %task, error = %e, "Agent task failed");
                        json!({"error": e.to_string()})
                    }
                }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    /// Run tasks one after another, threading each result into the next
    /// task's context unless the step opts out.
    ///
    /// The first failure aborts the sequence and is returned as-is.
    pub async fn execute_sequential_workflow(
        &self,
        agent: &E::Agent,
        steps: &[SequentialStep],
        initial_context: StepContext,
    ) -> anyhow::Result<Vec<Value>> {
        let mut results = Vec::with_capacity(steps.len());
        let mut context = initial_context;

        for (index, step) in steps.iter().enumerate() {
            let result = match self.executor.execute_task(agent, &step.task, &context).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        task = %step.task,
                        index = index,
                        error = %e,
                        "Sequential agent workflow aborted"
                    );
                    return Err(e);
                }
            };
            debug!(task = %step.task, index = index, "Sequential agent task completed");

            if step.update_context {
                context.insert(LAST_RESULT_KEY.to_string(), result.clone());
            }
            results.push(result);
        }

        Ok(results)
    }
}
