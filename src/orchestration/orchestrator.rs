//! # DAG Orchestrator
//!
//! Runs a set of [`WorkflowStep`]s in an order consistent with their declared
//! dependencies, dispatching independent steps concurrently.
//!
//! ## Scheduling
//!
//! A single coordinating control flow repeats until no step is pending:
//!
//! 1. compute the ready set: pending steps whose dependencies have all
//!    terminated (completed *or* failed)
//! 2. spawn every ready step; each one waits for a permit from the shared
//!    semaphore before its executor runs
//! 3. join the whole wave, then record each outcome
//!
//! A failing or timed-out step never aborts its siblings and does not block its
//! dependents; they run with a `null` `"<dep>_result"` entry. The orchestrator
//! returns every outcome and leaves the overall verdict to the caller.
//!
//! There is no run-level cancellation: once started, a run ends when every step
//! has terminated or a fatal error is raised.
//!
//! ## Usage
//!
//! ```rust
//! use dagflow_core::orchestration::{DagOrchestrator, StepContext, StepStatus, WorkflowStep};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let orchestrator = DagOrchestrator::new(vec![
//!     WorkflowStep::from_fn("fetch", |_ctx: StepContext| async { Ok(json!({"value": 10})) }),
//!     WorkflowStep::from_fn("double", |ctx: StepContext| async move {
//!         let value = ctx["fetch_result"]["value"].as_i64().unwrap_or_default();
//!         Ok(json!({"value": value * 2}))
//!     })
//!     .depends_on(["fetch"]),
//! ])
//! .unwrap();
//!
//! let outcomes = orchestrator.execute(StepContext::new()).await.unwrap();
//! assert_eq!(outcomes["double"].status, StepStatus::Completed);
//! assert_eq!(outcomes["double"].result, Some(json!({"value": 20})));
//! # });
//! ```

use crate::config::OrchestratorConfig;
use crate::constants::{operations, DEFAULT_MAX_CONCURRENCY, DEFAULT_STEP_TIMEOUT};
use crate::orchestration::dependency_graph::DependencyGraph;
use crate::orchestration::errors::{ConfigurationError, OrchestrationError, OrchestrationResult};
use crate::orchestration::execution_state::ExecutionState;
use crate::orchestration::step::WorkflowStep;
use crate::orchestration::step_runner::{RunnerStats, StepRun, StepRunner};
use crate::orchestration::types::{ExecutionReport, StepContext, StepOutcomes};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Dependency-aware parallel step executor
pub struct DagOrchestrator {
    steps: HashMap<String, WorkflowStep>,
    graph: DependencyGraph,
    runner: StepRunner,
    default_step_timeout: Duration,
}

impl DagOrchestrator {
    /// Validate `steps` and build an orchestrator bounded to 10 concurrent steps
    pub fn new(steps: Vec<WorkflowStep>) -> Result<Self, ConfigurationError> {
        Self::with_max_concurrency(steps, DEFAULT_MAX_CONCURRENCY)
    }

    pub fn with_max_concurrency(
        steps: Vec<WorkflowStep>,
        max_concurrency: usize,
    ) -> Result<Self, ConfigurationError> {
        Self::build(steps, max_concurrency, DEFAULT_STEP_TIMEOUT)
    }

    /// Use the concurrency bound and default step timeout from configuration
    pub fn from_config(
        steps: Vec<WorkflowStep>,
        config: &OrchestratorConfig,
    ) -> Result<Self, ConfigurationError> {
        Self::build(steps, config.max_concurrency, config.default_step_timeout())
    }

    fn build(
        steps: Vec<WorkflowStep>,
        max_concurrency: usize,
        default_step_timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        if max_concurrency == 0 {
            return Err(ConfigurationError::InvalidConcurrency { max_concurrency });
        }

        let graph = DependencyGraph::build(&steps)?;
        let steps = steps
            .into_iter()
            .map(|step| (step.name().to_string(), step))
            .collect();

        Ok(Self {
            steps,
            graph,
            runner: StepRunner::new(max_concurrency),
            default_step_timeout,
        })
    }

    pub fn max_concurrency(&self) -> usize {
        self.runner.max_concurrency()
    }

    pub fn default_step_timeout(&self) -> Duration {
        self.default_step_timeout
    }

    /// Effective timeout for a step: its own, or the orchestrator default
    pub fn step_timeout(&self, name: &str) -> Option<Duration> {
        self.steps
            .get(name)
            .map(|step| step.timeout().unwrap_or(self.default_step_timeout))
    }

    /// Step names in declaration order
    pub fn step_names(&self) -> &[String] {
        self.graph.step_names()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Permit pool usage; the pool is shared by concurrent runs of this instance
    pub fn runner_stats(&self) -> RunnerStats {
        self.runner.stats()
    }

    /// Waves that a run would dispatch, without invoking any executor
    pub fn plan(&self) -> Vec<Vec<String>> {
        self.graph.plan_waves()
    }

    /// Run every step and return one outcome per declared step
    pub async fn execute(&self, context: StepContext) -> OrchestrationResult<StepOutcomes> {
        self.execute_with_report(context)
            .await
            .map(ExecutionReport::into_outcomes)
    }

    /// Run every step and return outcomes together with wave and timing details
    pub async fn execute_with_report(
        &self,
        context: StepContext,
    ) -> OrchestrationResult<ExecutionReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "dag_orchestrator_execute",
            run_id = %run_id,
            total_steps = self.graph.len(),
        );
        self.run_waves(run_id, context).instrument(span).await
    }

    async fn run_waves(
        &self,
        run_id: Uuid,
        context: StepContext,
    ) -> OrchestrationResult<ExecutionReport> {
        info!(
            operation = operations::RUN_STARTED,
            max_concurrency = self.max_concurrency(),
            "Starting DAG orchestration"
        );

        let started = Instant::now();
        let mut state = ExecutionState::new(&self.graph);
        let mut waves = Vec::new();

        while state.has_pending() {
            let ready = state.ready_steps(&self.graph)?;
            let wave_number = waves.len() + 1;

            info!(
                wave = wave_number,
                ready_steps = ready.len(),
                pending_steps = state.pending_steps().len(),
                "Dispatching wave"
            );

            let mut handles = Vec::with_capacity(ready.len());
            for name in &ready {
                let step = self.step(name)?;
                let step_context = state.build_step_context(&context, step.dependencies());
                state.mark_running(name)?;

                let run = StepRun {
                    name: name.clone(),
                    executor: step.executor(),
                    context: step_context,
                    timeout: step.timeout().unwrap_or(self.default_step_timeout),
                    wave: wave_number,
                    run_id,
                };
                handles.push((name.clone(), Utc::now(), self.runner.spawn(run)));
            }

            let joined = join_all(
                handles
                    .into_iter()
                    .map(|(name, dispatched_at, handle)| async move {
                        (name, dispatched_at, handle.await)
                    }),
            )
            .await;

            for (name, dispatched_at, joined) in joined {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        StepRunner::outcome_from_join_error(name, wave_number, dispatched_at, e)
                    }
                };
                state.record(outcome)?;
            }

            waves.push(ready);
        }

        let outcomes = state.into_outcomes();
        let elapsed = started.elapsed();
        let failed: Vec<&str> = outcomes
            .values()
            .filter(|o| o.is_failed())
            .map(|o| o.name.as_str())
            .collect();

        if failed.is_empty() {
            info!(
                operation = operations::RUN_FINISHED,
                waves = waves.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "DAG orchestration completed"
            );
        } else {
            warn!(
                operation = operations::RUN_FINISHED,
                waves = waves.len(),
                failed_steps = ?failed,
                elapsed_ms = elapsed.as_millis() as u64,
                "DAG orchestration finished with failed steps"
            );
        }

        Ok(ExecutionReport {
            run_id,
            waves,
            outcomes,
            elapsed,
        })
    }

    fn step(&self, name: &str) -> OrchestrationResult<&WorkflowStep> {
        self.steps
            .get(name)
            .ok_or_else(|| OrchestrationError::StepNotFound {
                step_name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for DagOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DagOrchestrator")
            .field("steps", &self.graph.step_names())
            .field("max_concurrency", &self.max_concurrency())
            .field("default_step_timeout", &self.default_step_timeout)
            .finish()
    }
}
