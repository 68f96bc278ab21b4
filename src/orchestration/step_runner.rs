//! # Step Runner
//!
//! Executes individual steps on behalf of the orchestrator.
//!
//! ## Key Features
//!
//! - **Bounded concurrency**: every step acquires a permit from one shared
//!   semaphore before its executor runs, whichever wave it belongs to
//! - **Timeout management**: each executor call is bounded by its own timeout;
//!   on expiry the executor future is dropped and its result discarded
//! - **Failure isolation**: errors and panics are folded into a `failed`
//!   [`StepOutcome`] and never reach sibling steps
//! - **Timing**: queue time (waiting for a permit) and execution time are
//!   recorded separately

use crate::constants::operations;
use crate::logging::log_step_operation;
use crate::orchestration::errors::StepError;
use crate::orchestration::step::StepExecutor;
use crate::orchestration::types::{StepContext, StepOutcome, StepStatus};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::timeout;
use tracing::{debug, error, warn, Instrument};
use uuid::Uuid;

/// Everything a spawned task needs to run one step
pub(crate) struct StepRun {
    pub name: String,
    pub executor: Arc<dyn StepExecutor>,
    pub context: StepContext,
    pub timeout: Duration,
    pub wave: usize,
    pub run_id: Uuid,
}

/// Capacity snapshot of the permit pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerStats {
    pub max_concurrency: usize,
    pub available_permits: usize,
    pub in_flight: usize,
}

/// Spawns step executions under a shared concurrency bound
#[derive(Debug, Clone)]
pub struct StepRunner {
    execution_semaphore: Arc<Semaphore>,
    max_concurrency: usize,
}

impl StepRunner {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            execution_semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn stats(&self) -> RunnerStats {
        let available_permits = self.execution_semaphore.available_permits();
        RunnerStats {
            max_concurrency: self.max_concurrency,
            available_permits,
            in_flight: self.max_concurrency.saturating_sub(available_permits),
        }
    }

    /// Spawn one step as an independent task
    pub(crate) fn spawn(&self, run: StepRun) -> JoinHandle<StepOutcome> {
        let semaphore = Arc::clone(&self.execution_semaphore);
        let span = tracing::info_span!(
            "dag_step",
            run_id = %run.run_id,
            step_name = %run.name,
            wave = run.wave,
        );
        tokio::spawn(Self::run(semaphore, run).instrument(span))
    }

    async fn run(semaphore: Arc<Semaphore>, run: StepRun) -> StepOutcome {
        let StepRun {
            name,
            executor,
            context,
            timeout: step_timeout,
            wave,
            run_id: _,
        } = run;

        let queued_at = Instant::now();
        let permit = match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                let now = Utc::now();
                let error = StepError::PermitUnavailable {
                    step_name: name.clone(),
                    reason: e.to_string(),
                };
                return failed_outcome(name, error, Duration::ZERO, queued_at.elapsed(), now, wave);
            }
        };
        let queue_duration = queued_at.elapsed();

        debug!(
            step_name = %name,
            queue_ms = queue_duration.as_millis() as u64,
            timeout_ms = step_timeout.as_millis() as u64,
            "Step execution started"
        );
        log_step_operation(operations::STEP_DISPATCHED, &name, "running", None);

        let started_at = Utc::now();
        let start = Instant::now();
        let result = timeout(
            step_timeout,
            AssertUnwindSafe(executor.execute(context)).catch_unwind(),
        )
        .await;
        let duration = start.elapsed();
        drop(permit);

        match result {
            Ok(Ok(Ok(value))) => {
                debug!(
                    step_name = %name,
                    duration_ms = duration.as_millis() as u64,
                    "Step execution completed successfully"
                );
                log_step_operation(operations::STEP_COMPLETED, &name, "completed", None);
                StepOutcome {
                    name,
                    status: StepStatus::Completed,
                    result: Some(value),
                    error: None,
                    error_code: None,
                    duration,
                    queue_duration,
                    started_at,
                    finished_at: Utc::now(),
                    wave,
                }
            }
            Ok(Ok(Err(e))) => {
                let error = StepError::Execution {
                    step_name: name.clone(),
                    message: format!("{e:#}"),
                };
                warn!(
                    step_name = %name,
                    error = %error,
                    duration_ms = duration.as_millis() as u64,
                    "Step execution failed"
                );
                log_step_operation(
                    operations::STEP_FAILED,
                    &name,
                    "failed",
                    Some(&error.to_string()),
                );
                failed_outcome(name, error, duration, queue_duration, started_at, wave)
            }
            Ok(Err(panic)) => {
                let error = StepError::Panicked {
                    step_name: name.clone(),
                    message: panic_message(panic.as_ref()),
                };
                error!(step_name = %name, error = %error, "Step executor panicked");
                log_step_operation(
                    operations::STEP_FAILED,
                    &name,
                    "failed",
                    Some(&error.to_string()),
                );
                failed_outcome(name, error, duration, queue_duration, started_at, wave)
            }
            Err(_) => {
                let error = StepError::Timeout {
                    step_name: name.clone(),
                    timeout: step_timeout,
                };
                error!(
                    step_name = %name,
                    timeout_ms = step_timeout.as_millis() as u64,
                    "Step execution timed out"
                );
                log_step_operation(
                    operations::STEP_TIMED_OUT,
                    &name,
                    "failed",
                    Some(&error.to_string()),
                );
                failed_outcome(name, error, duration, queue_duration, started_at, wave)
            }
        }
    }

    /// Outcome for a task that ended without producing one (panic outside the
    /// executor, or runtime shutdown)
    pub(crate) fn outcome_from_join_error(
        name: String,
        wave: usize,
        dispatched_at: DateTime<Utc>,
        err: JoinError,
    ) -> StepOutcome {
        let message = if err.is_panic() {
            panic_message(err.into_panic().as_ref())
        } else {
            err.to_string()
        };
        error!(step_name = %name, error = %message, "Step task aborted");
        let error = StepError::Panicked {
            step_name: name.clone(),
            message,
        };
        failed_outcome(name, error, Duration::ZERO, Duration::ZERO, dispatched_at, wave)
    }
}

fn failed_outcome(
    name: String,
    error: StepError,
    duration: Duration,
    queue_duration: Duration,
    started_at: DateTime<Utc>,
    wave: usize,
) -> StepOutcome {
    StepOutcome {
        name,
        status: StepStatus::Failed,
        result: None,
        error: Some(error.to_string()),
        error_code: Some(error.code().to_string()),
        duration,
        queue_duration,
        started_at,
        finished_at: Utc::now(),
        wave,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
