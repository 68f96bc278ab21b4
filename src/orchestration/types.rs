//! # Orchestration Types
//!
//! Core data structures shared across the orchestration system: step status,
//! per-step outcomes, the execution context handed to executors, and the
//! report produced by a full run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Key/value context supplied to every step executor.
///
/// Each executor receives its own copy: the caller's initial context plus one
/// `"<dependency>_result"` entry per declared dependency.
pub type StepContext = HashMap<String, serde_json::Value>;

/// Outcomes keyed by step name, iterated in name order
pub type StepOutcomes = BTreeMap<String, StepOutcome>;

/// Lifecycle state of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Declared, not yet dispatched
    Pending,
    /// Dispatched to an executor
    Running,
    /// Executor returned a value within its timeout
    Completed,
    /// Executor returned an error, panicked, or timed out
    Failed,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    /// Whether moving from `self` to `next` respects `pending -> running -> terminal`
    pub fn can_transition_to(self, next: StepStatus) -> bool {
        matches!(
            (self, next),
            (StepStatus::Pending, StepStatus::Running)
                | (StepStatus::Running, StepStatus::Completed)
                | (StepStatus::Running, StepStatus::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal record of one step's execution attempt.
///
/// Created exactly once per step by the orchestrator, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub name: String,
    pub status: StepStatus,
    /// Executor return value, present only when `completed`
    pub result: Option<serde_json::Value>,
    /// Failure message, present only when `failed`
    pub error: Option<String>,
    pub error_code: Option<String>,
    /// Time spent inside the executor call
    pub duration: Duration,
    /// Time spent waiting for a concurrency permit
    pub queue_duration: Duration,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// 1-based index of the wave the step was dispatched in
    pub wave: usize,
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

/// Full account of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub run_id: Uuid,
    /// Step names per dispatched wave, in dispatch order
    pub waves: Vec<Vec<String>>,
    pub outcomes: StepOutcomes,
    pub elapsed: Duration,
}

impl ExecutionReport {
    /// True when every step completed
    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(StepOutcome::is_completed)
    }

    pub fn completed_steps(&self) -> Vec<&str> {
        self.outcomes
            .values()
            .filter(|o| o.is_completed())
            .map(|o| o.name.as_str())
            .collect()
    }

    pub fn failed_steps(&self) -> Vec<&str> {
        self.outcomes
            .values()
            .filter(|o| o.is_failed())
            .map(|o| o.name.as_str())
            .collect()
    }

    pub fn into_outcomes(self) -> StepOutcomes {
        self.outcomes
    }
}
