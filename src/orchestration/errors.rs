//! # Orchestration Errors
//!
//! Error types for the step orchestrator.
//!
//! Errors fall into two groups:
//! - **Fatal** errors abort construction or a whole run and are returned to the caller
//!   ([`ConfigurationError`], [`OrchestrationError`]).
//! - **Recovered** errors belong to a single step and are folded into that step's
//!   [`StepOutcome`](crate::orchestration::types::StepOutcome) ([`StepError`]).

use crate::orchestration::types::StepStatus;
use std::time::Duration;
use thiserror::Error;

pub type OrchestrationResult<T> = std::result::Result<T, OrchestrationError>;

/// Invalid step declarations, detected synchronously at construction time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A step was declared with an empty name
    #[error("Step name must not be empty")]
    EmptyStepName,

    /// Two declarations share one name
    #[error("Duplicate step name: {step_name}")]
    DuplicateStep { step_name: String },

    /// A `depends_on` entry references a step that was never declared
    #[error("Step '{step_name}' depends on unknown step '{dependency}'")]
    UnknownDependency {
        step_name: String,
        dependency: String,
    },

    /// The dependency relation contains a cycle
    #[error("Circular dependency detected: {step_name} ({})", .cycle.join(" -> "))]
    CircularDependency {
        step_name: String,
        cycle: Vec<String>,
    },

    /// The concurrency bound would never admit a step
    #[error("max_concurrency must be at least 1, got {max_concurrency}")]
    InvalidConcurrency { max_concurrency: usize },
}

/// Fatal errors surfaced by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// No step is ready while some remain pending.
    ///
    /// Unreachable for graphs that passed construction-time validation.
    #[error(
        "Orchestration deadlock: no ready steps while {} remain pending: {pending:?}",
        .pending.len()
    )]
    Deadlock { pending: Vec<String> },

    /// A step moved backwards or skipped a lifecycle state
    #[error("Invalid state transition for step '{step_name}': {from} -> {to}")]
    InvalidStateTransition {
        step_name: String,
        from: StepStatus,
        to: StepStatus,
    },

    #[error("Step '{step_name}' is not part of this orchestrator")]
    StepNotFound { step_name: String },
}

/// Per-step failure, recorded in a `failed` outcome and never propagated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("Step timed out after {}s", .timeout.as_secs_f64())]
    Timeout { step_name: String, timeout: Duration },

    #[error("{message}")]
    Execution { step_name: String, message: String },

    #[error("Step panicked: {message}")]
    Panicked { step_name: String, message: String },

    #[error("Concurrency permit unavailable: {reason}")]
    PermitUnavailable { step_name: String, reason: String },
}

impl StepError {
    /// Stable machine-readable code stored alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            StepError::Timeout { .. } => "EXECUTION_TIMEOUT",
            StepError::Execution { .. } => "EXECUTION_ERROR",
            StepError::Panicked { .. } => "EXECUTION_PANICKED",
            StepError::PermitUnavailable { .. } => "PERMIT_UNAVAILABLE",
        }
    }

    pub fn step_name(&self) -> &str {
        match self {
            StepError::Timeout { step_name, .. }
            | StepError::Execution { step_name, .. }
            | StepError::Panicked { step_name, .. }
            | StepError::PermitUnavailable { step_name, .. } => step_name,
        }
    }
}
