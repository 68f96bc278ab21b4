//! # Orchestration Engine
//!
//! Dependency-aware parallel execution of workflow steps.
//!
//! ## Core Components
//!
//! - **WorkflowStep / StepExecutor**: a named unit of work and the async
//!   operation that performs it
//! - **DependencyGraph**: construction-time validation (unknown dependencies,
//!   duplicates, cycles) and readiness queries
//! - **ExecutionState**: per-run lifecycle bookkeeping and context building
//! - **StepRunner**: semaphore-bounded, timeout-guarded execution of one step
//! - **DagOrchestrator**: the wave loop tying the above together

pub mod dependency_graph;
pub mod errors;
pub mod execution_state;
pub mod orchestrator;
pub mod step;
pub mod step_runner;
pub mod types;

pub use dependency_graph::DependencyGraph;
pub use errors::{ConfigurationError, OrchestrationError, OrchestrationResult, StepError};
pub use execution_state::ExecutionState;
pub use orchestrator::DagOrchestrator;
pub use step::{StepExecutor, WorkflowStep};
pub use step_runner::{RunnerStats, StepRunner};
pub use types::{ExecutionReport, StepContext, StepOutcome, StepOutcomes, StepStatus};
