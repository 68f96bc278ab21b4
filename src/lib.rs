#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # dagflow-core
//!
//! Dependency-aware parallel step executor.
//!
//! ## Overview
//!
//! A workflow is a set of named steps, each wrapping an async operation and
//! optionally depending on other steps. [`DagOrchestrator`] validates the
//! dependency graph up front, then runs every step exactly once, as early as its
//! dependencies allow, under a global concurrency bound and a per-step timeout.
//! Each step receives the caller's context plus the results of its direct
//! dependencies under `"<dependency>_result"` keys.
//!
//! Failures are contained: a step that errors, panics, or times out is recorded
//! as `failed`, and the rest of the workflow carries on.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Step declarations, graph validation, and the scheduler
//! - [`workflows`] - Ready-made workflows built on the orchestrator
//! - [`config`] - Layered configuration loading
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-level error type
//! - [`constants`] - Defaults and well-known names
//!
//! ## Quick Start
//!
//! ```rust
//! use dagflow_core::{DagOrchestrator, StepContext, WorkflowStep};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let orchestrator = DagOrchestrator::with_max_concurrency(
//!     vec![
//!         WorkflowStep::from_fn("a", |_ctx: StepContext| async { Ok(json!(1)) }),
//!         WorkflowStep::from_fn("b", |_ctx: StepContext| async { Ok(json!(2)) }),
//!         WorkflowStep::from_fn("sum", |ctx: StepContext| async move {
//!             let a = ctx["a_result"].as_i64().unwrap_or_default();
//!             let b = ctx["b_result"].as_i64().unwrap_or_default();
//!             Ok(json!(a + b))
//!         })
//!         .depends_on(["a", "b"])
//!         .with_timeout(Duration::from_secs(5)),
//!     ],
//!     4,
//! )?;
//!
//! let outcomes = orchestrator.execute(StepContext::new()).await?;
//! assert_eq!(outcomes["sum"].result, Some(json!(3)));
//! # Ok::<(), dagflow_core::DagflowError>(())
//! # }).unwrap();
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod orchestration;
pub mod workflows;

pub use config::{ConfigManager, LoggingConfig, OrchestratorConfig};
pub use error::{DagflowError, Result};
pub use orchestration::{
    ConfigurationError, DagOrchestrator, ExecutionReport, OrchestrationError, StepContext,
    StepError, StepExecutor, StepOutcome, StepOutcomes, StepStatus, WorkflowStep,
};
pub use workflows::{
    AgentTaskExecutor, AgentWorkflowOrchestrator, InfrastructureProvisioningWorkflow,
    ProvisioningBackend, StaticProvisioningBackend, WorkflowStatus, WorkflowSummary,
};
