//! # Step Declarations
//!
//! A [`WorkflowStep`] names one unit of work, the executor that performs it, the
//! steps it depends on, and how long it may run. Declarations are immutable once
//! handed to the orchestrator.
//!
//! Executors implement [`StepExecutor`]. Any async closure taking a
//! [`StepContext`] and returning `anyhow::Result<serde_json::Value>` already does,
//! and [`WorkflowStep::from_fn`] wraps one directly:
//!
//! ```rust
//! use dagflow_core::orchestration::{StepContext, WorkflowStep};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let step = WorkflowStep::from_fn("plan", |ctx: StepContext| async move {
//!     let region = ctx.get("region").cloned().unwrap_or(json!("us-east-1"));
//!     Ok(json!({ "region": region }))
//! })
//! .depends_on(["validate"])
//! .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(step.name(), "plan");
//! assert_eq!(step.dependencies(), ["validate".to_string()]);
//! ```

use crate::orchestration::types::StepContext;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Performs the work of a single step
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, context: StepContext) -> anyhow::Result<serde_json::Value>;
}

#[async_trait]
impl<F, Fut> StepExecutor for F
where
    F: Fn(StepContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
{
    async fn execute(&self, context: StepContext) -> anyhow::Result<serde_json::Value> {
        (self)(context).await
    }
}

/// Immutable description of one unit of work
#[derive(Clone)]
pub struct WorkflowStep {
    name: String,
    executor: Arc<dyn StepExecutor>,
    depends_on: Vec<String>,
    timeout: Option<Duration>,
}

impl WorkflowStep {
    pub fn new(name: impl Into<String>, executor: impl StepExecutor + 'static) -> Self {
        Self::from_arc(name, Arc::new(executor))
    }

    /// Build a step from an async closure
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(StepContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
    {
        Self::new(name, f)
    }

    /// Build a step around an executor that is shared with other steps
    pub fn from_arc(name: impl Into<String>, executor: Arc<dyn StepExecutor>) -> Self {
        Self {
            name: name.into(),
            executor,
            depends_on: Vec::new(),
            timeout: None,
        }
    }

    /// Declare dependencies; repeated names keep their first position
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dep in dependencies {
            let dep = dep.into();
            if !self.depends_on.contains(&dep) {
                self.depends_on.push(dep);
            }
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    /// Explicit timeout, if one was declared
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn executor(&self) -> Arc<dyn StepExecutor> {
        Arc::clone(&self.executor)
    }
}

impl fmt::Debug for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowStep")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
