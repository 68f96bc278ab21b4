//! # Infrastructure Provisioning Workflow
//!
//! Five-stage provisioning pipeline run through [`DagOrchestrator`]:
//!
//! ```text
//! validate_provider -> plan_resources -> calculate_costs -> provision_resources -> configure_monitoring
//!                            \_____________________________________^
//! ```
//!
//! `provision_resources` depends on both the plan and the cost estimate. The
//! work of each stage is delegated to a [`ProvisioningBackend`].

use crate::config::OrchestratorConfig;
use crate::orchestration::{
    ConfigurationError, DagOrchestrator, OrchestrationResult, StepContext, StepExecutor,
    WorkflowStep,
};
use crate::workflows::WorkflowSummary;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Summary returned by [`InfrastructureProvisioningWorkflow::provision_with_validation`]
pub type ProvisioningSummary = WorkflowSummary;

/// Performs the work behind each provisioning stage.
///
/// Every method receives the stage's context: the caller's `provider_id` and
/// `resources`, plus `"<dependency>_result"` entries.
#[async_trait]
pub trait ProvisioningBackend: Send + Sync {
    async fn validate_provider(&self, context: &StepContext) -> anyhow::Result<Value>;
    async fn plan_resources(&self, context: &StepContext) -> anyhow::Result<Value>;
    async fn calculate_costs(&self, context: &StepContext) -> anyhow::Result<Value>;
    async fn provision_resources(&self, context: &StepContext) -> anyhow::Result<Value>;
    async fn configure_monitoring(&self, context: &StepContext) -> anyhow::Result<Value>;
}

/// The stages of the pipeline, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisioningStage {
    ValidateProvider,
    PlanResources,
    CalculateCosts,
    ProvisionResources,
    ConfigureMonitoring,
}

impl ProvisioningStage {
    pub const ALL: [ProvisioningStage; 5] = [
        ProvisioningStage::ValidateProvider,
        ProvisioningStage::PlanResources,
        ProvisioningStage::CalculateCosts,
        ProvisioningStage::ProvisionResources,
        ProvisioningStage::ConfigureMonitoring,
    ];

    pub fn step_name(self) -> &'static str {
        match self {
            ProvisioningStage::ValidateProvider => "validate_provider",
            ProvisioningStage::PlanResources => "plan_resources",
            ProvisioningStage::CalculateCosts => "calculate_costs",
            ProvisioningStage::ProvisionResources => "provision_resources",
            ProvisioningStage::ConfigureMonitoring => "configure_monitoring",
        }
    }

    pub fn dependencies(self) -> &'static [&'static str] {
        match self {
            ProvisioningStage::ValidateProvider => &[],
            ProvisioningStage::PlanResources => &["validate_provider"],
            ProvisioningStage::CalculateCosts => &["plan_resources"],
            ProvisioningStage::ProvisionResources => &["plan_resources", "calculate_costs"],
            ProvisioningStage::ConfigureMonitoring => &["provision_resources"],
        }
    }
}

/// Adapts one backend stage to [`StepExecutor`]
struct StageExecutor {
    backend: Arc<dyn ProvisioningBackend>,
    stage: ProvisioningStage,
}

#[async_trait]
impl StepExecutor for StageExecutor {
    async fn execute(&self, context: StepContext) -> anyhow::Result<Value> {
        match self.stage {
            ProvisioningStage::ValidateProvider => self.backend.validate_provider(&context).await,
            ProvisioningStage::PlanResources => self.backend.plan_resources(&context).await,
            ProvisioningStage::CalculateCosts => self.backend.calculate_costs(&context).await,
            ProvisioningStage::ProvisionResources => {
                self.backend.provision_resources(&context).await
            }
            ProvisioningStage::ConfigureMonitoring => {
                self.backend.configure_monitoring(&context).await
            }
        }
    }
}

pub struct InfrastructureProvisioningWorkflow {
    backend: Arc<dyn ProvisioningBackend>,
    config: OrchestratorConfig,
}

impl InfrastructureProvisioningWorkflow {
    pub fn new(backend: impl ProvisioningBackend + 'static) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    pub fn from_arc(backend: Arc<dyn ProvisioningBackend>) -> Self {
        Self {
            backend,
            config: OrchestratorConfig::default(),
        }
    }

    /// Run the pipeline with this concurrency bound and default step timeout
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// The pipeline's step declarations
    pub fn steps(&self) -> Vec<WorkflowStep> {
        ProvisioningStage::ALL
            .iter()
            .map(|&stage| {
                let executor = StageExecutor {
                    backend: Arc::clone(&self.backend),
                    stage,
                };
                WorkflowStep::new(stage.step_name(), executor)
                    .depends_on(stage.dependencies().iter().copied())
            })
            .collect()
    }

    pub fn orchestrator(&self) -> Result<DagOrchestrator, ConfigurationError> {
        DagOrchestrator::from_config(self.steps(), &self.config)
    }

    /// Provision `resources` with `provider_id`, validating and costing first
    pub async fn provision_with_validation(
        &self,
        provider_id: &str,
        resources: Vec<Value>,
    ) -> OrchestrationResult<ProvisioningSummary> {
        let orchestrator = self.orchestrator()?;

        let mut context = StepContext::new();
        context.insert("provider_id".to_string(), json!(provider_id));
        context.insert("resources".to_string(), Value::Array(resources));

        let outcomes = orchestrator.execute(context).await?;
        let summary = WorkflowSummary::from_outcomes(&outcomes);

        info!(
            provider_id = %provider_id,
            status = ?summary.status,
            "Provisioning workflow finished"
        );

        Ok(summary)
    }
}

impl std::fmt::Debug for InfrastructureProvisioningWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfrastructureProvisioningWorkflow")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Backend returning fixed responses shaped like a real provider's
#[derive(Debug, Clone, Default)]
pub struct StaticProvisioningBackend;

impl StaticProvisioningBackend {
    fn resources(context: &StepContext) -> anyhow::Result<&Vec<Value>> {
        context
            .get("resources")
            .and_then(Value::as_array)
            .context("context is missing a 'resources' array")
    }
}

#[async_trait]
impl ProvisioningBackend for StaticProvisioningBackend {
    async fn validate_provider(&self, context: &StepContext) -> anyhow::Result<Value> {
        let provider_id = context
            .get("provider_id")
            .context("context is missing 'provider_id'")?;
        Ok(json!({"validated": true, "provider_id": provider_id}))
    }

    async fn plan_resources(&self, context: &StepContext) -> anyhow::Result<Value> {
        let resources = Self::resources(context)?;
        Ok(json!({"plan": resources, "plan_id": "plan-123"}))
    }

    async fn calculate_costs(&self, _context: &StepContext) -> anyhow::Result<Value> {
        Ok(json!({"estimated_cost": 1000.0, "currency": "USD"}))
    }

    async fn provision_resources(&self, context: &StepContext) -> anyhow::Result<Value> {
        let resources = Self::resources(context)?;
        Ok(json!({"provisioned": resources.len(), "resource_ids": []}))
    }

    async fn configure_monitoring(&self, _context: &StepContext) -> anyhow::Result<Value> {
        Ok(json!({"monitoring_configured": true}))
    }
}
