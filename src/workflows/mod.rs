//! # Workflows
//!
//! Ready-made workflows assembled from [`WorkflowStep`](crate::orchestration::WorkflowStep)s,
//! plus the summary shape they report.

pub mod agent;
pub mod infrastructure;

use crate::orchestration::{StepOutcomes, StepStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use agent::{AgentTaskExecutor, AgentWorkflowOrchestrator, SequentialStep};
pub use infrastructure::{
    InfrastructureProvisioningWorkflow, ProvisioningBackend, ProvisioningStage,
    ProvisioningSummary, StaticProvisioningBackend,
};

/// Overall verdict of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Completed,
    Failed,
}

/// Per-step entry of a [`WorkflowSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub status: StepStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Caller-facing digest of a run: `completed` only if every step completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub status: WorkflowStatus,
    pub steps: BTreeMap<String, StepSummary>,
}

impl WorkflowSummary {
    pub fn from_outcomes(outcomes: &StepOutcomes) -> Self {
        let status = if outcomes.values().all(|o| o.is_completed()) {
            WorkflowStatus::Completed
        } else {
            WorkflowStatus::Failed
        };

        let steps = outcomes
            .iter()
            .map(|(name, outcome)| {
                let summary = StepSummary {
                    status: outcome.status,
                    result: outcome.result.clone(),
                    error: outcome.error.clone(),
                };
                (name.clone(), summary)
            })
            .collect();

        Self { status, steps }
    }

    pub fn is_completed(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}
