//! Crate-level error type.
//!
//! Each layer keeps its own error enum; [`DagflowError`] unifies them for
//! callers that load configuration and run an orchestrator in one flow.

use crate::config::ConfigLoadError;
use crate::orchestration::errors::{ConfigurationError, OrchestrationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DagflowError {
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    #[error("Invalid workflow definition: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigLoadError),
}

pub type Result<T> = std::result::Result<T, DagflowError>;
