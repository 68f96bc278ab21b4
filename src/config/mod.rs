//! # Orchestrator Configuration
//!
//! Settings that tune the orchestrator without touching step declarations:
//! the concurrency bound, the timeout applied to steps that do not declare one,
//! and logging output.
//!
//! Values are layered (defaults, then files, then environment variables) by
//! [`ConfigManager`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dagflow_core::config::ConfigManager;
//! use dagflow_core::orchestration::DagOrchestrator;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let orchestrator = DagOrchestrator::from_config(vec![], manager.config())?;
//! assert!(orchestrator.max_concurrency() >= 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{DEFAULT_MAX_CONCURRENCY, DEFAULT_STEP_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigLoadError, ConfigResult};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Upper bound on concurrently executing steps
    pub max_concurrency: usize,

    /// Timeout for steps that do not declare their own
    pub default_step_timeout_ms: u64,

    pub logging: LoggingConfig,
}

/// Logging output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive such as `info` or `dagflow_core=debug`; `RUST_LOG` takes precedence
    pub level: Option<String>,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            default_step_timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            logging: LoggingConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn default_step_timeout(&self) -> Duration {
        Duration::from_millis(self.default_step_timeout_ms)
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_default_step_timeout(mut self, timeout: Duration) -> Self {
        self.default_step_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Reject values the orchestrator could never run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_concurrency == 0 {
            return Err(ConfigLoadError::invalid_value(
                "max_concurrency",
                self.max_concurrency,
                "concurrency bound must be at least 1",
            ));
        }

        if self.default_step_timeout_ms == 0 {
            return Err(ConfigLoadError::invalid_value(
                "default_step_timeout_ms",
                self.default_step_timeout_ms,
                "default step timeout must be greater than 0",
            ));
        }

        if let Some(level) = &self.logging.level {
            if level.trim().is_empty() {
                return Err(ConfigLoadError::invalid_value(
                    "logging.level",
                    level,
                    "log level must not be blank when set",
                ));
            }
        }

        Ok(())
    }
}
