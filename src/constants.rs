//! # System Constants
//!
//! Defaults and well-known names that define the operational boundaries of the
//! orchestrator.

use std::time::Duration;

/// Concurrency bound applied when none is supplied
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Per-step timeout applied to steps that do not declare one
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 60_000;

/// Suffix of the context key under which a dependency's result is exposed
pub const RESULT_KEY_SUFFIX: &str = "_result";

/// Context key used by sequential agent workflows for the previous result
pub const LAST_RESULT_KEY: &str = "last_result";

/// Context key under which `"<dependency>_result"` values are exposed
pub fn result_key(dependency: &str) -> String {
    format!("{dependency}{RESULT_KEY_SUFFIX}")
}

/// Environment variables consulted by configuration and logging
pub mod env {
    /// Primary environment selector
    pub const DAGFLOW_ENV: &str = "DAGFLOW_ENV";
    /// Fallback environment selector
    pub const APP_ENV: &str = "APP_ENV";
    /// Prefix for configuration overrides, e.g. `DAGFLOW__MAX_CONCURRENCY=4`
    pub const CONFIG_PREFIX: &str = "DAGFLOW";
    pub const CONFIG_SEPARATOR: &str = "__";
    pub const DEFAULT_ENVIRONMENT: &str = "development";
}

/// Operation names used in structured step logs
pub mod operations {
    pub const STEP_DISPATCHED: &str = "step.dispatched";
    pub const STEP_COMPLETED: &str = "step.completed";
    pub const STEP_FAILED: &str = "step.failed";
    pub const STEP_TIMED_OUT: &str = "step.timed_out";
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
}
