//! # Structured Logging Module
//!
//! Environment-aware structured logging built on `tracing-subscriber`.
//!
//! The filter is taken from `RUST_LOG` when set, otherwise from the configured
//! level, otherwise from the detected environment.

use crate::config::{ConfigManager, LoggingConfig};
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific defaults
pub fn init_structured_logging() {
    init_logging(&LoggingConfig::default());
}

/// Initialize structured logging from configuration.
///
/// Only the first call in a process has any effect. If another global
/// subscriber is already installed it is left in place.
pub fn init_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let level = config
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment).to_string());
        let filter =
            || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

        let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter())
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(filter())
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already installed, keeping it");
            return;
        }

        tracing::info!(
            environment = %environment,
            level = %level,
            json = config.json,
            "Structured logging initialized"
        );
    });
}

/// Default log level for an environment
pub fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" => "warn",
        _ => "debug",
    }
}

/// Log structured data for step operations
pub fn log_step_operation(operation: &str, step_name: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        step_name = %step_name,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "STEP_OPERATION"
    );
}
