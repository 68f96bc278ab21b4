//! Configuration Error Types
//!
//! Errors raised while loading and validating orchestrator settings.

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = std::result::Result<T, ConfigLoadError>;

/// Configuration loading errors with enough context to locate the bad input
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The configuration directory does not exist or is not a directory
    #[error("Configuration directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// A source could not be read or parsed, or the merged result did not deserialize
    #[error("Failed to load configuration for environment '{environment}': {source}")]
    Source {
        environment: String,
        #[source]
        source: config::ConfigError,
    },

    /// A loaded value is outside its permitted range
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigLoadError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl ToString,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            context: context.into(),
        }
    }
}
