//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are merged in increasing
//! order of precedence:
//!
//! 1. built-in defaults
//! 2. `<dir>/dagflow.{toml,yaml,json}` (optional)
//! 3. `<dir>/dagflow.<environment>.{toml,yaml,json}` (optional)
//! 4. `DAGFLOW__*` environment variables, e.g. `DAGFLOW__MAX_CONCURRENCY=4` or
//!    `DAGFLOW__LOGGING__JSON=true`

use super::error::{ConfigLoadError, ConfigResult};
use super::OrchestratorConfig;
use crate::constants::env as env_keys;
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_STEM: &str = "dagflow";
const DEFAULT_CONFIG_DIRECTORY: &str = "config";

/// Loaded, validated configuration together with where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: OrchestratorConfig,
    environment: String,
    config_directory: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection from `./config`
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::build(config_dir, environment, None)
    }

    /// Like [`load_from_directory_with_env`](Self::load_from_directory_with_env), but
    /// reads `DAGFLOW__*` overrides from `variables` instead of the process environment
    pub fn load_with_env_vars(
        config_dir: Option<PathBuf>,
        environment: &str,
        variables: HashMap<String, String>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::build(config_dir, environment, Some(variables))
    }

    fn build(
        config_dir: Option<PathBuf>,
        environment: &str,
        variables: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let environment = environment.to_lowercase();
        let source_error = |source: config::ConfigError| ConfigLoadError::Source {
            environment: environment.clone(),
            source,
        };

        let config_directory = match config_dir {
            Some(dir) if dir.is_dir() => Some(dir),
            Some(dir) => return Err(ConfigLoadError::DirectoryNotFound { path: dir }),
            None => {
                let dir = PathBuf::from(DEFAULT_CONFIG_DIRECTORY);
                dir.is_dir().then_some(dir)
            }
        };

        let mut builder = Config::builder()
            .add_source(Config::try_from(&OrchestratorConfig::default()).map_err(source_error)?);

        if let Some(dir) = &config_directory {
            debug!(
                environment = %environment,
                directory = %dir.display(),
                "Loading configuration files"
            );
            builder = builder
                .add_source(File::with_name(&Self::file_base(dir, None)).required(false))
                .add_source(
                    File::with_name(&Self::file_base(dir, Some(&environment))).required(false),
                );
        }

        let env_source = Environment::with_prefix(env_keys::CONFIG_PREFIX)
            .prefix_separator(env_keys::CONFIG_SEPARATOR)
            .separator(env_keys::CONFIG_SEPARATOR)
            .try_parsing(true)
            .source(variables);

        let config: OrchestratorConfig = builder
            .add_source(env_source)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(source_error)?;

        config.validate()?;

        info!(
            environment = %environment,
            max_concurrency = config.max_concurrency,
            default_step_timeout_ms = config.default_step_timeout_ms,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment,
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Directory files were read from, if one was found
    pub fn config_directory(&self) -> Option<&Path> {
        self.config_directory.as_deref()
    }

    /// Detect current environment: `DAGFLOW_ENV || APP_ENV || 'development'`
    pub fn detect_environment() -> String {
        env::var(env_keys::DAGFLOW_ENV)
            .or_else(|_| env::var(env_keys::APP_ENV))
            .unwrap_or_else(|_| env_keys::DEFAULT_ENVIRONMENT.to_string())
            .to_lowercase()
    }

    fn file_base(dir: &Path, environment: Option<&str>) -> String {
        let stem = match environment {
            Some(environment) => format!("{CONFIG_FILE_STEM}.{environment}"),
            None => CONFIG_FILE_STEM.to_string(),
        };
        dir.join(stem).to_string_lossy().into_owned()
    }
}
