//! `autoinspect-config`: runtime configuration for the AutoInspect service.
//!
//! Provides:
//! - Typed config schema (server, storage, vision, report, logging)
//! - YAML read/write
//! - `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution
//! - Config redaction for safe logging/display
//! - Default value application
//! - Validation report of errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw, write_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::{
    AutoInspectConfig, LoggingConfig, ReportConfig, ServerConfig, StorageConfig, VisionConfig,
    VisionProviderKind,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute env vars, and apply defaults.
///
/// This is the main entry point for loading a config at runtime. The
/// validation report is logged; callers decide whether errors are fatal.
pub async fn load_and_prepare(path: &Path) -> Result<AutoInspectConfig> {
    let raw = load_raw(path).await?;
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;
    prepare(value)
}

/// Same as [`load_and_prepare`] with an explicit variable map.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<AutoInspectConfig> {
    let raw = load_raw(path).await?;
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;
    prepare(value)
}

fn prepare(value: Value) -> Result<AutoInspectConfig> {
    let config: AutoInspectConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}

/// Redacted JSON snapshot of a config, safe to log or print.
pub fn redacted_snapshot(config: &AutoInspectConfig) -> Result<Value> {
    let value = serde_json::to_value(config).context("Failed to serialize config snapshot")?;
    Ok(redact(&value))
}
