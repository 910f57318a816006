//! `geoclass-config`: runtime configuration for the geoclass service.
//!
//! Provides:
//! - Typed config schema (server, description, reasoning, logging)
//! - YAML loading
//! - `${ENV_VAR}` substitution and well-known env overrides
//! - Default value application
//! - Validation and credential checks
//! - Config redaction for safe logging/display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_file_path, load_config, parse_config};
pub use redact::redact;
pub use schema::{
    DescriptionConfig, DescriptionProvider, GeoclassConfig, LoggingConfig, ReasoningConfig,
    ServerConfig,
};
pub use validation::{require_credentials, validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file and resolve it: env substitution, env overrides,
/// defaults, and range validation. Credentials are not required.
pub async fn load(path: &Path) -> Result<GeoclassConfig> {
    let raw_config = load_config(path).await?;
    let config = prepare(raw_config)?;
    let report = validate(&config);
    log_report(&report);
    if !report.is_valid() {
        bail!("Invalid configuration:\n{}", report.summary());
    }
    Ok(config)
}

/// Load a config for serving: like [`load`], but fails fast when either
/// upstream API key is missing.
pub async fn load_and_prepare(path: &Path) -> Result<GeoclassConfig> {
    let config = load(path).await?;
    let credentials = require_credentials(&config);
    log_report(&credentials);
    if !credentials.is_valid() {
        bail!("Missing credentials:\n{}", credentials.summary());
    }
    Ok(config)
}

/// Substitute `${VAR}` references, then layer env overrides and defaults on top.
fn prepare(raw_config: GeoclassConfig) -> Result<GeoclassConfig> {
    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: GeoclassConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    Ok(apply_all_defaults(apply_env_overrides(config)))
}

fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}
