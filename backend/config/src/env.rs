//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside YAML string values, resolved at load
//!   time. Only uppercase `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}`
//!   escapes to a literal `${VAR}`.
//! - Well-known variables (`GEOCLASS_PORT`, `NVIDIA_API_KEY`, ...) that
//!   override whatever the file says.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::schema::GeoclassConfig;

/// `${VAR}` with an optional leading `$` marking the escaped form.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid regex"));

pub const ENV_BIND: &str = "GEOCLASS_BIND";
pub const ENV_PORT: &str = "GEOCLASS_PORT";
pub const ENV_FLORENCE_KEY: &str = "FLORENCE_API_KEY";
/// Accepted when `FLORENCE_API_KEY` is unset.
pub const ENV_HF_KEY: &str = "HF_API_KEY";
pub const ENV_NVIDIA_KEY: &str = "NVIDIA_API_KEY";
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";
pub const ENV_LOG_DIR: &str = "GEOCLASS_LOG_DIR";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config value tree from the process environment.
///
/// Fails if any referenced variable is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &process_env(), "")
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply the well-known environment overrides from the process environment.
pub fn apply_env_overrides(config: GeoclassConfig) -> GeoclassConfig {
    apply_env_overrides_with(config, &process_env())
}

/// Apply the well-known environment overrides from a provided map.
///
/// Empty values are ignored. An unparseable port is logged and skipped.
pub fn apply_env_overrides_with(
    mut config: GeoclassConfig,
    env: &HashMap<String, String>,
) -> GeoclassConfig {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(bind) = get(ENV_BIND) {
        config.server.bind = Some(bind.to_string());
    }
    if let Some(port) = get(ENV_PORT) {
        match port.parse::<u16>() {
            Ok(port) => config.server.port = Some(port),
            Err(_) => warn!(var = ENV_PORT, value = port, "Ignoring invalid port override"),
        }
    }
    if let Some(key) = get(ENV_FLORENCE_KEY).or_else(|| get(ENV_HF_KEY)) {
        config.description.api_key = Some(key.to_string());
    }
    if let Some(key) = get(ENV_NVIDIA_KEY) {
        config.reasoning.api_key = Some(key.to_string());
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging.level = Some(level.to_string());
    }
    if let Some(dir) = get(ENV_LOG_DIR) {
        config.logging.dir = Some(PathBuf::from(dir));
    }

    debug!("Applied environment overrides");
    config
}
