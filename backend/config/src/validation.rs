//! Config validation: schema checks with user-friendly error messages.

use crate::env::{ENV_FLORENCE_KEY, ENV_NVIDIA_KEY};
use crate::schema::{DescriptionProvider, GeoclassConfig};
use thiserror::Error;

/// Timeouts above this are accepted but flagged.
const LONG_TIMEOUT_SECS: u64 = 120;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All errors on one line each.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate value ranges. Credentials are checked separately by
/// [`require_credentials`] so offline runs can still validate a config.
pub fn validate(config: &GeoclassConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_description(config, &mut report);
    validate_reasoning(config, &mut report);
    report
}

/// Both upstream services need a key; report each one that is absent.
pub fn require_credentials(config: &GeoclassConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    if config.description.api_key().is_none() {
        report.error(
            "description.apiKey",
            format!("Description API key is required (set {ENV_FLORENCE_KEY})"),
        );
    }
    if config.reasoning.api_key().is_none() {
        report.error(
            "reasoning.apiKey",
            format!("Reasoning API key is required (set {ENV_NVIDIA_KEY})"),
        );
    }
    report
}

fn validate_server(config: &GeoclassConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.port == Some(0) {
        report.error("server.port", "port must be > 0");
    }
    if let Some(bind) = &server.bind {
        if bind.parse::<std::net::IpAddr>().is_err() {
            report.error("server.bind", format!("'{bind}' is not an IP address"));
        }
    }
    if server.max_upload_bytes == Some(0) {
        report.error("server.maxUploadBytes", "maxUploadBytes must be > 0");
    }
}

fn validate_description(config: &GeoclassConfig, report: &mut ValidationReport) {
    let description = &config.description;
    check_timeout("description.timeoutSecs", description.timeout_secs, report);
    check_url("description.url", description.url.as_deref(), report);
    if description.provider() == DescriptionProvider::Openai
        && description.model.as_deref().is_some_and(|m| m.trim().is_empty())
    {
        report.error("description.model", "model cannot be empty");
    }
}

fn validate_reasoning(config: &GeoclassConfig, report: &mut ValidationReport) {
    let reasoning = &config.reasoning;
    check_timeout("reasoning.timeoutSecs", reasoning.timeout_secs, report);
    check_url("reasoning.baseUrl", reasoning.base_url.as_deref(), report);

    if let Some(t) = reasoning.temperature {
        if !(0.0..=2.0).contains(&t) {
            report.error("reasoning.temperature", "temperature must be within 0.0..=2.0");
        }
    }
    if let Some(p) = reasoning.top_p {
        if !(p > 0.0 && p <= 1.0) {
            report.error("reasoning.topP", "topP must be within (0.0, 1.0]");
        }
    }
    if reasoning.max_tokens == Some(0) {
        report.error("reasoning.maxTokens", "maxTokens must be > 0");
    }
    if reasoning.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
        report.error("reasoning.model", "model cannot be empty");
    }
}

fn check_timeout(path: &str, timeout_secs: Option<u64>, report: &mut ValidationReport) {
    match timeout_secs {
        Some(0) => report.error(path, "timeout must be > 0"),
        Some(secs) if secs > LONG_TIMEOUT_SECS => report.warn(
            path,
            format!("timeout of {secs}s keeps clients waiting; consider <= {LONG_TIMEOUT_SECS}s"),
        ),
        _ => {}
    }
}

fn check_url(path: &str, url: Option<&str>, report: &mut ValidationReport) {
    if let Some(url) = url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error(path, format!("'{url}' must start with http:// or https://"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;

    #[test]
    fn defaulted_config_is_valid() {
        let report = validate(&apply_all_defaults(GeoclassConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn out_of_range_values_are_errors() {
        let mut cfg = GeoclassConfig::default();
        cfg.server.port = Some(0);
        cfg.reasoning.temperature = Some(3.5);
        cfg.reasoning.top_p = Some(0.0);
        cfg.description.timeout_secs = Some(0);
        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "server.port",
                "description.timeoutSecs",
                "reasoning.temperature",
                "reasoning.topP"
            ]
        );
    }

    #[test]
    fn bad_bind_and_url() {
        let mut cfg = GeoclassConfig::default();
        cfg.server.bind = Some("localhost:80".into());
        cfg.reasoning.base_url = Some("integrate.api.nvidia.com".into());
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 2);
        assert!(report.summary().contains("server.bind"));
    }

    #[test]
    fn long_timeout_is_a_warning() {
        let mut cfg = GeoclassConfig::default();
        cfg.reasoning.timeout_secs = Some(600);
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "reasoning.timeoutSecs");
    }

    #[test]
    fn missing_credentials_are_reported_together() {
        let report = require_credentials(&GeoclassConfig::default());
        assert_eq!(report.errors.len(), 2);
        assert!(report.summary().contains("NVIDIA_API_KEY"));

        let mut cfg = GeoclassConfig::default();
        cfg.description.api_key = Some("hf_x".into());
        cfg.reasoning.api_key = Some("nvapi-y".into());
        assert!(require_credentials(&cfg).is_valid());
    }
}
