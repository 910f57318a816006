//! Typed configuration schema.
//!
//! Every field is optional so a partial YAML file (or none at all) parses;
//! [`crate::defaults::apply_all_defaults`] fills the gaps afterwards and the
//! accessor methods fall back to the same constants.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoclassConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Image description service (stage 1)
    #[serde(default)]
    pub description: DescriptionConfig,

    /// Reasoning model (stage 3)
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

impl ServerConfig {
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Which image-to-text backend to call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionProvider {
    /// Florence-2 on the Hugging Face inference API
    #[default]
    Florence,
    /// Any OpenAI-compatible vision chat endpoint
    Openai,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<DescriptionProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Inference URL (Florence) or API base URL (OpenAI-compatible)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Model name; only used by the OpenAI-compatible provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl DescriptionConfig {
    pub fn provider(&self) -> DescriptionProvider {
        self.provider.unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(match self.provider() {
            DescriptionProvider::Florence => DEFAULT_FLORENCE_URL,
            DescriptionProvider::Openai => DEFAULT_OPENAI_BASE_URL,
        })
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Non-empty key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ReasoningConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_REASONING_BASE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_REASONING_MODEL)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn top_p(&self) -> f32 {
        self.top_p.unwrap_or(DEFAULT_TOP_P)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for the rolling NDJSON log; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_camel_case_yaml() {
        let yaml = r#"
server:
  port: 9000
  maxUploadBytes: 2048
description:
  provider: openai
  apiKey: sk-test
reasoning:
  maxTokens: 300
  topP: 0.5
"#;
        let config: GeoclassConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port(), 9000);
        assert_eq!(config.server.max_upload_bytes(), 2048);
        assert_eq!(config.server.bind(), DEFAULT_BIND);
        assert_eq!(config.description.provider(), DescriptionProvider::Openai);
        assert_eq!(config.description.url(), DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.reasoning.max_tokens(), 300);
        assert_eq!(config.reasoning.top_p(), 0.5);
        assert_eq!(config.reasoning.model(), DEFAULT_REASONING_MODEL);
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let config: GeoclassConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, GeoclassConfig::default());
        assert_eq!(config.description.provider(), DescriptionProvider::Florence);
        assert_eq!(config.reasoning.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let mut config = GeoclassConfig::default();
        config.reasoning.api_key = Some("  ".into());
        assert_eq!(config.reasoning.api_key(), None);
    }
}
