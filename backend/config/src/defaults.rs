//! Config defaults: applies default values to parsed config.

use geoclass_core::defaults;

use crate::schema::{DescriptionProvider, GeoclassConfig};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Upload cap enforced by the gateway (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = defaults::MAX_UPLOAD_BYTES;

/// Per-stage upstream timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = defaults::STAGE_TIMEOUT_SECS;

pub const DEFAULT_FLORENCE_URL: &str = defaults::FLORENCE_API_URL;
pub const DEFAULT_OPENAI_BASE_URL: &str = defaults::OPENAI_BASE_URL;
pub const DEFAULT_VISION_MODEL: &str = defaults::VISION_MODEL;

pub const DEFAULT_REASONING_BASE_URL: &str = defaults::REASONING_BASE_URL;
pub const DEFAULT_REASONING_MODEL: &str = defaults::REASONING_MODEL;
pub const DEFAULT_TEMPERATURE: f32 = defaults::TEMPERATURE;
pub const DEFAULT_MAX_TOKENS: u32 = defaults::MAX_TOKENS;
pub const DEFAULT_TOP_P: f32 = defaults::TOP_P;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: GeoclassConfig) -> GeoclassConfig {
    let config = apply_server_defaults(config);
    let config = apply_description_defaults(config);
    let config = apply_reasoning_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: GeoclassConfig) -> GeoclassConfig {
    let server = &mut config.server;
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.max_upload_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    config
}

/// The URL default depends on the provider.
fn apply_description_defaults(mut config: GeoclassConfig) -> GeoclassConfig {
    let description = &mut config.description;
    let provider = *description.provider.get_or_insert_with(Default::default);
    if description.url.is_none() {
        description.url = Some(
            match provider {
                DescriptionProvider::Florence => DEFAULT_FLORENCE_URL,
                DescriptionProvider::Openai => DEFAULT_OPENAI_BASE_URL,
            }
            .to_string(),
        );
    }
    if provider == DescriptionProvider::Openai && description.model.is_none() {
        description.model = Some(DEFAULT_VISION_MODEL.to_string());
    }
    description.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_reasoning_defaults(mut config: GeoclassConfig) -> GeoclassConfig {
    let reasoning = &mut config.reasoning;
    reasoning
        .base_url
        .get_or_insert_with(|| DEFAULT_REASONING_BASE_URL.to_string());
    reasoning
        .model
        .get_or_insert_with(|| DEFAULT_REASONING_MODEL.to_string());
    reasoning.temperature.get_or_insert(DEFAULT_TEMPERATURE);
    reasoning.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    reasoning.top_p.get_or_insert(DEFAULT_TOP_P);
    reasoning.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_logging_defaults(mut config: GeoclassConfig) -> GeoclassConfig {
    config
        .logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}
