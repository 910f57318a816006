//! Wiring from resolved config to concrete services.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use geoclass_config::{DescriptionProvider, GeoclassConfig};
use geoclass_core::{DescriptionService, ReasoningService};
use geoclass_gateway::CredentialStatus;
use geoclass_pipeline::{ClassificationPipeline, StageTimeouts};
use geoclass_reasoning::providers::chat::SamplingParams;
use geoclass_reasoning::{ChatCompletionsReasoner, MockDescriber, MockReasoner};
use geoclass_understanding::{FlorenceDescriber, OpenAiVisionDescriber};

const OFFLINE_REASON: &str = "offline mode: upstream services disabled";

/// Build the pipeline against the configured upstream services.
pub fn build_pipeline(config: &GeoclassConfig) -> Result<ClassificationPipeline> {
    let describer = build_describer(config)?;
    let reasoner = build_reasoner(config)?;
    info!(
        describer = describer.name(),
        reasoner = reasoner.name(),
        model = config.reasoning.model(),
        "Services configured"
    );
    Ok(ClassificationPipeline::new(describer, reasoner).with_timeouts(timeouts(config)))
}

/// A pipeline whose upstream calls always fail, so every answer comes from
/// the deterministic fallback.
pub fn offline_pipeline(config: &GeoclassConfig) -> ClassificationPipeline {
    info!("Offline mode: using fallback predictor only");
    ClassificationPipeline::new(
        Arc::new(MockDescriber::failing(OFFLINE_REASON)),
        Arc::new(MockReasoner::failing(OFFLINE_REASON)),
    )
    .with_timeouts(timeouts(config))
}

pub fn credential_status(config: &GeoclassConfig) -> CredentialStatus {
    CredentialStatus {
        florence: config.description.api_key().is_some(),
        nvidia: config.reasoning.api_key().is_some(),
    }
}

fn timeouts(config: &GeoclassConfig) -> StageTimeouts {
    StageTimeouts {
        describe: config.description.timeout(),
        reason: config.reasoning.timeout(),
    }
}

fn build_describer(config: &GeoclassConfig) -> Result<Arc<dyn DescriptionService>> {
    let description = &config.description;
    let api_key = description
        .api_key()
        .context("Description API key is not configured")?;

    Ok(match description.provider() {
        DescriptionProvider::Florence => Arc::new(
            FlorenceDescriber::new(api_key, description.timeout())?.with_url(description.url()),
        ),
        DescriptionProvider::Openai => Arc::new(
            OpenAiVisionDescriber::new(api_key, description.model(), description.timeout())?
                .with_base_url(description.url()),
        ),
    })
}

fn build_reasoner(config: &GeoclassConfig) -> Result<Arc<dyn ReasoningService>> {
    let reasoning = &config.reasoning;
    let api_key = reasoning
        .api_key()
        .context("Reasoning API key is not configured")?;

    let reasoner = ChatCompletionsReasoner::new(api_key, reasoning.timeout())?
        .with_base_url(reasoning.base_url())
        .with_model(reasoning.model())
        .with_params(SamplingParams {
            temperature: reasoning.temperature(),
            max_tokens: reasoning.max_tokens(),
            top_p: reasoning.top_p(),
        });
    Ok(Arc::new(reasoner))
}
