use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use geoclass_core::defaults::{MAX_TOKENS, REASONING_BASE_URL, REASONING_MODEL, TEMPERATURE, TOP_P};
use geoclass_core::{FeatureSchema, PromptTemplate, ReasoningService};
use geoclass_logging::redact_sensitive_data;

/// Sampling parameters for the reasoning request.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
        }
    }
}

/// Reasoning model behind an OpenAI-compatible `/chat/completions` endpoint
/// (NVIDIA integrate API by default).
pub struct ChatCompletionsReasoner {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    params: SamplingParams,
}

impl ChatCompletionsReasoner {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build reasoning HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: REASONING_BASE_URL.to_string(),
            model: REASONING_MODEL.to_string(),
            params: SamplingParams::default(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    fn build_request(&self, features: &FeatureSchema, prompt: &PromptTemplate) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.render_user(features),
                },
            ],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            top_p: self.params.top_p,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[async_trait]
impl ReasoningService for ChatCompletionsReasoner {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn reason(&self, features: &FeatureSchema, prompt: &PromptTemplate) -> Result<String> {
        let start = Instant::now();
        let body = self.build_request(features, prompt);

        debug!(model = %self.model, "Sending request to reasoning model");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Reasoning HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Reasoning model returned {}: {}",
                status,
                redact_sensitive_data(&error_body)
            );
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse reasoning model response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("Reasoning model returned no choices")?;

        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "Reasoning model responded"
        );
        Ok(content)
    }
}
