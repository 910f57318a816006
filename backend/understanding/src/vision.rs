//! Vision understanding: describe street photos using an image-to-text model.
//!
//! Two backends: the Hugging Face inference API (Florence-2) and any
//! OpenAI-compatible chat endpoint that accepts `image_url` content.
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use tracing::{debug, info};

use geoclass_core::defaults::{FLORENCE_API_URL, OPENAI_BASE_URL};
use geoclass_core::{DescriptionService, ImageInput};
use geoclass_logging::redact_sensitive_data;

const DESCRIBE_PROMPT: &str = "Describe this street-level photo in detail: road surface and \
markings, signs and their language, architecture, vegetation, terrain, climate, vehicles, \
and anything that hints at the country.";

/// Florence-2 behind the Hugging Face inference API.
pub struct FlorenceDescriber {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl FlorenceDescriber {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Florence HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            url: FLORENCE_API_URL.to_string(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl DescriptionService for FlorenceDescriber {
    fn name(&self) -> &str {
        "florence-2"
    }

    async fn describe(&self, image: &ImageInput) -> Result<String> {
        info!(bytes = image.data.len(), "[Vision] Describing image via Florence-2");
        let body = serde_json::json!({
            "inputs": STANDARD.encode(&image.data),
            "parameters": { "task": "image-to-text" }
        });
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Florence-2 HTTP request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Florence-2 returned {}: {}", status, redact_sensitive_data(&text));
        }
        let json: Value = resp.json().await.context("Failed to parse Florence-2 response")?;
        let description = florence_text(&json);
        debug!(description = %description, "[Vision] Florence-2 description");
        Ok(description)
    }
}

/// Pull the generated text out of the shapes the inference API is known to return.
pub fn florence_text(json: &Value) -> String {
    let text = match json {
        Value::Array(items) => items
            .first()
            .and_then(|first| first.get("generated_text"))
            .and_then(Value::as_str),
        Value::Object(_) => json.get("generated_text").and_then(Value::as_str),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    };
    text.unwrap_or("").to_string()
}

/// Any OpenAI-compatible vision chat endpoint.
pub struct OpenAiVisionDescriber {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiVisionDescriber {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build vision HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl DescriptionService for OpenAiVisionDescriber {
    fn name(&self) -> &str {
        "openai-vision"
    }

    async fn describe(&self, image: &ImageInput) -> Result<String> {
        info!("[Vision] Describing image via {}", self.model);
        let b64 = STANDARD.encode(&image.data);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": DESCRIBE_PROMPT },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:{};base64,{}", image.mime_type, b64) } }
                ]
            }],
            "max_tokens": 512
        });
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Vision HTTP request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Vision endpoint returned {}: {}", status, redact_sensitive_data(&text));
        }
        let json: Value = resp.json().await?;
        Ok(json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string())
    }
}
