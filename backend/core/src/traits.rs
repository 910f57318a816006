use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::prompt::PromptTemplate;
use crate::schema::FeatureSchema;

/// An uploaded image, validated and ready to describe.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub data: Bytes,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl ImageInput {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// Image-understanding model that turns pixels into free text.
#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Provider name (e.g., "florence-2").
    fn name(&self) -> &str;

    /// Describe the scene. An empty string counts as a failed description.
    async fn describe(&self, image: &ImageInput) -> Result<String>;
}

/// Language model that reasons over a feature set and replies with (loosely) structured text.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Provider name (e.g., "nemotron").
    fn name(&self) -> &str;

    /// Return the raw reply text; it is expected to embed a JSON object.
    async fn reason(&self, features: &FeatureSchema, prompt: &PromptTemplate) -> Result<String>;
}
