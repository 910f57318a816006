use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use geoclass_core::{DescriptionService, FeatureSchema, ImageInput, PromptTemplate, ReasoningService};

/// What a mock service does when called.
#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
}

/// A description service that returns a canned description (or fails).
#[derive(Debug, Clone)]
pub struct MockDescriber {
    behavior: Behavior,
    delay: Option<Duration>,
}

impl MockDescriber {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Reply(description.into()),
            delay: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            delay: None,
        }
    }

    /// Sleep before answering; used to exercise stage timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl DescriptionService for MockDescriber {
    fn name(&self) -> &str {
        "mock-describer"
    }

    async fn describe(&self, _image: &ImageInput) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(message) => bail!("{message}"),
        }
    }
}

/// A reasoning service that returns a canned reply (or fails).
#[derive(Debug, Clone)]
pub struct MockReasoner {
    behavior: Behavior,
    delay: Option<Duration>,
}

impl MockReasoner {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Reply(reply.into()),
            delay: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ReasoningService for MockReasoner {
    fn name(&self) -> &str {
        "mock-reasoner"
    }

    async fn reason(&self, _features: &FeatureSchema, _prompt: &PromptTemplate) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(message) => bail!("{message}"),
        }
    }
}
