use thiserror::Error;

/// Top-level error type for the classification pipeline.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Missing, non-image, or oversized upload. Surfaced as a client error.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream service unavailable ({service}): {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// No JSON object could be located or parsed in a model reply.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// The reply parsed, but required fields were missing or mistyped.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

impl ClassifyError {
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }
}
