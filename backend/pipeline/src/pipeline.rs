//! The classification pipeline.
//!
//! describe → extract → reason → repair → (fallback) → assemble, one stage
//! after the other. The two remote calls are each bounded by a timeout and
//! tried exactly once; any failure switches to the deterministic fallback
//! path instead of surfacing an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use geoclass_core::defaults::STAGE_TIMEOUT_SECS;
use geoclass_core::{
    ClassificationResponse, ClassifyError, DescriptionService, FeatureSchema, ImageInput,
    Prediction, PromptTemplate, ReasoningService,
};
use geoclass_logging::{PipelineEvent, PipelineEventLogger};
use geoclass_reasoning::{fallback_prediction, repair, resolve_non_answer};
use geoclass_understanding::extract;

use crate::assembler::assemble;

pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(STAGE_TIMEOUT_SECS);

/// Upper bounds for the two remote calls.
#[derive(Debug, Clone, Copy)]
pub struct StageTimeouts {
    pub describe: Duration,
    pub reason: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            describe: DEFAULT_STAGE_TIMEOUT,
            reason: DEFAULT_STAGE_TIMEOUT,
        }
    }
}

/// Stateless, cheaply cloneable; share one instance across all requests.
#[derive(Clone)]
pub struct ClassificationPipeline {
    describer: Arc<dyn DescriptionService>,
    reasoner: Arc<dyn ReasoningService>,
    prompt: Arc<PromptTemplate>,
    timeouts: StageTimeouts,
}

impl ClassificationPipeline {
    pub fn new(describer: Arc<dyn DescriptionService>, reasoner: Arc<dyn ReasoningService>) -> Self {
        Self {
            describer,
            reasoner,
            prompt: Arc::new(PromptTemplate::default()),
            timeouts: StageTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Classify one image. Always returns a fully populated response.
    #[instrument(skip_all, fields(bytes = image.data.len(), mime = %image.mime_type))]
    pub async fn classify(&self, image: &ImageInput) -> ClassificationResponse {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        let features = self.features_for(&request_id, image).await;
        let prediction = self.predict(&request_id, &features).await;
        let response = assemble(prediction, &features);

        PipelineEventLogger::log_event(
            &request_id,
            PipelineEvent::Completed {
                country: response.country.clone(),
                confidence: response.confidence,
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
        );
        info!(
            country = %response.country,
            confidence = response.confidence,
            "Classification completed"
        );
        response
    }

    /// Stage 1: describe the image and extract features, or fall back to the unavailable set.
    async fn features_for(&self, request_id: &str, image: &ImageInput) -> FeatureSchema {
        match self.describe(request_id, image).await {
            Ok(description) => {
                info!(chars = description.len(), "Extracting features from description");
                extract(&description)
            }
            Err(e) => {
                warn!(error = %e, "Description stage failed; using unavailable feature set");
                PipelineEventLogger::log_event(
                    request_id,
                    PipelineEvent::Fallback {
                        stage: "describe".into(),
                        reason: e.to_string(),
                    },
                );
                FeatureSchema::unavailable()
            }
        }
    }

    async fn describe(&self, request_id: &str, image: &ImageInput) -> Result<String, ClassifyError> {
        let service = self.describer.name().to_string();
        let start = Instant::now();

        let description = tokio::time::timeout(self.timeouts.describe, self.describer.describe(image))
            .await
            .map_err(|_| {
                ClassifyError::upstream(&service, format!("timed out after {:?}", self.timeouts.describe))
            })?
            .map_err(|e| ClassifyError::upstream(&service, e.to_string()))?;

        if description.trim().is_empty() {
            return Err(ClassifyError::upstream(&service, "empty description"));
        }

        PipelineEventLogger::log_event(
            request_id,
            PipelineEvent::Described {
                service,
                chars: description.len(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
        );
        Ok(description)
    }

    /// Stages 2–3: reason, repair, and resolve; any failure yields the fallback prediction.
    async fn predict(&self, request_id: &str, features: &FeatureSchema) -> Prediction {
        match self.reason(request_id, features).await.and_then(|raw| repair(&raw)) {
            Ok(prediction) if prediction.is_non_answer() => {
                warn!(
                    country = %prediction.predicted_country,
                    "Reasoning model gave a non-answer; resolving with fallback"
                );
                PipelineEventLogger::log_event(
                    request_id,
                    PipelineEvent::Fallback {
                        stage: "non_answer".into(),
                        reason: format!("model answered {:?}", prediction.predicted_country),
                    },
                );
                resolve_non_answer(prediction, features)
            }
            Ok(prediction) => prediction,
            Err(e) => {
                warn!(error = %e, "Reasoning stage failed; using fallback prediction");
                PipelineEventLogger::log_event(
                    request_id,
                    PipelineEvent::Fallback {
                        stage: "reason".into(),
                        reason: e.to_string(),
                    },
                );
                fallback_prediction(features)
            }
        }
    }

    async fn reason(&self, request_id: &str, features: &FeatureSchema) -> Result<String, ClassifyError> {
        let service = self.reasoner.name().to_string();
        let start = Instant::now();

        let raw = tokio::time::timeout(self.timeouts.reason, self.reasoner.reason(features, &self.prompt))
            .await
            .map_err(|_| {
                ClassifyError::upstream(&service, format!("timed out after {:?}", self.timeouts.reason))
            })?
            .map_err(|e| ClassifyError::upstream(&service, e.to_string()))?;

        PipelineEventLogger::log_event(
            request_id,
            PipelineEvent::Reasoned {
                service,
                chars: raw.len(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
        );
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoclass_core::{is_non_answer, NON_ANSWER_RATIONALE, UPSTREAM_FAILURE_RATIONALE};
    use geoclass_reasoning::{MockDescriber, MockReasoner};

    const COASTAL_SPANISH: &str =
        "A coastal tropical street with palm trees and Spanish street signs";

    fn image() -> ImageInput {
        ImageInput::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg")
    }

    fn pipeline(describer: MockDescriber, reasoner: MockReasoner) -> ClassificationPipeline {
        ClassificationPipeline::new(Arc::new(describer), Arc::new(reasoner)).with_timeouts(
            StageTimeouts {
                describe: Duration::from_millis(200),
                reason: Duration::from_millis(200),
            },
        )
    }

    #[tokio::test]
    async fn happy_path_uses_model_answer() {
        let p = pipeline(
            MockDescriber::new(COASTAL_SPANISH),
            MockReasoner::new(
                r#"Sure! {"predicted_country":"Colombia","confidence":"high","rationale":["Spanish signs","palms"]}"#,
            ),
        );
        let resp = p.classify(&image()).await;
        assert_eq!(resp.country, "Colombia");
        assert_eq!(resp.confidence, 85);
        assert_eq!(resp.explanation, "Spanish signs. palms");
        assert!(resp.features.contains("Language: Spanish"));
        assert!(resp.features.contains("Vegetation: tropical"));
    }

    #[tokio::test]
    async fn reasoning_timeout_falls_back_to_language_rule() {
        let p = pipeline(
            MockDescriber::new(COASTAL_SPANISH),
            MockReasoner::new(r#"{"predicted_country":"Peru","confidence":"high"}"#)
                .with_delay(Duration::from_secs(10)),
        );
        let resp = p.classify(&image()).await;
        assert_eq!(resp.country, "Spain");
        assert_eq!(resp.confidence, 25);
        for line in UPSTREAM_FAILURE_RATIONALE {
            assert!(resp.explanation.contains(line), "missing {line:?}");
        }
    }

    #[tokio::test]
    async fn reasoning_error_falls_back() {
        let p = pipeline(
            MockDescriber::new("Soviet blocks on a wide avenue"),
            MockReasoner::failing("503 Service Unavailable"),
        );
        let resp = p.classify(&image()).await;
        assert_eq!(resp.country, "Poland");
        assert_eq!(resp.confidence, 25);
    }

    #[tokio::test]
    async fn malformed_reply_falls_back() {
        let p = pipeline(
            MockDescriber::new("Cobblestone street"),
            MockReasoner::new("I think it is probably somewhere in Europe."),
        );
        let resp = p.classify(&image()).await;
        assert_eq!(resp.country, "Netherlands");
        assert_eq!(resp.confidence, 25);
    }

    #[tokio::test]
    async fn non_answer_is_resolved() {
        let p = pipeline(
            MockDescriber::new("Street with German shop signs"),
            MockReasoner::new(r#"{"predicted_country":"UNKNOWN","confidence":"medium"}"#),
        );
        let resp = p.classify(&image()).await;
        assert_eq!(resp.country, "Germany");
        assert_eq!(resp.confidence, 35);
        assert_eq!(resp.explanation, NON_ANSWER_RATIONALE.join(". "));
    }

    #[tokio::test]
    async fn unrated_answer_keeps_model_country() {
        let p = pipeline(
            MockDescriber::new("Street with German shop signs"),
            MockReasoner::new(r#"{"predicted_country":"Chile","rationale":["Andes"]}"#),
        );
        let resp = p.classify(&image()).await;
        assert_eq!(resp.country, "Chile");
        assert_eq!(resp.confidence, 50);
        assert_eq!(resp.explanation, "Andes");
    }

    #[tokio::test]
    async fn bare_unknown_reply_is_a_non_answer() {
        let p = pipeline(
            MockDescriber::new("Street with German shop signs"),
            MockReasoner::new(r#"{"predicted_country":"unknown"}"#),
        );
        let resp = p.classify(&image()).await;
        assert_eq!(resp.country, "Germany");
        assert_eq!(resp.confidence, 35);
        assert_eq!(resp.explanation, NON_ANSWER_RATIONALE.join(". "));
    }

    #[tokio::test]
    async fn description_failure_uses_unavailable_features() {
        let p = pipeline(
            MockDescriber::failing("model is loading"),
            MockReasoner::failing("also down"),
        );
        let resp = p.classify(&image()).await;
        assert!(!is_non_answer(&resp.country));
        assert_eq!(resp.features, "Visual analysis of image features");
        assert_eq!(resp.confidence, 25);
    }

    #[tokio::test]
    async fn description_timeout_and_blank_text_are_failures() {
        let slow = pipeline(
            MockDescriber::new(COASTAL_SPANISH).with_delay(Duration::from_secs(10)),
            MockReasoner::failing("down"),
        );
        let blank = pipeline(MockDescriber::new("   "), MockReasoner::failing("down"));

        let a = slow.classify(&image()).await;
        let b = blank.classify(&image()).await;
        // Both run the cascade over the same unavailable feature set.
        assert_eq!(a, b);
        assert_eq!(a.features, "Visual analysis of image features");
    }

    #[tokio::test]
    async fn fallback_is_deterministic_across_runs() {
        let p = pipeline(
            MockDescriber::new("A quiet road"),
            MockReasoner::new("no json at all"),
        );
        let first = p.classify(&image()).await;
        for _ in 0..5 {
            assert_eq!(p.classify(&image()).await, first);
        }
    }
}
