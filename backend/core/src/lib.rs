pub mod defaults;
pub mod error;
pub mod prediction;
pub mod prompt;
pub mod rules;
pub mod schema;
pub mod traits;

pub use error::ClassifyError;
pub use prediction::{
    is_non_answer, ClassificationResponse, Confidence, Prediction, FALLBACK_CONFIDENCE_SCORE,
    NON_ANSWER_RATIONALE, UNRATED_CONFIDENCE_SCORE, UPSTREAM_FAILURE_RATIONALE,
};
pub use prompt::PromptTemplate;
pub use schema::{is_known, FeatureSchema, UNKNOWN};
pub use traits::{DescriptionService, ImageInput, ReasoningService};
