use crate::schema::FeatureSchema;

const SYSTEM_PROMPT: &str = r#"You are a country classification model trained on expert GeoGuessr strategies.

Given the following image-derived input features, predict the most likely country.

TASK: Predict the most likely country and rationale based on the inputs.

OUTPUT:
{
  "predicted_country": "<country name>",
  "confidence": "<low|medium|high|very high>",
  "rationale": [
    "<reason 1>",
    "<reason 2>",
    "...etc"
  ]
}"#;

const USER_INSTRUCTIONS: &str = r#"TASK: Predict the most likely country and rationale based on the above inputs.

You MUST analyze the comprehensive feature set and make a specific prediction. Never answer "unknown" or leave the country empty. Pay special attention to:
- Architecture styles (colonial, modern, traditional, soviet, mediterranean, scandinavian)
- Environment indicators (vegetation, climate, terrain, coast proximity)
- Infrastructure quality (road surface, density, poles)
- Cultural markers (language, signs, vehicles)

Do not default to common countries like US unless features specifically support it.

OUTPUT (JSON only):"#;

/// System and user prompt pair sent to the reasoning model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub system: String,
    /// Instructions appended after the serialized feature set.
    pub instructions: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            instructions: USER_INSTRUCTIONS.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Build the user message: the full feature set as pretty JSON, then the instructions.
    pub fn render_user(&self, features: &FeatureSchema) -> String {
        let input = serde_json::to_string_pretty(features)
            .unwrap_or_else(|_| format!("{features:?}"));
        format!("INPUT:\n{input}\n\n{}", self.instructions)
    }
}
