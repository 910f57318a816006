//! Turn a resolved prediction and its feature set into the response contract.

use geoclass_core::{is_known, ClassificationResponse, FeatureSchema, Prediction};
use geoclass_reasoning::fallback;

const NO_EXPLANATION: &str = "No explanation available";
const NO_FEATURES: &str = "Visual analysis of image features";

/// Feature paths shown in the summary, with their display labels.
const SUMMARY_FIELDS: &[(&str, &str)] = &[
    ("road.surface", "Road"),
    ("architecture.style", "Architecture"),
    ("environment.vegetation", "Vegetation"),
    ("environment.climate_hint", "Climate"),
    ("text_features.language", "Language"),
    ("vehicles.brands", "Vehicles"),
    ("architecture.density", "Density"),
];

/// Build the final response. Cannot fail.
pub fn assemble(prediction: Prediction, features: &FeatureSchema) -> ClassificationResponse {
    // Upstream stages resolve non-answers; this only guards the response contract.
    let country = if prediction.is_non_answer() {
        fallback::predict(features)
    } else {
        prediction.predicted_country
    };

    let explanation = if prediction.rationale.is_empty() {
        NO_EXPLANATION.to_string()
    } else {
        prediction.rationale.join(". ")
    };

    ClassificationResponse {
        features: summarize_features(features),
        country,
        confidence: prediction.confidence_score.min(100),
        explanation,
    }
}

/// `"Label: value"` for each informative summary field, or a placeholder.
pub fn summarize_features(features: &FeatureSchema) -> String {
    let parts: Vec<String> = SUMMARY_FIELDS
        .iter()
        .filter_map(|(path, label)| {
            features
                .get(path)
                .filter(|v| is_known(v))
                .map(|v| format!("{label}: {v}"))
        })
        .collect();
    if parts.is_empty() {
        NO_FEATURES.to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoclass_core::Confidence;

    fn prediction(country: &str, rationale: &[&str]) -> Prediction {
        Prediction {
            predicted_country: country.to_string(),
            confidence: Confidence::High,
            confidence_score: 85,
            rationale: rationale.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn joins_rationale() {
        let resp = assemble(
            prediction("Chile", &["Andes in view", "Spanish signs"]),
            &FeatureSchema::default(),
        );
        assert_eq!(resp.country, "Chile");
        assert_eq!(resp.confidence, 85);
        assert_eq!(resp.explanation, "Andes in view. Spanish signs");
    }

    #[test]
    fn empty_rationale_gets_placeholder() {
        let resp = assemble(prediction("Chile", &[]), &FeatureSchema::default());
        assert_eq!(resp.explanation, "No explanation available");
    }

    #[test]
    fn summary_lists_known_fields_in_order() {
        let mut f = FeatureSchema::default();
        f.architecture.density = "urban".into();
        f.road.surface = "asphalt".into();
        f.text_features.language = "German".into();
        assert_eq!(
            summarize_features(&f),
            "Road: asphalt, Language: German, Density: urban"
        );
    }

    #[test]
    fn summary_placeholder_when_nothing_known() {
        assert_eq!(
            summarize_features(&FeatureSchema::default()),
            "Visual analysis of image features"
        );
    }

    #[test]
    fn unresolved_non_answer_never_reaches_response() {
        let mut f = FeatureSchema::default();
        f.text_features.language = "Arabic".into();
        let resp = assemble(prediction("unclear", &["?"]), &f);
        assert_eq!(resp.country, "Morocco");
    }
}
