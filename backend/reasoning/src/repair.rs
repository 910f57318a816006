//! Response repair: pull a prediction out of a loosely structured model reply.
//!
//! The JSON object is located greedily, from the first `{` to the last `}`.
//! Models like to wrap the object in commentary (sometimes containing stray
//! braces of their own), and the greedy span still lands on the object in
//! the replies seen in practice.

use serde_json::{Map, Value};
use tracing::debug;

use geoclass_core::{
    ClassifyError, Confidence, FeatureSchema, NON_ANSWER_RATIONALE, Prediction,
    UNRATED_CONFIDENCE_SCORE,
};

use crate::fallback;

/// Extract and validate a prediction from raw reply text.
///
/// Returns [`ClassifyError::MalformedResponse`] when no JSON object can be
/// located or parsed, and [`ClassifyError::SchemaViolation`] when a field has
/// the wrong type. Confidence never fails: with neither a usable label nor a
/// score the prediction is rated `medium` at [`UNRATED_CONFIDENCE_SCORE`].
/// A missing or "unknown" country is *not* an error here; check
/// [`Prediction::is_non_answer`] and pass it through [`resolve_non_answer`].
pub fn repair(raw: &str) -> Result<Prediction, ClassifyError> {
    let json_str = extract_json_object(raw)
        .ok_or_else(|| ClassifyError::MalformedResponse("no JSON object found in reply".into()))?;

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| ClassifyError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let Value::Object(obj) = value else {
        return Err(ClassifyError::SchemaViolation("reply is not a JSON object".into()));
    };

    let predicted_country = country_field(&obj)?;
    let label = confidence_label(&obj);
    let score = confidence_score(&obj);

    let (confidence, confidence_score) = match (label, score) {
        (Some(label), Some(score)) => (label, score),
        (Some(label), None) => (label, label.score()),
        (None, Some(score)) => (Confidence::from_score(score), score),
        (None, None) => (Confidence::Medium, UNRATED_CONFIDENCE_SCORE),
    };

    let rationale = rationale_field(&obj)?;

    debug!(country = %predicted_country, %confidence, confidence_score, "Repaired model reply");

    Ok(Prediction {
        predicted_country,
        confidence,
        confidence_score,
        rationale,
    })
}

/// Greedy `{`…`}` span: first open brace to last close brace, inclusive.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Replace a non-answer with the fallback country and a low-confidence disclaimer.
///
/// Predictions that already name a country are returned unchanged.
pub fn resolve_non_answer(mut prediction: Prediction, features: &FeatureSchema) -> Prediction {
    if !prediction.is_non_answer() {
        return prediction;
    }
    prediction.predicted_country = fallback::predict(features);
    prediction.confidence = Confidence::Low;
    prediction.confidence_score = Confidence::Low.score();
    prediction.rationale = NON_ANSWER_RATIONALE.iter().map(|s| s.to_string()).collect();
    prediction
}

fn country_field(obj: &Map<String, Value>) -> Result<String, ClassifyError> {
    match obj.get("predicted_country") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(ClassifyError::SchemaViolation(format!(
            "`predicted_country` must be a string, got {other}"
        ))),
    }
}

/// Unrecognised labels are treated as absent so a numeric score can still be used.
fn confidence_label(obj: &Map<String, Value>) -> Option<Confidence> {
    obj.get("confidence")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

/// Non-numeric scores (`"N/A"`, `true`) count as absent.
fn confidence_score(obj: &Map<String, Value>) -> Option<u8> {
    let value = obj.get("confidence_score")?;
    let raw = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => Some(v.round().clamp(0.0, 100.0) as u8),
        _ => {
            debug!(%value, "Ignoring non-numeric confidence_score");
            None
        }
    }
}

fn rationale_field(obj: &Map<String, Value>) -> Result<Vec<String>, ClassifyError> {
    match obj.get("rationale") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.trim().to_string()]),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect()),
        Some(other) => Err(ClassifyError::SchemaViolation(format!(
            "`rationale` must be a list of strings, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_chatter() {
        let p = repair(
            r#"blah blah {"predicted_country":"Chile","confidence":"high"} trailing text"#,
        )
        .unwrap();
        assert_eq!(p.predicted_country, "Chile");
        assert_eq!(p.confidence, Confidence::High);
        assert_eq!(p.confidence_score, 85);
        assert!(p.rationale.is_empty());
    }

    #[test]
    fn no_braces_is_malformed() {
        let err = repair("no braces here").unwrap_err();
        assert!(matches!(err, ClassifyError::MalformedResponse(_)));
    }

    #[test]
    fn inverted_braces_are_malformed() {
        let err = repair("} nothing here {").unwrap_err();
        assert!(matches!(err, ClassifyError::MalformedResponse(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = repair("Here: {predicted_country: Chile}").unwrap_err();
        assert!(matches!(err, ClassifyError::MalformedResponse(_)));
    }

    #[test]
    fn greedy_span_includes_stray_trailing_braces() {
        // The greedy span swallows the trailing "{sic}" and so fails to parse.
        let err = repair(r#"{"predicted_country":"Peru","confidence":"low"} see {sic}"#)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::MalformedResponse(_)));
    }

    #[test]
    fn extract_is_first_open_to_last_close() {
        assert_eq!(extract_json_object("a {b} c {d} e"), Some("{b} c {d}"));
        assert_eq!(extract_json_object("{}"), Some("{}"));
        assert_eq!(extract_json_object("{"), None);
    }

    #[test]
    fn missing_confidence_defaults_to_medium() {
        let p = repair(r#"{"predicted_country":"Chile","rationale":["Andes"]}"#).unwrap();
        assert_eq!(p.predicted_country, "Chile");
        assert_eq!(p.confidence, Confidence::Medium);
        assert_eq!(p.confidence_score, 50);
        assert_eq!(p.rationale, vec!["Andes"]);
    }

    #[test]
    fn unrecognised_label_without_score_defaults_to_medium() {
        let p = repair(r#"{"predicted_country":"Chile","confidence":"moderate"}"#).unwrap();
        assert_eq!(p.predicted_country, "Chile");
        assert_eq!(p.confidence, Confidence::Medium);
        assert_eq!(p.confidence_score, 50);
    }

    #[test]
    fn non_numeric_score_falls_back_to_label() {
        let p = repair(r#"{"predicted_country":"Chile","confidence":"high","confidence_score":"N/A"}"#)
            .unwrap();
        assert_eq!(p.predicted_country, "Chile");
        assert_eq!(p.confidence, Confidence::High);
        assert_eq!(p.confidence_score, 85);

        let p = repair(r#"{"predicted_country":"Chile","confidence_score":[1]}"#).unwrap();
        assert_eq!(p.confidence_score, 50);
    }

    #[test]
    fn bare_unknown_country_takes_non_answer_path() {
        let p = repair(r#"{"predicted_country":"unknown"}"#).unwrap();
        assert!(p.is_non_answer());

        let mut features = FeatureSchema::default();
        features.text_features.language = "German".into();
        let resolved = resolve_non_answer(p, &features);
        assert_eq!(resolved.predicted_country, "Germany");
        assert_eq!(resolved.confidence_score, 35);
    }

    #[test]
    fn wrong_country_type_is_schema_violation() {
        let err = repair(r#"{"predicted_country":42,"confidence":"low"}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::SchemaViolation(_)));
    }

    #[test]
    fn explicit_score_is_kept_and_clamped() {
        let p = repair(r#"{"predicted_country":"Kenya","confidence":"medium","confidence_score":140}"#)
            .unwrap();
        assert_eq!(p.confidence, Confidence::Medium);
        assert_eq!(p.confidence_score, 100);

        let p = repair(r#"{"predicted_country":"Kenya","confidence":"medium","confidence_score":"58%"}"#)
            .unwrap();
        assert_eq!(p.confidence_score, 58);
    }

    #[test]
    fn label_derived_from_score_when_unrecognised() {
        let p = repair(r#"{"predicted_country":"Japan","confidence":"sure","confidence_score":92}"#)
            .unwrap();
        assert_eq!(p.confidence, Confidence::VeryHigh);
        assert_eq!(p.confidence_score, 92);
    }

    #[test]
    fn rationale_accepts_string_or_list() {
        let p = repair(r#"{"predicted_country":"Italy","confidence":"Very High","rationale":"Vespa everywhere"}"#)
            .unwrap();
        assert_eq!(p.rationale, vec!["Vespa everywhere"]);
        assert_eq!(p.confidence_score, 95);

        let p = repair(
            r#"{"predicted_country":"Italy","confidence":"low","rationale":["tiled roofs", "", "narrow lanes"]}"#,
        )
        .unwrap();
        assert_eq!(p.rationale, vec!["tiled roofs", "narrow lanes"]);
    }

    #[test]
    fn missing_country_repairs_as_non_answer() {
        let p = repair(r#"{"confidence":"high","rationale":["hard to tell"]}"#).unwrap();
        assert!(p.is_non_answer());
    }

    #[test]
    fn non_answer_is_replaced_by_fallback() {
        let mut features = FeatureSchema::default();
        features.text_features.language = "French".into();

        let p = repair(r#"{"predicted_country":"Unknown","confidence":"high","confidence_score":90}"#)
            .unwrap();
        let resolved = resolve_non_answer(p, &features);
        assert_eq!(resolved.predicted_country, "France");
        assert_eq!(resolved.confidence, Confidence::Low);
        assert_eq!(resolved.confidence_score, 35);
        assert_eq!(resolved.rationale.len(), 3);
        assert_eq!(resolved.rationale[0], NON_ANSWER_RATIONALE[0]);
    }

    #[test]
    fn real_answers_pass_through_resolution() {
        let p = repair(r#"{"predicted_country":"Chile","confidence":"high"}"#).unwrap();
        let resolved = resolve_non_answer(p.clone(), &FeatureSchema::default());
        assert_eq!(resolved, p);
    }
}
