use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Score reported when the reasoning stage failed outright.
pub const FALLBACK_CONFIDENCE_SCORE: u8 = 25;

/// Score reported when the model gave neither a usable label nor a score.
pub const UNRATED_CONFIDENCE_SCORE: u8 = 50;

/// Country values that mean the model declined to answer.
pub const NON_ANSWER_MARKERS: &[&str] = &["unknown", "unclear", "uncertain"];

/// Rationale used when the reasoning model is unreachable or its reply unusable.
pub const UPSTREAM_FAILURE_RATIONALE: [&str; 3] = [
    "AI model analysis failed, using pattern-based prediction",
    "Prediction based on common geographic and architectural patterns",
    "Limited visual information available for detailed analysis",
];

/// Rationale used when the model replied but named no country.
pub const NON_ANSWER_RATIONALE: [&str; 3] = [
    "Limited visual information available",
    "Making educated guess based on detected patterns",
    "Used fallback analysis of available features",
];

/// Qualitative confidence reported by the reasoning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl Confidence {
    /// Canonical label-to-score table.
    pub fn score(self) -> u8 {
        match self {
            Self::Low => 35,
            Self::Medium => 65,
            Self::High => 85,
            Self::VeryHigh => 95,
        }
    }

    /// Band a numeric score back into a label.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=49 => Self::Low,
            50..=74 => Self::Medium,
            75..=89 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    /// Case-insensitive; `_` and `-` count as spaces (`"Very_High"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "very high" => Ok(Self::VeryHigh),
            other => Err(format!("unrecognised confidence label: {other:?}")),
        }
    }
}

/// A country guess with its supporting reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_country: String,
    pub confidence: Confidence,
    /// 0–100.
    pub confidence_score: u8,
    pub rationale: Vec<String>,
}

impl Prediction {
    /// True when the country is empty or a synonym of "unknown".
    ///
    /// Such a prediction must go through the fallback cascade before it is used.
    pub fn is_non_answer(&self) -> bool {
        is_non_answer(&self.predicted_country)
    }
}

pub fn is_non_answer(country: &str) -> bool {
    let lowered = country.trim().to_lowercase();
    lowered.is_empty() || NON_ANSWER_MARKERS.iter().any(|m| lowered.contains(m))
}

/// The response returned to the caller of the classify endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    /// Human-readable summary of the detected features.
    pub features: String,
    pub country: String,
    /// 0–100.
    pub confidence: u8,
    pub explanation: String,
}
