//! Heuristic feature extractor: free-text scene description → [`FeatureSchema`].
//!
//! Each field is resolved independently by case-insensitive substring match
//! against its rule table in `geoclass_core::rules`. The first matching rule
//! wins, except for the accumulating fields (colours, vehicle brands, unique
//! clues) which keep every match.

use geoclass_core::rules::{self, KeywordRule};
use geoclass_core::schema::{FALSE, TRUE};
use geoclass_core::{FeatureSchema, UNKNOWN};

/// Characters of the raw description kept when no notable clue is found.
const CLUE_EXCERPT_CHARS: usize = 100;

/// Build a complete feature set from a scene description. Never fails.
pub fn extract(description: &str) -> FeatureSchema {
    let lowered = description.to_lowercase();
    let text = lowered.as_str();

    let mut features = FeatureSchema::default();

    features.road.surface = first_match(rules::ROAD_SURFACE, text);
    features.road.curvature = first_match(rules::ROAD_CURVATURE, text);
    features.road.elevation = first_match(rules::ROAD_ELEVATION, text);
    features.poles = first_match(rules::POLES, text);

    features.text_features.language = first_match(rules::LANGUAGE, text);
    features.text_features.store_signs = first_match(rules::STORE_SIGNS, text);

    features.architecture.style = first_match(rules::ARCHITECTURE_STYLE, text);
    features.architecture.colors = all_matches(rules::ARCHITECTURE_COLORS, text);
    features.architecture.roof_type = first_match(rules::ROOF_TYPE, text);
    features.architecture.density = first_match(rules::DENSITY, text);

    features.vehicles.brands = all_matches(rules::VEHICLE_BRANDS, text);

    features.environment.vegetation = first_match(rules::VEGETATION, text);
    features.environment.terrain = first_match(rules::TERRAIN, text);
    features.environment.climate_hint = first_match(rules::CLIMATE, text);
    features.environment.coast_proximity = if matches_any(rules::COAST, text) {
        TRUE.to_string()
    } else {
        FALSE.to_string()
    };
    features.environment.altitude = first_match(rules::ALTITUDE, text);

    features.meta.police_presence = FALSE.to_string();
    features.meta.escort_vehicle = FALSE.to_string();
    features.meta.unique_clues = unique_clues(description, text);

    features.original_description = if description.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        description.to_string()
    };
    features
}

fn first_match(table: &[KeywordRule], text: &str) -> String {
    table
        .iter()
        .find(|r| r.matches(text))
        .map(|r| r.value)
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn all_matches(table: &[KeywordRule], text: &str) -> String {
    let found: Vec<&str> = table.iter().filter(|r| r.matches(text)).map(|r| r.value).collect();
    if found.is_empty() {
        UNKNOWN.to_string()
    } else {
        found.join(", ")
    }
}

fn matches_any(table: &[KeywordRule], text: &str) -> bool {
    table.iter().any(|r| r.matches(text))
}

/// Notable phrases, or an excerpt of the raw text when none fire.
fn unique_clues(raw: &str, lowered: &str) -> String {
    let clues: Vec<&str> = rules::UNIQUE_CLUES
        .iter()
        .filter(|r| r.matches(lowered))
        .map(|r| r.value)
        .collect();
    if !clues.is_empty() {
        return clues.join(", ");
    }
    let excerpt: String = raw.chars().take(CLUE_EXCERPT_CHARS).collect();
    format!("{excerpt}...")
}
