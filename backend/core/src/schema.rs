//! The feature set describing a street scene.
//!
//! Every leaf is a string and every leaf is always populated: unresolved
//! values hold [`UNKNOWN`], boolean-like values hold `"true"`/`"false"`.
//! Field order is significant, it fixes the serialized form that the
//! reasoning model sees and that the fallback default hashes over.

use serde::{Deserialize, Serialize};

/// Sentinel for a field no rule could resolve.
pub const UNKNOWN: &str = "unknown";
pub const TRUE: &str = "true";
pub const FALSE: &str = "false";

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn falsy() -> String {
    FALSE.to_string()
}

/// Complete, fixed-shape description of the visual clues in one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    #[serde(default = "unknown")]
    pub sun_dir: String,
    #[serde(default = "unknown")]
    pub cam_gen: String,
    #[serde(default = "unknown")]
    pub drive_side: String,
    #[serde(default)]
    pub road: RoadFeatures,
    #[serde(default = "unknown")]
    pub bollards: String,
    #[serde(default = "unknown")]
    pub poles: String,
    #[serde(default = "unknown")]
    pub guardrails: String,
    #[serde(default)]
    pub signs: SignFeatures,
    #[serde(default)]
    pub license_plate: LicensePlateFeatures,
    #[serde(default)]
    pub text_features: TextFeatures,
    #[serde(default)]
    pub architecture: ArchitectureFeatures,
    #[serde(default)]
    pub vehicles: VehicleFeatures,
    #[serde(default)]
    pub cultural_indicators: CulturalIndicators,
    #[serde(default)]
    pub environment: EnvironmentFeatures,
    #[serde(default)]
    pub meta: MetaFeatures,
    #[serde(default = "unknown")]
    pub original_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadFeatures {
    #[serde(default = "unknown")]
    pub lines: String,
    #[serde(default = "unknown")]
    pub surface: String,
    #[serde(default = "unknown")]
    pub shoulder: String,
    #[serde(default = "unknown")]
    pub median: String,
    #[serde(default = "unknown")]
    pub curvature: String,
    #[serde(default = "unknown")]
    pub elevation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignFeatures {
    #[serde(default = "unknown")]
    pub lang: String,
    #[serde(default = "unknown")]
    pub shapes: String,
    #[serde(default = "unknown")]
    pub units: String,
    #[serde(default = "unknown")]
    pub mounts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePlateFeatures {
    #[serde(default = "unknown")]
    pub front: String,
    #[serde(default = "unknown")]
    pub rear: String,
    #[serde(default = "unknown")]
    pub blur_status: String,
    #[serde(default = "unknown")]
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFeatures {
    #[serde(default = "unknown")]
    pub language: String,
    #[serde(default = "unknown")]
    pub toponyms: String,
    #[serde(default = "unknown")]
    pub domain: String,
    #[serde(default = "unknown")]
    pub phone_format: String,
    #[serde(default = "unknown")]
    pub store_signs: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureFeatures {
    #[serde(default = "unknown")]
    pub style: String,
    /// Comma-separated list of every colour mentioned.
    #[serde(default = "unknown")]
    pub colors: String,
    #[serde(default = "unknown")]
    pub roof_type: String,
    #[serde(default = "unknown")]
    pub density: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleFeatures {
    /// Comma-separated list of every brand mentioned.
    #[serde(default = "unknown")]
    pub brands: String,
    #[serde(default = "unknown")]
    pub markings: String,
    #[serde(default = "unknown")]
    pub bus_text: String,
    #[serde(default = "unknown")]
    pub parking_style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalIndicators {
    #[serde(default = "unknown")]
    pub religion: String,
    #[serde(default = "unknown")]
    pub flag: String,
    #[serde(default = "unknown")]
    pub murals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFeatures {
    #[serde(default = "unknown")]
    pub vegetation: String,
    #[serde(default = "unknown")]
    pub terrain: String,
    #[serde(default = "unknown")]
    pub climate_hint: String,
    /// `"true"` or `"false"`.
    #[serde(default = "falsy")]
    pub coast_proximity: String,
    #[serde(default = "unknown")]
    pub altitude: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFeatures {
    /// `"true"` or `"false"`.
    #[serde(default = "falsy")]
    pub police_presence: String,
    /// `"true"` or `"false"`.
    #[serde(default = "falsy")]
    pub escort_vehicle: String,
    #[serde(default = "unknown")]
    pub camera_shadow: String,
    #[serde(default = "unknown")]
    pub unique_clues: String,
}

impl Default for RoadFeatures {
    fn default() -> Self {
        Self {
            lines: unknown(),
            surface: unknown(),
            shoulder: unknown(),
            median: unknown(),
            curvature: unknown(),
            elevation: unknown(),
        }
    }
}

impl Default for SignFeatures {
    fn default() -> Self {
        Self {
            lang: unknown(),
            shapes: unknown(),
            units: unknown(),
            mounts: unknown(),
        }
    }
}

impl Default for LicensePlateFeatures {
    fn default() -> Self {
        Self {
            front: unknown(),
            rear: unknown(),
            blur_status: unknown(),
            country_code: unknown(),
        }
    }
}

impl Default for TextFeatures {
    fn default() -> Self {
        Self {
            language: unknown(),
            toponyms: unknown(),
            domain: unknown(),
            phone_format: unknown(),
            store_signs: unknown(),
        }
    }
}

impl Default for ArchitectureFeatures {
    fn default() -> Self {
        Self {
            style: unknown(),
            colors: unknown(),
            roof_type: unknown(),
            density: unknown(),
        }
    }
}

impl Default for VehicleFeatures {
    fn default() -> Self {
        Self {
            brands: unknown(),
            markings: unknown(),
            bus_text: unknown(),
            parking_style: unknown(),
        }
    }
}

impl Default for CulturalIndicators {
    fn default() -> Self {
        Self {
            religion: unknown(),
            flag: unknown(),
            murals: unknown(),
        }
    }
}

impl Default for EnvironmentFeatures {
    fn default() -> Self {
        Self {
            vegetation: unknown(),
            terrain: unknown(),
            climate_hint: unknown(),
            coast_proximity: falsy(),
            altitude: unknown(),
        }
    }
}

impl Default for MetaFeatures {
    fn default() -> Self {
        Self {
            police_presence: falsy(),
            escort_vehicle: falsy(),
            camera_shadow: unknown(),
            unique_clues: unknown(),
        }
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            sun_dir: unknown(),
            cam_gen: unknown(),
            drive_side: unknown(),
            road: RoadFeatures::default(),
            bollards: unknown(),
            poles: unknown(),
            guardrails: unknown(),
            signs: SignFeatures::default(),
            license_plate: LicensePlateFeatures::default(),
            text_features: TextFeatures::default(),
            architecture: ArchitectureFeatures::default(),
            vehicles: VehicleFeatures::default(),
            cultural_indicators: CulturalIndicators::default(),
            environment: EnvironmentFeatures::default(),
            meta: MetaFeatures::default(),
            original_description: unknown(),
        }
    }
}

impl FeatureSchema {
    /// The feature set used when the image could not be described at all.
    pub fn unavailable() -> Self {
        let mut features = Self::default();
        features.meta.unique_clues = "Unable to analyze image with AI models".to_string();
        features.original_description = "AI model analysis failed".to_string();
        features
    }

    /// Every leaf as a `(dotted.path, value)` pair, in serialization order.
    pub fn leaves(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("sun_dir", self.sun_dir.as_str()),
            ("cam_gen", self.cam_gen.as_str()),
            ("drive_side", self.drive_side.as_str()),
            ("road.lines", self.road.lines.as_str()),
            ("road.surface", self.road.surface.as_str()),
            ("road.shoulder", self.road.shoulder.as_str()),
            ("road.median", self.road.median.as_str()),
            ("road.curvature", self.road.curvature.as_str()),
            ("road.elevation", self.road.elevation.as_str()),
            ("bollards", self.bollards.as_str()),
            ("poles", self.poles.as_str()),
            ("guardrails", self.guardrails.as_str()),
            ("signs.lang", self.signs.lang.as_str()),
            ("signs.shapes", self.signs.shapes.as_str()),
            ("signs.units", self.signs.units.as_str()),
            ("signs.mounts", self.signs.mounts.as_str()),
            ("license_plate.front", self.license_plate.front.as_str()),
            ("license_plate.rear", self.license_plate.rear.as_str()),
            ("license_plate.blur_status", self.license_plate.blur_status.as_str()),
            ("license_plate.country_code", self.license_plate.country_code.as_str()),
            ("text_features.language", self.text_features.language.as_str()),
            ("text_features.toponyms", self.text_features.toponyms.as_str()),
            ("text_features.domain", self.text_features.domain.as_str()),
            ("text_features.phone_format", self.text_features.phone_format.as_str()),
            ("text_features.store_signs", self.text_features.store_signs.as_str()),
            ("architecture.style", self.architecture.style.as_str()),
            ("architecture.colors", self.architecture.colors.as_str()),
            ("architecture.roof_type", self.architecture.roof_type.as_str()),
            ("architecture.density", self.architecture.density.as_str()),
            ("vehicles.brands", self.vehicles.brands.as_str()),
            ("vehicles.markings", self.vehicles.markings.as_str()),
            ("vehicles.bus_text", self.vehicles.bus_text.as_str()),
            ("vehicles.parking_style", self.vehicles.parking_style.as_str()),
            ("cultural_indicators.religion", self.cultural_indicators.religion.as_str()),
            ("cultural_indicators.flag", self.cultural_indicators.flag.as_str()),
            ("cultural_indicators.murals", self.cultural_indicators.murals.as_str()),
            ("environment.vegetation", self.environment.vegetation.as_str()),
            ("environment.terrain", self.environment.terrain.as_str()),
            ("environment.climate_hint", self.environment.climate_hint.as_str()),
            ("environment.coast_proximity", self.environment.coast_proximity.as_str()),
            ("environment.altitude", self.environment.altitude.as_str()),
            ("meta.police_presence", self.meta.police_presence.as_str()),
            ("meta.escort_vehicle", self.meta.escort_vehicle.as_str()),
            ("meta.camera_shadow", self.meta.camera_shadow.as_str()),
            ("meta.unique_clues", self.meta.unique_clues.as_str()),
            ("original_description", self.original_description.as_str()),
        ]
    }

    /// Look up a leaf by its dotted path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.leaves()
            .into_iter()
            .find(|(p, _)| *p == path)
            .map(|(_, v)| v)
    }

    /// True when every leaf holds a non-empty value.
    pub fn is_total(&self) -> bool {
        self.leaves().iter().all(|(_, v)| !v.trim().is_empty())
    }

    /// Whether the scene is near a coast.
    pub fn is_coastal(&self) -> bool {
        self.environment.coast_proximity == TRUE
    }
}

/// Whether a leaf carries information.
pub fn is_known(value: &str) -> bool {
    value != UNKNOWN
}
