//! Keyword tables and vocabulary shared by the extractor and the fallback predictor.
//!
//! The extractor writes these values into a [`FeatureSchema`](crate::FeatureSchema)
//! and the fallback predictor matches on the very same constants, so a value
//! can only be spelled one way.

/// One keyword rule: if any keyword occurs in the (lowercased) text, the field takes `value`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub value: &'static str,
}

const fn rule(keywords: &'static [&'static str], value: &'static str) -> KeywordRule {
    KeywordRule { keywords, value }
}

impl KeywordRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

// --- Vocabulary ---

pub mod surface {
    pub const ASPHALT: &str = "asphalt";
    pub const GRAVEL: &str = "gravel";
    pub const DIRT: &str = "dirt";
    pub const COBBLESTONE: &str = "cobblestone";
}

pub mod language {
    pub const ENGLISH: &str = "English";
    pub const SPANISH: &str = "Spanish";
    pub const FRENCH: &str = "French";
    pub const GERMAN: &str = "German";
    pub const CYRILLIC: &str = "Cyrillic";
    pub const ARABIC: &str = "Arabic";
    pub const CHINESE: &str = "Chinese";
}

pub mod style {
    pub const COLONIAL: &str = "colonial";
    pub const MODERN: &str = "modern";
    pub const TRADITIONAL: &str = "traditional";
    pub const SOVIET: &str = "soviet/eastern bloc";
    pub const MEDITERRANEAN: &str = "mediterranean";
    pub const SCANDINAVIAN: &str = "scandinavian";
}

pub mod density {
    pub const URBAN: &str = "urban";
    pub const SUBURBAN: &str = "suburban";
    pub const RURAL: &str = "rural";
}

pub mod vegetation {
    pub const TROPICAL: &str = "tropical";
    pub const TEMPERATE: &str = "temperate";
    pub const CONIFEROUS: &str = "coniferous";
    pub const ARID: &str = "arid/desert";
    pub const MEDITERRANEAN: &str = "mediterranean";
    pub const GRASSLAND: &str = "grassland";
}

pub mod terrain {
    pub const FLAT: &str = "flat";
    pub const HILLY: &str = "hilly";
    pub const MOUNTAINS: &str = "mountains";
    pub const VALLEY: &str = "valley";
}

pub mod climate {
    pub const TROPICAL: &str = "tropical";
    pub const ARID: &str = "arid";
    pub const TEMPERATE: &str = "temperate";
    pub const COLD: &str = "cold";
    pub const MEDITERRANEAN: &str = "mediterranean";
}

pub mod brand {
    pub const TOYOTA: &str = "Toyota";
    pub const HONDA: &str = "Honda";
    pub const FORD: &str = "Ford";
    pub const VOLKSWAGEN: &str = "Volkswagen";
    pub const MERCEDES: &str = "Mercedes";
    pub const BMW: &str = "BMW";
}

// --- Extraction tables (first match wins unless noted) ---

pub static ROAD_SURFACE: &[KeywordRule] = &[
    rule(&["asphalt", "paved"], surface::ASPHALT),
    rule(&["gravel"], surface::GRAVEL),
    rule(&["dirt", "unpaved"], surface::DIRT),
    rule(&["cobblestone"], surface::COBBLESTONE),
];

pub static ROAD_CURVATURE: &[KeywordRule] = &[
    rule(&["straight"], "straight"),
    rule(&["winding", "curved"], "winding"),
    rule(&["switchback"], "switchbacks"),
];

pub static ROAD_ELEVATION: &[KeywordRule] = &[
    rule(&["flat", "level"], "flat"),
    rule(&["hill", "slope"], "hilly"),
    rule(&["mountain"], "mountainous"),
];

pub static POLES: &[KeywordRule] = &[
    rule(&["wooden pole", "wood pole"], "wooden poles"),
    rule(&["concrete pole"], "concrete poles"),
    rule(&["metal pole"], "metal poles"),
];

pub static LANGUAGE: &[KeywordRule] = &[
    rule(&["english", "latin alphabet"], language::ENGLISH),
    rule(&["spanish"], language::SPANISH),
    rule(&["french"], language::FRENCH),
    rule(&["german"], language::GERMAN),
    rule(&["cyrillic"], language::CYRILLIC),
    rule(&["arabic"], language::ARABIC),
    rule(&["chinese", "mandarin"], language::CHINESE),
];

pub static STORE_SIGNS: &[KeywordRule] = &[
    rule(&["stop sign"], "stop signs"),
    rule(&["yield sign"], "yield signs"),
    rule(&["speed limit"], "speed limit signs"),
    rule(&["street sign"], "street signs"),
];

pub static ARCHITECTURE_STYLE: &[KeywordRule] = &[
    rule(&["colonial"], style::COLONIAL),
    rule(&["modern"], style::MODERN),
    rule(&["traditional"], style::TRADITIONAL),
    rule(&["soviet", "communist"], style::SOVIET),
    rule(&["mediterranean"], style::MEDITERRANEAN),
    rule(&["scandinavian"], style::SCANDINAVIAN),
];

/// Accumulating: every match is kept.
pub static ARCHITECTURE_COLORS: &[KeywordRule] = &[
    rule(&["red"], "red"),
    rule(&["white"], "white"),
    rule(&["blue"], "blue"),
    rule(&["yellow"], "yellow"),
    rule(&["green"], "green"),
];

pub static ROOF_TYPE: &[KeywordRule] = &[
    rule(&["flat roof"], "flat"),
    rule(&["pitched roof", "sloped roof"], "pitched"),
    rule(&["tile roof", "tiled roof"], "tiled"),
    rule(&["metal roof"], "metal"),
];

pub static DENSITY: &[KeywordRule] = &[
    rule(&["urban", "city", "downtown"], density::URBAN),
    rule(&["suburban", "residential"], density::SUBURBAN),
    rule(&["rural", "countryside", "village"], density::RURAL),
];

/// Accumulating: every match is kept.
pub static VEHICLE_BRANDS: &[KeywordRule] = &[
    rule(&["toyota"], brand::TOYOTA),
    rule(&["honda"], brand::HONDA),
    rule(&["ford"], brand::FORD),
    rule(&["volkswagen", "vw"], brand::VOLKSWAGEN),
    rule(&["mercedes"], brand::MERCEDES),
    rule(&["bmw"], brand::BMW),
];

pub static VEGETATION: &[KeywordRule] = &[
    rule(&["tropical", "palm"], vegetation::TROPICAL),
    rule(&["temperate", "deciduous"], vegetation::TEMPERATE),
    rule(&["coniferous", "pine", "evergreen"], vegetation::CONIFEROUS),
    rule(&["desert", "arid"], vegetation::ARID),
    rule(&["mediterranean"], vegetation::MEDITERRANEAN),
    rule(&["grassland", "prairie"], vegetation::GRASSLAND),
];

pub static TERRAIN: &[KeywordRule] = &[
    rule(&["flat", "plains"], terrain::FLAT),
    rule(&["hilly", "hills"], terrain::HILLY),
    rule(&["mountain"], terrain::MOUNTAINS),
    rule(&["valley"], terrain::VALLEY),
];

pub static CLIMATE: &[KeywordRule] = &[
    rule(&["tropical", "humid"], climate::TROPICAL),
    rule(&["arid", "dry", "desert"], climate::ARID),
    rule(&["temperate"], climate::TEMPERATE),
    rule(&["cold", "snow"], climate::COLD),
    rule(&["mediterranean"], climate::MEDITERRANEAN),
];

/// A match sets `coast_proximity` to `"true"`.
pub static COAST: &[KeywordRule] = &[rule(&["ocean", "sea", "coast", "beach"], "true")];

pub static ALTITUDE: &[KeywordRule] = &[
    rule(&["high altitude", "mountain"], "highland"),
    rule(&["sea level", "lowland"], "lowland"),
];

/// Accumulating: notable phrases collected into `meta.unique_clues`.
pub static UNIQUE_CLUES: &[KeywordRule] = &[
    rule(&["google street view"], "Street View imagery"),
    rule(&["license plate"], "Visible license plates"),
    rule(&["street sign"], "Street signage visible"),
    rule(&["flag"], "National flag visible"),
];

// --- Prediction tables ---

/// Detected sign language to the country it most strongly suggests.
pub static LANGUAGE_COUNTRIES: &[(&str, &str)] = &[
    (language::SPANISH, "Spain"),
    (language::FRENCH, "France"),
    (language::GERMAN, "Germany"),
    (language::CYRILLIC, "Russia"),
    (language::CHINESE, "China"),
    (language::ARABIC, "Morocco"),
];

/// Architecture style to country.
pub static STYLE_COUNTRIES: &[(&str, &str)] = &[
    (style::SOVIET, "Poland"),
    (style::COLONIAL, "Mexico"),
    (style::SCANDINAVIAN, "Sweden"),
    (style::MEDITERRANEAN, "Spain"),
];

/// Last-resort choices, indexed by a content-derived value.
pub static DEFAULT_COUNTRIES: &[&str] = &[
    "United Kingdom",
    "France",
    "Germany",
    "Italy",
    "Spain",
    "Australia",
    "Canada",
    "Brazil",
    "Argentina",
    "South Africa",
    "Sweden",
    "Norway",
    "Poland",
    "Czech Republic",
    "Japan",
];

/// Look up `key` in a pair table, comparing case-insensitively.
pub fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}
