//! Entity recognition over raw query text.
//!
//! Recognition is deterministic and lexicon-driven: a fixed table of
//! [`LexiconRule`] rows is matched as lowercase substrings against the raw
//! query, and three regex rules pick up sizes and price expressions. No
//! trained models are involved.

use std::sync::LazyLock;

use ahash::AHashSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The kind of marketplace concept a recognized entity names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizedEntityType {
    /// A catalog category (dresses, shoes, skincare, ...).
    Category,
    /// A known brand name.
    Brand,
    /// A marketplace value (sustainable, handmade, ...).
    Value,
    /// A color.
    Color,
    /// A material (cotton, vegan leather, ...).
    Material,
    /// A numeric size.
    Size,
    /// A price constraint, encoded as `"min-max"`.
    Price,
    /// A minimum-rating constraint (`"4+"`, `"4.5+"`).
    Rating,
}

impl RecognizedEntityType {
    /// Lowercase name used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognizedEntityType::Category => "category",
            RecognizedEntityType::Brand => "brand",
            RecognizedEntityType::Value => "value",
            RecognizedEntityType::Color => "color",
            RecognizedEntityType::Material => "material",
            RecognizedEntityType::Size => "size",
            RecognizedEntityType::Price => "price",
            RecognizedEntityType::Rating => "rating",
        }
    }
}

impl std::fmt::Display for RecognizedEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entity recognized in a query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// What kind of concept was recognized.
    pub entity_type: RecognizedEntityType,
    /// Canonical value, always lowercase.
    pub value: String,
    /// Recognition confidence in (0, 1].
    pub confidence: f32,
}

impl RecognizedEntity {
    /// Create a new recognized entity.
    pub fn new<S: Into<String>>(
        entity_type: RecognizedEntityType,
        value: S,
        confidence: f32,
    ) -> Self {
        RecognizedEntity {
            entity_type,
            value: value.into(),
            confidence,
        }
    }
}

/// One lexicon row: when any pattern occurs in the lowercased query, the row
/// emits its canonical value once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LexiconRule {
    /// The entity type this row recognizes.
    pub entity_type: RecognizedEntityType,
    /// Lowercase substrings that trigger the row, longest first.
    pub patterns: Vec<String>,
    /// Canonical value emitted on a match.
    pub value: String,
    /// Confidence assigned to the emitted entity.
    pub confidence: f32,
}

impl LexiconRule {
    /// Create a rule; patterns are lowercased and ordered longest first.
    pub fn new(
        entity_type: RecognizedEntityType,
        patterns: &[&str],
        value: &str,
        confidence: f32,
    ) -> Self {
        let mut patterns: Vec<String> = patterns.iter().map(|p| p.to_lowercase()).collect();
        patterns.sort_by_key(|p| std::cmp::Reverse(p.len()));
        LexiconRule {
            entity_type,
            patterns,
            value: value.to_lowercase(),
            confidence,
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.patterns.iter().any(|p| query.contains(p.as_str()))
    }
}

/// Catalog categories recognized as single words.
const CATALOG_CATEGORIES: &[&str] = &[
    "clothing",
    "tops",
    "bottoms",
    "pants",
    "skirts",
    "shorts",
    "outerwear",
    "jackets",
    "coats",
    "sweaters",
    "activewear",
    "swimwear",
    "lingerie",
    "sleepwear",
    "accessories",
    "shoes",
    "bags",
    "jewelry",
    "watches",
    "sunglasses",
    "hats",
    "scarves",
    "gloves",
    "belts",
    "socks",
    "home",
    "bedding",
    "bath",
    "kitchen",
    "furniture",
    "decor",
    "beauty",
    "skincare",
    "makeup",
    "haircare",
    "fragrance",
    "wellness",
];

/// Known marketplace brands beyond the flagship row.
const KNOWN_BRANDS: &[&str] = &[
    "avnu",
    "sustainable threads",
    "green earth",
    "ethical choice",
    "conscious couture",
    "fair fashion",
    "earth friendly",
    "pure planet",
    "organic basics",
    "recycled revolution",
    "upcycled unique",
    "local luxe",
    "small batch beauty",
    "artisan alliance",
];

/// Marketplace values beyond the core set.
const EXTENDED_VALUES: &[&str] = &[
    "ethical",
    "eco-friendly",
    "upcycled",
    "small batch",
    "carbon neutral",
    "zero waste",
    "plastic free",
    "biodegradable",
    "compostable",
    "renewable",
    "cruelty-free",
    "non-toxic",
    "chemical-free",
];

/// Colors beyond the four high-confidence ones.
const EXTENDED_COLORS: &[&str] = &[
    "green",
    "yellow",
    "orange",
    "purple",
    "pink",
    "brown",
    "gray",
    "grey",
    "beige",
    "navy",
    "teal",
    "gold",
    "silver",
    "multicolor",
    "multi-color",
];

/// Known materials.
const KNOWN_MATERIALS: &[&str] = &[
    "cotton",
    "organic cotton",
    "polyester",
    "recycled polyester",
    "wool",
    "silk",
    "linen",
    "leather",
    "vegan leather",
    "denim",
    "velvet",
    "satin",
    "nylon",
    "cashmere",
    "fleece",
    "suede",
    "canvas",
    "corduroy",
    "bamboo",
    "hemp",
    "tencel",
    "modal",
    "rayon",
    "viscose",
];

static PRICE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\d+(?:\.\d+)?)\s*(?:to|-)\s*\$(\d+(?:\.\d+)?)")
        .expect("static regex: price range")
});

static SINGLE_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:under|less than|below|above|over|more than)\s*\$(\d+(?:\.\d+)?)")
        .expect("static regex: single price")
});

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"size\s+(\d+)").expect("static regex: size"));

/// Build the default lexicon table.
fn default_rules() -> Vec<LexiconRule> {
    use RecognizedEntityType::*;

    let mut rules = vec![
        // Core category rows, with canonical plural values.
        LexiconRule::new(Category, &["dress", "dresses"], "dresses", 0.9),
        LexiconRule::new(Category, &["t-shirt", "tee", "shirt"], "shirts", 0.85),
        LexiconRule::new(Category, &["jeans", "denim"], "jeans", 0.9),
    ];
    rules.extend(
        CATALOG_CATEGORIES
            .iter()
            .map(|&word| LexiconRule::new(Category, &[word], word, 0.85)),
    );

    rules.push(LexiconRule::new(
        Brand,
        &["eco collective", "eco-collective"],
        "eco collective",
        0.95,
    ));
    rules.extend(
        KNOWN_BRANDS
            .iter()
            .map(|&name| LexiconRule::new(Brand, &[name], name, 0.95)),
    );

    for value in [
        "sustainable",
        "organic",
        "vegan",
        "fair trade",
        "handmade",
        "recycled",
    ] {
        rules.push(LexiconRule::new(Value, &[value], value, 0.9));
    }
    rules.push(LexiconRule::new(Value, &["local"], "local", 0.8));
    rules.extend(
        EXTENDED_VALUES
            .iter()
            .map(|&value| LexiconRule::new(Value, &[value], value, 0.85)),
    );

    for color in ["black", "white", "red", "blue"] {
        rules.push(LexiconRule::new(Color, &[color], color, 0.95));
    }
    rules.extend(
        EXTENDED_COLORS
            .iter()
            .map(|&color| LexiconRule::new(Color, &[color], color, 0.85)),
    );

    rules.extend(
        KNOWN_MATERIALS
            .iter()
            .map(|&material| LexiconRule::new(Material, &[material], material, 0.8)),
    );

    rules.push(LexiconRule::new(
        Rating,
        &["good reviews", "well reviewed"],
        "4+",
        0.8,
    ));
    rules.push(LexiconRule::new(
        Rating,
        &["best rated", "top rated"],
        "4.5+",
        0.9,
    ));

    rules
}

/// Lexicon- and regex-driven entity extractor.
///
/// Extraction runs over the raw query lowercased, so multi-word phrases and
/// `$` amounts match even though the tokenizer would split them apart.
#[derive(Clone, Debug)]
pub struct EntityExtractor {
    rules: Vec<LexiconRule>,
}

impl EntityExtractor {
    /// Create an extractor with the default lexicon table.
    pub fn new() -> Self {
        EntityExtractor {
            rules: default_rules(),
        }
    }

    /// Create an extractor with a custom lexicon table.
    pub fn with_rules(rules: Vec<LexiconRule>) -> Self {
        EntityExtractor { rules }
    }

    /// The lexicon table in evaluation order.
    pub fn rules(&self) -> &[LexiconRule] {
        &self.rules
    }

    /// Extract all entities from the raw query.
    ///
    /// Lexicon rows are evaluated in table order, then sizes, then price
    /// expressions. Duplicate (type, value) pairs keep the first occurrence.
    pub fn extract(&self, raw_query: &str) -> Vec<RecognizedEntity> {
        let query = raw_query.to_lowercase();
        let mut entities = Vec::new();

        for rule in &self.rules {
            if rule.matches(&query) {
                entities.push(RecognizedEntity::new(
                    rule.entity_type,
                    rule.value.clone(),
                    rule.confidence,
                ));
            }
        }

        extract_size(&query, &mut entities);
        extract_price_ranges(&query, &mut entities);
        extract_single_prices(&query, &mut entities);

        let mut seen: AHashSet<(RecognizedEntityType, String)> = AHashSet::new();
        entities.retain(|entity| seen.insert((entity.entity_type, entity.value.clone())));
        entities
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First `size N` occurrence only.
fn extract_size(query: &str, entities: &mut Vec<RecognizedEntity>) {
    if let Some(caps) = SIZE_RE.captures(query)
        && let Some(digits) = caps.get(1)
    {
        entities.push(RecognizedEntity::new(
            RecognizedEntityType::Size,
            digits.as_str(),
            0.9,
        ));
    }
}

/// Every `$A to $B` / `$A-$B` occurrence becomes one price entity.
fn extract_price_ranges(query: &str, entities: &mut Vec<RecognizedEntity>) {
    for caps in PRICE_RANGE_RE.captures_iter(query) {
        let (Some(min), Some(max)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (Ok(min), Ok(max)) = (min.as_str().parse::<f64>(), max.as_str().parse::<f64>()) else {
            continue;
        };
        if !min.is_finite() || !max.is_finite() {
            continue;
        }
        entities.push(RecognizedEntity::new(
            RecognizedEntityType::Price,
            format!("{min}-{max}"),
            0.95,
        ));
    }
}

/// `under $50` style bounds: under/less than/below cap the price, the other
/// qualifiers floor it against an open 9999 ceiling.
fn extract_single_prices(query: &str, entities: &mut Vec<RecognizedEntity>) {
    for caps in SINGLE_PRICE_RE.captures_iter(query) {
        let (Some(whole), Some(amount)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(amount) = amount.as_str().parse::<f64>() else {
            continue;
        };
        if !amount.is_finite() {
            continue;
        }
        let capped = ["under", "less than", "below"]
            .iter()
            .any(|qualifier| whole.as_str().starts_with(qualifier));
        let value = if capped {
            format!("0-{amount}")
        } else {
            format!("{amount}-9999")
        };
        entities.push(RecognizedEntity::new(
            RecognizedEntityType::Price,
            value,
            0.9,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(entities: &[RecognizedEntity], entity_type: RecognizedEntityType, value: &str) -> bool {
        entities
            .iter()
            .any(|e| e.entity_type == entity_type && e.value == value)
    }

    fn confidence_of(
        entities: &[RecognizedEntity],
        entity_type: RecognizedEntityType,
        value: &str,
    ) -> f32 {
        entities
            .iter()
            .find(|e| e.entity_type == entity_type && e.value == value)
            .map(|e| e.confidence)
            .unwrap_or(0.0)
    }

    #[test]
    fn test_category_value_and_price() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("sustainable dress under $100");

        assert!(has(&entities, RecognizedEntityType::Category, "dresses"));
        assert!(has(&entities, RecognizedEntityType::Value, "sustainable"));
        assert!(has(&entities, RecognizedEntityType::Price, "0-100"));
        assert_eq!(
            confidence_of(&entities, RecognizedEntityType::Category, "dresses"),
            0.9
        );
        assert_eq!(
            confidence_of(&entities, RecognizedEntityType::Price, "0-100"),
            0.9
        );
    }

    #[test]
    fn test_brand_and_materials() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("organic cotton t-shirts by eco collective");

        assert!(has(&entities, RecognizedEntityType::Brand, "eco collective"));
        assert!(has(&entities, RecognizedEntityType::Category, "shirts"));
        assert!(has(&entities, RecognizedEntityType::Value, "organic"));
        assert!(has(&entities, RecognizedEntityType::Material, "cotton"));
        assert!(has(
            &entities,
            RecognizedEntityType::Material,
            "organic cotton"
        ));
        assert_eq!(
            confidence_of(&entities, RecognizedEntityType::Brand, "eco collective"),
            0.95
        );
    }

    #[test]
    fn test_price_range() {
        let extractor = EntityExtractor::new();

        let entities = extractor.extract("dresses from $50 to $100");
        assert!(has(&entities, RecognizedEntityType::Price, "50-100"));
        assert_eq!(
            confidence_of(&entities, RecognizedEntityType::Price, "50-100"),
            0.95
        );

        let entities = extractor.extract("bags $25.50-$80");
        assert!(has(&entities, RecognizedEntityType::Price, "25.5-80"));
    }

    #[test]
    fn test_single_price_directions() {
        let extractor = EntityExtractor::new();

        let under = extractor.extract("shoes under $49.99");
        assert!(has(&under, RecognizedEntityType::Price, "0-49.99"));

        let over = extractor.extract("watches above $200");
        assert!(has(&over, RecognizedEntityType::Price, "200-9999"));
    }

    #[test]
    fn test_size_first_match_only() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("recycled denim jeans size 32 or size 34");

        let sizes: Vec<_> = entities
            .iter()
            .filter(|e| e.entity_type == RecognizedEntityType::Size)
            .collect();
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].value, "32");
        assert!(has(&entities, RecognizedEntityType::Category, "jeans"));
        assert!(has(&entities, RecognizedEntityType::Material, "denim"));
    }

    #[test]
    fn test_rating_phrases() {
        let extractor = EntityExtractor::new();

        let good = extractor.extract("vegan leather bags with good reviews");
        assert!(has(&good, RecognizedEntityType::Rating, "4+"));
        assert!(has(&good, RecognizedEntityType::Category, "bags"));
        assert!(has(&good, RecognizedEntityType::Material, "vegan leather"));

        let top = extractor.extract("top rated skincare");
        assert_eq!(
            confidence_of(&top, RecognizedEntityType::Rating, "4.5+"),
            0.9
        );
        assert!(has(&top, RecognizedEntityType::Category, "skincare"));
    }

    #[test]
    fn test_uppercase_query_is_lowercased() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Sustainable DRESS");

        assert!(has(&entities, RecognizedEntityType::Category, "dresses"));
        assert!(has(&entities, RecognizedEntityType::Value, "sustainable"));
    }

    #[test]
    fn test_no_duplicate_type_value_pairs() {
        let extractor = EntityExtractor::new();
        // "dress" and "dresses" trigger the same row; "denim" triggers both
        // the jeans category row and the denim material row.
        let entities = extractor.extract("dress dresses denim jeans");

        let mut seen = std::collections::HashSet::new();
        for entity in &entities {
            assert!(
                seen.insert((entity.entity_type, entity.value.clone())),
                "duplicate entity {entity:?}"
            );
        }
    }

    #[test]
    fn test_empty_query() {
        let extractor = EntityExtractor::new();
        assert!(extractor.extract("").is_empty());
    }
}
