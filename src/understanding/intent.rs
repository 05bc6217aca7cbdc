//! Query intent detection.
//!
//! Intent detection is keyword-driven: each [`IntentRule`] carries trigger
//! substrings and a confidence. Every matching rule contributes a candidate,
//! candidates are sorted by confidence with table order breaking ties, and
//! the strongest candidate becomes the primary intent.

use serde::{Deserialize, Serialize};

/// High-level shopping intent behind a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentClass {
    /// Generic product lookup. Also the fallback when nothing else matches.
    ProductSearch,
    /// Browsing a whole category.
    CategoryBrowse,
    /// Searching within a specific brand.
    BrandSpecific,
    /// Shopping by marketplace values (sustainable, vegan, ...).
    ValueDriven,
    /// Comparing products against each other.
    Comparison,
    /// Asking for recommendations or top picks.
    Recommendation,
    /// Asking for an explicit ordering of results.
    Sort,
    /// Narrowing results down by attributes.
    Filter,
}

impl IntentClass {
    /// Lowercase name used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentClass::ProductSearch => "product_search",
            IntentClass::CategoryBrowse => "category_browse",
            IntentClass::BrandSpecific => "brand_specific",
            IntentClass::ValueDriven => "value_driven",
            IntentClass::Comparison => "comparison",
            IntentClass::Recommendation => "recommendation",
            IntentClass::Sort => "sort",
            IntentClass::Filter => "filter",
        }
    }
}

impl std::fmt::Display for IntentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One intent candidate with its confidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentCandidate {
    /// The candidate intent class.
    pub intent: IntentClass,
    /// Detection confidence in (0, 1].
    pub confidence: f32,
}

impl IntentCandidate {
    /// Create a new candidate.
    pub fn new(intent: IntentClass, confidence: f32) -> Self {
        IntentCandidate { intent, confidence }
    }
}

/// Detected intent: the strongest candidate plus the remaining ones in
/// descending confidence order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// The winning intent class.
    pub primary: IntentClass,
    /// Confidence of the primary intent.
    pub confidence: f32,
    /// Weaker candidates, strongest first.
    pub secondary: Vec<IntentCandidate>,
}

impl Intent {
    /// The intent reported when understanding degrades and nothing could be
    /// detected.
    pub fn fallback() -> Self {
        Intent {
            primary: IntentClass::ProductSearch,
            confidence: 0.5,
            secondary: Vec::new(),
        }
    }
}

/// One detection rule: trigger substrings and the confidence they grant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentRule {
    /// The intent this rule votes for.
    pub intent: IntentClass,
    /// Lowercase substrings that trigger the rule.
    pub triggers: Vec<String>,
    /// Confidence when a trigger matches.
    pub confidence: f32,
    /// Confidence contributed even without a match, if any. Only the
    /// product-search rule carries one, which makes it the guaranteed
    /// fallback candidate.
    pub fallback_confidence: Option<f32>,
}

impl IntentRule {
    /// Create a rule with no fallback.
    pub fn new(intent: IntentClass, triggers: &[&str], confidence: f32) -> Self {
        IntentRule {
            intent,
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            confidence,
            fallback_confidence: None,
        }
    }

    /// Create a rule that still contributes a weaker candidate when none of
    /// its triggers match.
    pub fn with_fallback(
        intent: IntentClass,
        triggers: &[&str],
        confidence: f32,
        fallback_confidence: f32,
    ) -> Self {
        IntentRule {
            fallback_confidence: Some(fallback_confidence),
            ..Self::new(intent, triggers, confidence)
        }
    }

    fn evaluate(&self, query: &str) -> Option<IntentCandidate> {
        if self.triggers.iter().any(|t| query.contains(t.as_str())) {
            Some(IntentCandidate::new(self.intent, self.confidence))
        } else {
            self.fallback_confidence
                .map(|confidence| IntentCandidate::new(self.intent, confidence))
        }
    }
}

fn default_rules() -> Vec<IntentRule> {
    use IntentClass::*;

    vec![
        IntentRule::with_fallback(ProductSearch, &["find", "search", "looking for"], 0.8, 0.6),
        IntentRule::new(CategoryBrowse, &["browse", "explore", "show me all"], 0.85),
        IntentRule::new(BrandSpecific, &["by ", "from ", "brand"], 0.85),
        IntentRule::new(
            ValueDriven,
            &[
                "sustainable",
                "organic",
                "vegan",
                "fair trade",
                "handmade",
                "recycled",
                "local",
            ],
            0.85,
        ),
        IntentRule::new(Comparison, &["compare", "vs", "versus", "difference between"], 0.9),
        IntentRule::new(Recommendation, &["recommend", "suggest", "best", "top"], 0.9),
        IntentRule::new(Sort, &["sort", "order by", "high to low", "low to high"], 0.9),
        IntentRule::new(Filter, &["filter", "only show", "with", "that have"], 0.85),
    ]
}

/// Keyword-driven intent detector.
#[derive(Clone, Debug)]
pub struct IntentDetector {
    rules: Vec<IntentRule>,
}

impl IntentDetector {
    /// Create a detector with the default rule table.
    pub fn new() -> Self {
        IntentDetector {
            rules: default_rules(),
        }
    }

    /// Create a detector with a custom rule table.
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        IntentDetector { rules }
    }

    /// The rule table in evaluation order.
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Detect the intent of the raw query.
    pub fn detect(&self, raw_query: &str) -> Intent {
        let query = raw_query.to_lowercase();
        let mut candidates: Vec<IntentCandidate> =
            self.rules.iter().filter_map(|r| r.evaluate(&query)).collect();

        // Stable sort keeps rule-table order among equal confidences.
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut remaining = candidates.into_iter();
        match remaining.next() {
            Some(primary) => Intent {
                primary: primary.intent,
                confidence: primary.confidence,
                secondary: remaining.collect(),
            },
            None => Intent::fallback(),
        }
    }
}

impl Default for IntentDetector {
    fn default() -> Self {
        Self::new()
    }
}
