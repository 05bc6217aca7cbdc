//! Search parameter synthesis.
//!
//! Turns a detected intent and the recognized entities into concrete
//! retrieval parameters: per-field boosts, sort clauses, and structured
//! filters. Field boosts come from [`SynthesisConfig`]; the filter side is
//! split between intent-gated filters (categories, brands, values) and
//! entity constraints that always apply (price, color, size, material,
//! rating).

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::config::SynthesisConfig;
use crate::understanding::entity::{RecognizedEntity, RecognizedEntityType};
use crate::understanding::intent::{Intent, IntentClass};

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One sort clause over an index field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortClause {
    /// Index field to sort on (`price`, `rating`, `created_at`).
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortClause {
    /// Create a sort clause.
    pub fn new<S: Into<String>>(field: S, order: SortOrder) -> Self {
        SortClause {
            field: field.into(),
            order,
        }
    }

    /// Ascending clause over `field`.
    pub fn asc<S: Into<String>>(field: S) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Descending clause over `field`.
    pub fn desc<S: Into<String>>(field: S) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// Structured filters derived from the query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Category filter values (set on category-browse intent).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Brand filter values (set on brand-specific intent).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
    /// Marketplace-value filter values (set on value-driven intent).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Color constraints, applied on every intent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    /// Size constraints, applied on every intent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    /// Material constraints, applied on every intent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,
    /// Lower price bound in dollars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    /// Upper price bound in dollars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    /// Minimum rating (from `4+` style constraints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_min: Option<f32>,
    /// Exact rating (from constraints without a `+`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl FilterSet {
    /// True when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.brands.is_empty()
            && self.values.is_empty()
            && self.colors.is_empty()
            && self.sizes.is_empty()
            && self.materials.is_empty()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.rating_min.is_none()
            && self.rating.is_none()
    }
}

/// Retrieval parameters synthesized from one understood query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Per-field boost weights.
    pub boost: AHashMap<String, f32>,
    /// Sort clauses, strongest first. Empty means relevance order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortClause>,
    /// Structured filters.
    #[serde(default)]
    pub filters: FilterSet,
}

impl SearchParameters {
    /// Synthesize parameters from the detected intent and entities.
    pub fn synthesize(
        intent: &Intent,
        entities: &[RecognizedEntity],
        raw_query: &str,
        config: &SynthesisConfig,
    ) -> Self {
        let mut params = SearchParameters::default();
        let query = raw_query.to_lowercase();

        match intent.primary {
            IntentClass::ProductSearch => params.boost = config.product_search.clone(),
            IntentClass::CategoryBrowse => {
                params.boost = config.category_browse.clone();
                params.filters.categories =
                    values_of(entities, RecognizedEntityType::Category);
            }
            IntentClass::BrandSpecific => {
                params.boost = config.brand_specific.clone();
                params.filters.brands = values_of(entities, RecognizedEntityType::Brand);
            }
            IntentClass::ValueDriven => {
                params.boost = config.value_driven.clone();
                params.filters.values = values_of(entities, RecognizedEntityType::Value);
            }
            IntentClass::Comparison => params.boost = config.comparison.clone(),
            IntentClass::Recommendation => {
                params.boost = config.recommendation.clone();
                params.sort.push(SortClause::desc("rating"));
            }
            IntentClass::Sort => {
                if let Some(clause) = sort_clause_from_query(&query) {
                    params.sort.push(clause);
                }
            }
            IntentClass::Filter => {}
        }

        apply_entity_constraints(entities, &mut params.filters);
        params
    }
}

/// Map a sort-intent query onto at most one sort clause.
fn sort_clause_from_query(query: &str) -> Option<SortClause> {
    if query.contains("price") {
        let order = if query.contains("high to low") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        Some(SortClause::new("price", order))
    } else if query.contains("rating") || query.contains("reviews") {
        Some(SortClause::desc("rating"))
    } else if query.contains("new") || query.contains("recent") {
        Some(SortClause::desc("created_at"))
    } else {
        None
    }
}

fn values_of(entities: &[RecognizedEntity], kind: RecognizedEntityType) -> Vec<String> {
    entities
        .iter()
        .filter(|e| e.entity_type == kind)
        .map(|e| e.value.clone())
        .collect()
}

/// Constraints that apply regardless of intent. Category, brand, and value
/// entities stay intent-gated and are not handled here.
fn apply_entity_constraints(entities: &[RecognizedEntity], filters: &mut FilterSet) {
    for entity in entities {
        match entity.entity_type {
            RecognizedEntityType::Price => {
                if let Some((min, max)) = entity.value.split_once('-')
                    && let (Ok(min), Ok(max)) = (min.parse::<f64>(), max.parse::<f64>())
                {
                    filters.price_min = Some(min);
                    filters.price_max = Some(max);
                }
            }
            RecognizedEntityType::Color => filters.colors.push(entity.value.clone()),
            RecognizedEntityType::Size => filters.sizes.push(entity.value.clone()),
            RecognizedEntityType::Material => filters.materials.push(entity.value.clone()),
            RecognizedEntityType::Rating => {
                if let Some(stripped) = entity.value.strip_suffix('+') {
                    if let Ok(rating) = stripped.parse::<f32>() {
                        filters.rating_min = Some(rating);
                    }
                } else if let Ok(rating) = entity.value.parse::<f32>() {
                    filters.rating = Some(rating);
                }
            }
            RecognizedEntityType::Category
            | RecognizedEntityType::Brand
            | RecognizedEntityType::Value => {}
        }
    }
}
