//! Engine configuration.
//!
//! Static, read-only configuration injected into the engine at construction:
//! per-entity-type relevance weights, personalization factors, the field
//! boosts synthesized for each detected intent, and facet aggregation limits.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AgoraError, Result};

/// Per-entity-type relevance weights and personalization factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityBoostConfig {
    /// Score multiplier for product hits in mixed-type searches.
    pub product: f32,
    /// Score multiplier for brand hits in mixed-type searches.
    pub brand: f32,
    /// Score multiplier for merchant hits in mixed-type searches.
    pub merchant: f32,
    /// Multiplier applied to hits the user has viewed before.
    pub user_history_boost_factor: f32,
    /// Multiplier applied to hits matching the user's stated preferences.
    pub user_preferences_boost_factor: f32,
}

impl Default for EntityBoostConfig {
    fn default() -> Self {
        Self {
            product: 1.0,
            brand: 0.8,
            merchant: 0.8,
            user_history_boost_factor: 1.2,
            user_preferences_boost_factor: 1.5,
        }
    }
}

impl EntityBoostConfig {
    /// Validate that all weights are positive and finite.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("product", self.product),
            ("brand", self.brand),
            ("merchant", self.merchant),
            ("user_history_boost_factor", self.user_history_boost_factor),
            (
                "user_preferences_boost_factor",
                self.user_preferences_boost_factor,
            ),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AgoraError::invalid_config(format!(
                    "boost '{name}' must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Field boosts synthesized into search parameters for each detected intent.
///
/// Keys are index field names, values are boost weights. Intents without an
/// entry here (sort, filter) contribute no field boosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Field boosts for product-search intent.
    pub product_search: AHashMap<String, f32>,
    /// Field boosts for category-browse intent.
    pub category_browse: AHashMap<String, f32>,
    /// Field boosts for brand-specific intent.
    pub brand_specific: AHashMap<String, f32>,
    /// Field boosts for value-driven intent.
    pub value_driven: AHashMap<String, f32>,
    /// Field boosts for comparison intent.
    pub comparison: AHashMap<String, f32>,
    /// Field boosts for recommendation intent.
    pub recommendation: AHashMap<String, f32>,
}

fn boost_map(entries: &[(&str, f32)]) -> AHashMap<String, f32> {
    entries
        .iter()
        .map(|(field, weight)| ((*field).to_string(), *weight))
        .collect()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            product_search: boost_map(&[("name", 2.0), ("description", 1.0), ("categories", 1.5)]),
            category_browse: boost_map(&[
                ("categories", 3.0),
                ("name", 1.0),
                ("description", 0.5),
            ]),
            brand_specific: boost_map(&[("brand", 3.0), ("name", 1.0)]),
            value_driven: boost_map(&[("values", 3.0), ("description", 2.0), ("name", 1.0)]),
            comparison: boost_map(&[("name", 2.0), ("description", 1.0)]),
            recommendation: boost_map(&[("rating", 2.0), ("review_count", 1.5), ("name", 1.0)]),
        }
    }
}

impl SynthesisConfig {
    /// Validate that every boost weight is positive and finite.
    pub fn validate(&self) -> Result<()> {
        for (intent, boosts) in [
            ("product_search", &self.product_search),
            ("category_browse", &self.category_browse),
            ("brand_specific", &self.brand_specific),
            ("value_driven", &self.value_driven),
            ("comparison", &self.comparison),
            ("recommendation", &self.recommendation),
        ] {
            for (field, weight) in boosts {
                if !weight.is_finite() || *weight <= 0.0 {
                    return Err(AgoraError::invalid_config(format!(
                        "{intent} boost for field '{field}' must be positive and finite, got {weight}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Facet aggregation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetConfig {
    /// Maximum number of values returned per facet.
    pub max_values_per_facet: usize,
    /// Document count above which aggregation runs in parallel.
    pub parallel_threshold: usize,
}

impl Default for FacetConfig {
    fn default() -> Self {
        Self {
            max_values_per_facet: 100,
            parallel_threshold: 512,
        }
    }
}

impl FacetConfig {
    /// Validate the facet limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_values_per_facet == 0 {
            return Err(AgoraError::invalid_config(
                "max_values_per_facet must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-entity-type weights and personalization factors.
    pub boosts: EntityBoostConfig,
    /// Per-intent field boosts for parameter synthesis.
    pub synthesis: SynthesisConfig,
    /// Facet aggregation limits.
    pub facets: FacetConfig,
}

impl EngineConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entity boost configuration.
    pub fn with_boosts(mut self, boosts: EntityBoostConfig) -> Self {
        self.boosts = boosts;
        self
    }

    /// Replace the synthesis configuration.
    pub fn with_synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesis = synthesis;
        self
    }

    /// Replace the facet configuration.
    pub fn with_facets(mut self, facets: FacetConfig) -> Self {
        self.facets = facets;
        self
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<()> {
        self.boosts.validate()?;
        self.synthesis.validate()?;
        self.facets.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_boost_defaults() {
        let boosts = EntityBoostConfig::default();
        assert_eq!(boosts.product, 1.0);
        assert_eq!(boosts.brand, 0.8);
        assert_eq!(boosts.merchant, 0.8);
        assert_eq!(boosts.user_history_boost_factor, 1.2);
        assert_eq!(boosts.user_preferences_boost_factor, 1.5);
    }

    #[test]
    fn test_synthesis_defaults() {
        let synthesis = SynthesisConfig::default();
        assert_eq!(synthesis.product_search.get("name"), Some(&2.0));
        assert_eq!(synthesis.category_browse.get("categories"), Some(&3.0));
        assert_eq!(synthesis.brand_specific.get("brand"), Some(&3.0));
        assert_eq!(synthesis.value_driven.get("values"), Some(&3.0));
        assert_eq!(synthesis.recommendation.get("review_count"), Some(&1.5));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_boost_rejected() {
        let config = EngineConfig::default().with_boosts(EntityBoostConfig {
            product: 0.0,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_facet_limit_rejected() {
        let config = EngineConfig::default().with_facets(FacetConfig {
            max_values_per_facet: 0,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }
}
