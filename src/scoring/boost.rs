//! Per-entity-type score boosting for mixed-scope searches.
//!
//! When one request spans products, brands, and merchants, each type's hits
//! are weighted before normalization so that, for example, brand profiles do
//! not crowd out products. Single-type scopes skip boosting entirely: a
//! uniform multiplier cannot change the order within one type.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::EntityBoostConfig;
use crate::document::EntityKind;
use crate::error::{AgoraError, Result};
use crate::scoring::normalize::ScoredResult;
use crate::search::request::EntityScope;

/// Request-level overrides for the per-entity-type weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBoostOverrides {
    /// Override for the product weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<f32>,
    /// Override for the brand weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<f32>,
    /// Override for the merchant weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<f32>,
}

impl EntityBoostOverrides {
    /// Validate that every set override is positive and finite.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("product", self.product),
            ("brand", self.brand),
            ("merchant", self.merchant),
        ] {
            if let Some(value) = value
                && (!value.is_finite() || value <= 0.0)
            {
                return Err(AgoraError::invalid_request(format!(
                    "custom boost '{name}' must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// The weight applied to hits of `kind`: override wins, else the configured
/// default.
pub fn boost_for(
    kind: EntityKind,
    config: &EntityBoostConfig,
    overrides: Option<&EntityBoostOverrides>,
) -> f32 {
    let override_value = overrides.and_then(|o| match kind {
        EntityKind::Product => o.product,
        EntityKind::Brand => o.brand,
        EntityKind::Merchant => o.merchant,
    });
    override_value.unwrap_or(match kind {
        EntityKind::Product => config.product,
        EntityKind::Brand => config.brand,
        EntityKind::Merchant => config.merchant,
    })
}

/// Multiply each hit's working score by its entity-type weight. No-op unless
/// the scope mixes entity types.
pub fn apply_entity_boosting(
    results: &mut [ScoredResult],
    scope: EntityScope,
    config: &EntityBoostConfig,
    overrides: Option<&EntityBoostOverrides>,
) {
    if scope != EntityScope::All {
        return;
    }
    for result in results.iter_mut() {
        result.score *= boost_for(result.hit.entity_type, config, overrides);
    }
}

/// Wrap a backend query body in a function-score construct weighting each
/// entity type. Single-type scopes return the body unchanged.
pub fn enhance_query_with_entity_boosting(
    base: Value,
    scope: EntityScope,
    config: &EntityBoostConfig,
    overrides: Option<&EntityBoostOverrides>,
) -> Value {
    if scope != EntityScope::All {
        return base;
    }
    let functions: Vec<Value> = EntityScope::All
        .target_kinds()
        .iter()
        .map(|&kind| {
            json!({
                "filter": { "term": { "entity_type": kind.as_str() } },
                "weight": boost_for(kind, config, overrides),
            })
        })
        .collect();
    json!({
        "function_score": {
            "query": base,
            "functions": functions,
            "score_mode": "multiply",
            "boost_mode": "multiply",
        }
    })
}
