//! Search request types.

use serde::{Deserialize, Serialize};

use crate::document::EntityKind;
use crate::error::{AgoraError, Result};
use crate::scoring::boost::EntityBoostOverrides;
use crate::understanding::parameters::SortClause;

/// Which entity types a search targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityScope {
    /// Products, brands, and merchants together.
    All,
    /// Products only.
    #[default]
    Product,
    /// Brands only.
    Brand,
    /// Merchants only.
    Merchant,
}

impl EntityScope {
    /// The concrete entity kinds this scope fans out to.
    pub fn target_kinds(&self) -> &'static [EntityKind] {
        match self {
            EntityScope::All => &[EntityKind::Product, EntityKind::Brand, EntityKind::Merchant],
            EntityScope::Product => &[EntityKind::Product],
            EntityScope::Brand => &[EntityKind::Brand],
            EntityScope::Merchant => &[EntityKind::Merchant],
        }
    }
}

/// Exact-value filter over one field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Field name.
    pub field: String,
    /// Accepted values; a document matches when it carries any of them.
    pub values: Vec<String>,
}

impl FieldFilter {
    /// Create a field filter.
    pub fn new<S: Into<String>>(field: S, values: &[&str]) -> Self {
        FieldFilter {
            field: field.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Numeric range filter over one field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Field name.
    pub field: String,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl RangeFilter {
    /// Create a range filter.
    pub fn new<S: Into<String>>(field: S, min: Option<f64>, max: Option<f64>) -> Self {
        RangeFilter {
            field: field.into(),
            min,
            max,
        }
    }
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

fn default_strength() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_pre_tag() -> String {
    "<em>".to_string()
}

fn default_post_tag() -> String {
    "</em>".to_string()
}

fn default_fragment_size() -> usize {
    150
}

/// One multi-entity search request.
///
/// Every knob has a serde default so clients can send only the query text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiEntitySearchRequest {
    /// Raw query text.
    pub query: String,
    /// Entity scope. Defaults to products only.
    #[serde(default)]
    pub entity_type: EntityScope,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Page size, 1..=100.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Caller-supplied sort clauses, applied by the gateway.
    #[serde(default)]
    pub sort: Vec<SortClause>,
    /// Caller-supplied exact-value filters.
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    /// Caller-supplied numeric range filters.
    #[serde(default)]
    pub range_filters: Vec<RangeFilter>,
    /// Run the query understanding pipeline.
    #[serde(default)]
    pub enable_nlp: bool,
    /// Apply user-profile boosts. Requires `user_id`.
    #[serde(default)]
    pub enable_personalization: bool,
    /// Personalization strength in [0, 2]; 0 disables, 1 is the configured
    /// factor, 2 doubles its effect.
    #[serde(default = "default_strength")]
    pub personalization_strength: f32,
    /// Weight marketplace-value matches in gateway scoring.
    #[serde(default = "default_true")]
    pub boost_by_values: bool,
    /// Wrap matched terms in the page's descriptions.
    #[serde(default)]
    pub enable_highlighting: bool,
    /// Opening highlight tag.
    #[serde(default = "default_pre_tag")]
    pub highlight_pre_tag: String,
    /// Closing highlight tag.
    #[serde(default = "default_post_tag")]
    pub highlight_post_tag: String,
    /// Highlight fragment window in characters.
    #[serde(default = "default_fragment_size")]
    pub highlight_fragment_size: usize,
    /// Profile key for personalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Per-entity-type boost overrides for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_boosts: Option<EntityBoostOverrides>,
}

impl MultiEntitySearchRequest {
    /// Create a request for `query` with every knob at its default.
    pub fn new<S: Into<String>>(query: S) -> Self {
        MultiEntitySearchRequest {
            query: query.into(),
            entity_type: EntityScope::default(),
            page: default_page(),
            limit: default_limit(),
            sort: Vec::new(),
            filters: Vec::new(),
            range_filters: Vec::new(),
            enable_nlp: false,
            enable_personalization: false,
            personalization_strength: default_strength(),
            boost_by_values: default_true(),
            enable_highlighting: false,
            highlight_pre_tag: default_pre_tag(),
            highlight_post_tag: default_post_tag(),
            highlight_fragment_size: default_fragment_size(),
            user_id: None,
            custom_boosts: None,
        }
    }

    /// Set the entity scope.
    pub fn with_scope(mut self, scope: EntityScope) -> Self {
        self.entity_type = scope;
        self
    }

    /// Set page and limit.
    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// Enable or disable query understanding.
    pub fn with_nlp(mut self, enable: bool) -> Self {
        self.enable_nlp = enable;
        self
    }

    /// Enable personalization for `user_id` at the given strength.
    pub fn with_personalization<S: Into<String>>(mut self, user_id: S, strength: f32) -> Self {
        self.enable_personalization = true;
        self.user_id = Some(user_id.into());
        self.personalization_strength = strength;
        self
    }

    /// Enable description highlighting.
    pub fn with_highlighting(mut self, enable: bool) -> Self {
        self.enable_highlighting = enable;
        self
    }

    /// Set per-entity-type boost overrides.
    pub fn with_custom_boosts(mut self, boosts: EntityBoostOverrides) -> Self {
        self.custom_boosts = Some(boosts);
        self
    }

    /// Validate request bounds before the pipeline runs.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(AgoraError::invalid_request("query must not be empty"));
        }
        if self.page < 1 {
            return Err(AgoraError::invalid_request("page must be at least 1"));
        }
        if self.limit < 1 || self.limit > 100 {
            return Err(AgoraError::invalid_request(
                "limit must be between 1 and 100",
            ));
        }
        if !(0.0..=2.0).contains(&self.personalization_strength) {
            return Err(AgoraError::invalid_request(
                "personalization_strength must be within [0, 2]",
            ));
        }
        if let Some(boosts) = &self.custom_boosts {
            boosts.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json_gets_defaults() {
        let request: MultiEntitySearchRequest =
            serde_json::from_str(r#"{"query": "sustainable dress"}"#).unwrap();

        assert_eq!(request.query, "sustainable dress");
        assert_eq!(request.entity_type, EntityScope::Product);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 20);
        assert!(!request.enable_nlp);
        assert!(!request.enable_personalization);
        assert_eq!(request.personalization_strength, 1.0);
        assert!(request.boost_by_values);
        assert!(!request.enable_highlighting);
        assert_eq!(request.highlight_pre_tag, "<em>");
        assert_eq!(request.highlight_post_tag, "</em>");
        assert_eq!(request.highlight_fragment_size, 150);
        assert!(request.user_id.is_none());
        assert!(request.custom_boosts.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_scope_wire_names() {
        let request: MultiEntitySearchRequest =
            serde_json::from_str(r#"{"query": "q", "entity_type": "ALL"}"#).unwrap();
        assert_eq!(request.entity_type, EntityScope::All);

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""entity_type":"ALL""#));
    }

    #[test]
    fn test_target_kinds() {
        assert_eq!(
            EntityScope::All.target_kinds(),
            &[EntityKind::Product, EntityKind::Brand, EntityKind::Merchant]
        );
        assert_eq!(EntityScope::Brand.target_kinds(), &[EntityKind::Brand]);
    }

    #[test]
    fn test_blank_query_rejected() {
        let request = MultiEntitySearchRequest::new("   ");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_page_and_limit_bounds() {
        let request = MultiEntitySearchRequest::new("q").with_page(0, 20);
        assert!(request.validate().is_err());

        let request = MultiEntitySearchRequest::new("q").with_page(1, 0);
        assert!(request.validate().is_err());

        let request = MultiEntitySearchRequest::new("q").with_page(1, 101);
        assert!(request.validate().is_err());

        let request = MultiEntitySearchRequest::new("q").with_page(5, 100);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_personalization_strength_bounds() {
        let request = MultiEntitySearchRequest::new("q").with_personalization("user-1", 2.5);
        assert!(request.validate().is_err());

        let request = MultiEntitySearchRequest::new("q").with_personalization("user-1", 0.0);
        assert!(request.validate().is_ok());
    }
}
