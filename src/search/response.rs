//! Search response types.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::search::facet::FacetCounts;
use crate::understanding::entity::RecognizedEntity;
use crate::understanding::intent::IntentClass;

/// One returned hit with its scores and optional highlight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// The source document.
    pub document: Document,
    /// Working score after boosting and personalization.
    pub score: f32,
    /// Per-type normalized score in [0, 1]; absent when the hit's type had
    /// no positive score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_score: Option<f32>,
    /// Highlighted description fragment, when highlighting ran and matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

/// Pagination state for one response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// 1-based page number echoed from the request.
    pub page: usize,
    /// Page size echoed from the request.
    pub limit: usize,
    /// Total matching results across all pages.
    pub total: usize,
    /// Number of pages at this limit.
    pub total_pages: usize,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl PaginationInfo {
    /// Compute pagination state. `limit` must be positive (request
    /// validation guarantees it).
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        PaginationInfo {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
            has_next: page * limit < total,
            has_previous: page > 1,
        }
    }
}

/// What the understanding pipeline found, echoed for clients.
///
/// Present only when the request enabled NLP and understanding completed;
/// a degraded understanding reports nothing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NlpMetadata {
    /// Entities recognized in the query.
    pub recognized_entities: Vec<RecognizedEntity>,
    /// Expansion terms appended to the query.
    pub expanded_terms: Vec<String>,
    /// Primary detected intent.
    pub detected_intent: IntentClass,
    /// Confidence of the primary intent.
    pub confidence: f32,
    /// Wall-clock time spent serving the request, in milliseconds.
    pub processing_time_ms: u64,
}

/// One multi-entity search response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiEntitySearchResponse {
    /// The raw query echoed from the request.
    pub query: String,
    /// Product hits on this page, strongest first.
    pub products: Vec<SearchResultItem>,
    /// Brand hits on this page.
    pub brands: Vec<SearchResultItem>,
    /// Merchant hits on this page.
    pub merchants: Vec<SearchResultItem>,
    /// Pagination state over the merged result list.
    pub pagination: PaginationInfo,
    /// Facets over the full filtered candidate set.
    pub facets: FacetCounts,
    /// Understanding echo, when NLP ran to completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nlp_metadata: Option<NlpMetadata>,
}

impl MultiEntitySearchResponse {
    /// Results on this page across all entity types.
    pub fn total_returned(&self) -> usize {
        self.products.len() + self.brands.len() + self.merchants.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let info = PaginationInfo::new(1, 20, 45);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(!info.has_previous);

        let info = PaginationInfo::new(3, 20, 45);
        assert!(!info.has_next);
        assert!(info.has_previous);

        let info = PaginationInfo::new(2, 20, 40);
        assert_eq!(info.total_pages, 2);
        assert!(!info.has_next);
        assert!(info.has_previous);
    }

    #[test]
    fn test_pagination_empty_results() {
        let info = PaginationInfo::new(1, 20, 0);
        assert_eq!(info.total, 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_previous);
    }

    #[test]
    fn test_metadata_omitted_from_json_when_absent() {
        let response = MultiEntitySearchResponse {
            query: "dress".to_string(),
            products: Vec::new(),
            brands: Vec::new(),
            merchants: Vec::new(),
            pagination: PaginationInfo::new(1, 20, 0),
            facets: FacetCounts::default(),
            nlp_metadata: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("nlp_metadata"));
        assert_eq!(response.total_returned(), 0);
    }
}
