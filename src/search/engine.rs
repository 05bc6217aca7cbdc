//! The search engine orchestrator.
//!
//! One `search` call runs the full pipeline: validate, understand (opt-in),
//! fan out one gateway query per targeted entity type, boost, personalize,
//! normalize, aggregate facets, slice the page, and highlight. The engine
//! holds no mutable state; every request works on fresh values.

use std::time::Instant;

use futures::future::join_all;

use crate::config::EngineConfig;
use crate::document::{Document, EntityKind};
use crate::error::{AgoraError, Result};
use crate::scoring::boost::apply_entity_boosting;
use crate::scoring::normalize::{ScoredResult, normalize_scores};
use crate::scoring::personalize::{UserProfileProvider, apply_personalization};
use crate::search::facet::FacetAggregator;
use crate::search::gateway::{GatewayRequest, IndexGateway};
use crate::search::highlight::Highlighter;
use crate::search::request::MultiEntitySearchRequest;
use crate::search::response::{
    MultiEntitySearchResponse, NlpMetadata, PaginationInfo, SearchResultItem,
};
use crate::understanding::parameters::SearchParameters;
use crate::understanding::understander::{QueryUnderstander, Understanding};

/// Multi-entity search engine over an index gateway and a profile provider.
pub struct SearchEngine<G, P> {
    gateway: G,
    profiles: P,
    understander: QueryUnderstander,
    facets: FacetAggregator,
    config: EngineConfig,
}

impl<G: IndexGateway, P: UserProfileProvider> SearchEngine<G, P> {
    /// Create an engine. Fails when the configuration is invalid.
    pub fn new(gateway: G, profiles: P, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(SearchEngine {
            understander: QueryUnderstander::with_config(config.synthesis.clone()),
            facets: FacetAggregator::new(config.facets.clone()),
            gateway,
            profiles,
            config,
        })
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Serve one search request.
    pub async fn search(
        &self,
        request: &MultiEntitySearchRequest,
    ) -> Result<MultiEntitySearchResponse> {
        request.validate()?;
        let started = Instant::now();

        let understanding = request
            .enable_nlp
            .then(|| self.understander.process(&request.query));

        let query_text = match &understanding {
            Some(u) => u.understanding().expanded_query.clone(),
            None => request.query.clone(),
        };
        let parameters = self.effective_parameters(request, understanding.as_ref());

        let mut results = self.fan_out(request, &query_text, &parameters).await?;

        apply_entity_boosting(
            &mut results,
            request.entity_type,
            &self.config.boosts,
            request.custom_boosts.as_ref(),
        );
        self.personalize(request, &mut results).await;
        normalize_scores(&mut results);

        let candidate_docs: Vec<Document> =
            results.iter().map(|r| r.hit.source.clone()).collect();
        let facets = self.facets.aggregate(&candidate_docs);

        let total = results.len();
        let page_start = (request.page - 1).saturating_mul(request.limit);
        let page: Vec<ScoredResult> = results
            .into_iter()
            .skip(page_start)
            .take(request.limit)
            .collect();

        let highlighter = request.enable_highlighting.then(|| {
            Highlighter::new(
                request.highlight_pre_tag.clone(),
                request.highlight_post_tag.clone(),
                request.highlight_fragment_size,
            )
        });
        let highlight_terms = highlighter
            .is_some()
            .then(|| collect_highlight_terms(request, understanding.as_ref()));

        let mut products = Vec::new();
        let mut brands = Vec::new();
        let mut merchants = Vec::new();
        for result in page {
            let highlight = match (&highlighter, &highlight_terms) {
                (Some(h), Some(terms)) => h.highlight(&result.hit.source.description, terms),
                _ => None,
            };
            let item = SearchResultItem {
                document: result.hit.source,
                score: result.score,
                normalized_score: result.normalized_score,
                highlight,
            };
            match item.document.entity_type {
                EntityKind::Product => products.push(item),
                EntityKind::Brand => brands.push(item),
                EntityKind::Merchant => merchants.push(item),
            }
        }

        let nlp_metadata = match &understanding {
            Some(Understanding::Complete(u)) => Some(NlpMetadata {
                recognized_entities: u.entities.clone(),
                expanded_terms: u.expansion_terms.clone(),
                detected_intent: u.intent.primary,
                confidence: u.intent.confidence,
                processing_time_ms: started.elapsed().as_millis() as u64,
            }),
            _ => None,
        };

        Ok(MultiEntitySearchResponse {
            query: request.query.clone(),
            products,
            brands,
            merchants,
            pagination: PaginationInfo::new(request.page, request.limit, total),
            facets,
            nlp_metadata,
        })
    }

    /// Retrieval parameters for this request: synthesized by understanding
    /// (when NLP ran), overridden by the caller's sort, with the value-boost
    /// knob applied.
    fn effective_parameters(
        &self,
        request: &MultiEntitySearchRequest,
        understanding: Option<&Understanding>,
    ) -> SearchParameters {
        let mut parameters = match understanding {
            Some(u) => u.understanding().search_parameters.clone(),
            None => SearchParameters::default(),
        };
        if !request.sort.is_empty() {
            parameters.sort = request.sort.clone();
        }
        if request.boost_by_values {
            if parameters.boost.is_empty() {
                for field in ["name", "description", "categories", "brand"] {
                    parameters.boost.insert(field.to_string(), 1.0);
                }
            }
            parameters.boost.entry("values".to_string()).or_insert(2.0);
        }
        parameters
    }

    /// One gateway call per targeted kind, concurrently. A failed kind
    /// contributes nothing; only all kinds failing is an error.
    async fn fan_out(
        &self,
        request: &MultiEntitySearchRequest,
        query_text: &str,
        parameters: &SearchParameters,
    ) -> Result<Vec<ScoredResult>> {
        let kinds = request.entity_type.target_kinds();
        let gateway_requests: Vec<GatewayRequest> = kinds
            .iter()
            .map(|&kind| GatewayRequest {
                entity_type: kind,
                query: query_text.to_string(),
                parameters: parameters.clone(),
                filters: request.filters.clone(),
                range_filters: request.range_filters.clone(),
                page: request.page,
                limit: request.limit,
            })
            .collect();

        let outcomes = join_all(gateway_requests.iter().map(|r| self.gateway.search(r))).await;

        let mut results = Vec::new();
        let mut failures = 0usize;
        for (gateway_request, outcome) in gateway_requests.iter().zip(outcomes) {
            match outcome {
                Ok(hits) => {
                    for (rank, hit) in hits.into_iter().enumerate() {
                        results.push(ScoredResult::from_hit(hit, rank));
                    }
                }
                Err(err) => {
                    failures += 1;
                    tracing::warn!(
                        entity_type = gateway_request.entity_type.as_str(),
                        error = %err,
                        "entity search failed, continuing without it"
                    );
                }
            }
        }
        if !kinds.is_empty() && failures == kinds.len() {
            return Err(AgoraError::gateway("all entity searches failed"));
        }
        Ok(results)
    }

    async fn personalize(&self, request: &MultiEntitySearchRequest, results: &mut [ScoredResult]) {
        if !request.enable_personalization {
            return;
        }
        let Some(user_id) = &request.user_id else {
            return;
        };
        match self.profiles.profile(user_id).await {
            Ok(Some(profile)) => apply_personalization(
                results,
                &profile,
                request.personalization_strength,
                &self.config.boosts,
            ),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    user_id,
                    error = %err,
                    "profile lookup failed, skipping personalization"
                );
            }
        }
    }
}

/// Terms to highlight: understanding tokens plus expansion terms when NLP
/// completed, else the raw query words.
fn collect_highlight_terms(
    request: &MultiEntitySearchRequest,
    understanding: Option<&Understanding>,
) -> Vec<String> {
    match understanding {
        Some(Understanding::Complete(u)) => {
            let mut terms = u.tokens.clone();
            terms.extend(u.expansion_terms.iter().cloned());
            terms
        }
        _ => request
            .query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EntityKind;
    use crate::scoring::personalize::NoProfiles;
    use crate::search::gateway::{MemoryIndexGateway, RawHit};
    use crate::search::request::EntityScope;
    use std::future::Future;

    fn catalog() -> Vec<Document> {
        vec![
            Document::builder(EntityKind::Product)
                .id("p-plain")
                .name("Linen Dress")
                .description("A simple linen dress")
                .category("dresses")
                .price(80.0)
                .build(),
            Document::builder(EntityKind::Product)
                .id("p-eco")
                .name("Linen Dress")
                .description("A simple linen dress")
                .category("dresses")
                .value("sustainable")
                .price(90.0)
                .build(),
            Document::builder(EntityKind::Brand)
                .id("b-eco")
                .name("Eco Dress Collective")
                .description("Brand behind sustainable dress lines")
                .build(),
        ]
    }

    fn engine() -> SearchEngine<MemoryIndexGateway, NoProfiles> {
        let gateway = MemoryIndexGateway::with_documents(catalog());
        SearchEngine::new(gateway, NoProfiles, EngineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_basic_product_search() {
        let engine = engine();
        let request = MultiEntitySearchRequest::new("linen dress");
        let response = engine.search(&request).await.unwrap();

        assert_eq!(response.pagination.total, 2);
        assert_eq!(response.products.len(), 2);
        assert!(response.brands.is_empty());
        assert!(response.nlp_metadata.is_none());
    }

    #[tokio::test]
    async fn test_value_boost_prefers_matching_values() {
        let engine = engine();
        let request = MultiEntitySearchRequest::new("sustainable dress");
        let response = engine.search(&request).await.unwrap();

        // Equal text relevance otherwise; the values field carries the
        // "sustainable" match at double weight.
        assert_eq!(response.products[0].document.id, "p-eco");
    }

    #[tokio::test]
    async fn test_all_scope_returns_brands_too() {
        let engine = engine();
        let request =
            MultiEntitySearchRequest::new("dress").with_scope(EntityScope::All);
        let response = engine.search(&request).await.unwrap();

        assert!(!response.products.is_empty());
        assert!(!response.brands.is_empty());
        assert_eq!(
            response.pagination.total,
            response.products.len() + response.brands.len()
        );
    }

    #[tokio::test]
    async fn test_nlp_metadata_present_when_enabled() {
        let engine = engine();
        let request = MultiEntitySearchRequest::new("sustainable dress under $100").with_nlp(true);
        let response = engine.search(&request).await.unwrap();

        let metadata = response.nlp_metadata.expect("nlp metadata");
        assert!(!metadata.recognized_entities.is_empty());
        assert!(!metadata.expanded_terms.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_pipeline() {
        let engine = engine();
        let request = MultiEntitySearchRequest::new("  ");
        assert!(engine.search(&request).await.is_err());
    }

    struct AlwaysFailGateway;

    impl IndexGateway for AlwaysFailGateway {
        fn search(
            &self,
            _request: &GatewayRequest,
        ) -> impl Future<Output = Result<Vec<RawHit>>> + Send {
            std::future::ready(Err(AgoraError::gateway("backend down")))
        }
    }

    #[tokio::test]
    async fn test_every_kind_failing_is_an_error() {
        let engine =
            SearchEngine::new(AlwaysFailGateway, NoProfiles, EngineConfig::default()).unwrap();
        let request = MultiEntitySearchRequest::new("dress").with_scope(EntityScope::All);

        assert!(engine.search(&request).await.is_err());
    }

    struct FlakyGateway {
        inner: MemoryIndexGateway,
        failing: EntityKind,
    }

    impl IndexGateway for FlakyGateway {
        fn search(
            &self,
            request: &GatewayRequest,
        ) -> impl Future<Output = Result<Vec<RawHit>>> + Send {
            async move {
                if request.entity_type == self.failing {
                    return Err(AgoraError::gateway("index down"));
                }
                self.inner.search(request).await
            }
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_remaining_kinds() {
        let gateway = FlakyGateway {
            inner: MemoryIndexGateway::with_documents(catalog()),
            failing: EntityKind::Brand,
        };
        let engine = SearchEngine::new(gateway, NoProfiles, EngineConfig::default()).unwrap();
        let request = MultiEntitySearchRequest::new("dress").with_scope(EntityScope::All);
        let response = engine.search(&request).await.unwrap();

        assert!(!response.products.is_empty());
        assert!(response.brands.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_slices_the_merged_list() {
        let engine = engine();
        let request = MultiEntitySearchRequest::new("dress").with_page(1, 1);
        let response = engine.search(&request).await.unwrap();

        assert_eq!(response.pagination.total, 2);
        assert_eq!(response.total_returned(), 1);
        assert!(response.pagination.has_next);
        assert!(!response.pagination.has_previous);

        let request = MultiEntitySearchRequest::new("dress").with_page(2, 1);
        let response = engine.search(&request).await.unwrap();
        assert_eq!(response.total_returned(), 1);
        assert!(!response.pagination.has_next);
        assert!(response.pagination.has_previous);
    }

    #[tokio::test]
    async fn test_highlighting_wraps_terms_on_page_items() {
        let engine = engine();
        let request = MultiEntitySearchRequest::new("linen dress").with_highlighting(true);
        let response = engine.search(&request).await.unwrap();

        let highlight = response.products[0].highlight.as_deref().expect("highlight");
        assert!(highlight.contains("<em>linen</em>"));
        assert!(highlight.contains("<em>dress</em>"));
    }
}
