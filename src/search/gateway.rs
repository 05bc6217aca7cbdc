//! The index gateway boundary.
//!
//! The engine never talks to an index backend directly; it hands a
//! [`GatewayRequest`] to an [`IndexGateway`] and gets raw scored hits back.
//! Backend concerns (connection pools, retries, query DSLs) live behind the
//! trait. [`MemoryIndexGateway`] is the in-crate reference implementation
//! used by the CLI, tests, and benches.

use std::cmp::Ordering;
use std::future::Future;
use std::path::Path;

use parking_lot::RwLock;

use crate::document::{Document, EntityKind};
use crate::error::Result;
use crate::search::request::{FieldFilter, RangeFilter};
use crate::understanding::parameters::{FilterSet, SearchParameters, SortClause, SortOrder};

/// One per-entity-type retrieval request.
#[derive(Clone, Debug)]
pub struct GatewayRequest {
    /// The entity type to retrieve.
    pub entity_type: EntityKind,
    /// Query text (expanded when understanding ran).
    pub query: String,
    /// Synthesized boosts, sort clauses, and structured filters.
    pub parameters: SearchParameters,
    /// Caller-supplied exact-value filters.
    pub filters: Vec<FieldFilter>,
    /// Caller-supplied numeric range filters.
    pub range_filters: Vec<RangeFilter>,
    /// 1-based page, for remote implementations that bound their fetch.
    pub page: usize,
    /// Page size, for remote implementations that bound their fetch.
    pub limit: usize,
}

/// One raw hit from the gateway, read-only downstream.
#[derive(Clone, Debug)]
pub struct RawHit {
    /// The hit's entity type.
    pub entity_type: EntityKind,
    /// The hit's document id.
    pub entity_id: String,
    /// Backend relevance score, non-negative.
    pub raw_score: f32,
    /// The full source document.
    pub source: Document,
}

/// Capability trait over an index backend.
///
/// Implementations own their retry policy. The engine treats a failed call
/// as an empty contribution for that entity type and only errors when every
/// targeted type fails.
pub trait IndexGateway: Send + Sync {
    /// Retrieve raw hits for one entity type.
    fn search(&self, request: &GatewayRequest) -> impl Future<Output = Result<Vec<RawHit>>> + Send;
}

/// Text fields that contribute to term-frequency scoring.
const SCORED_FIELDS: [&str; 5] = ["name", "description", "categories", "values", "brand"];

/// In-memory gateway over a document list.
///
/// Relevance mode scores documents by term frequency over the scored text
/// fields, weighted by `parameters.boost`, and drops documents that match no
/// query term. When sort clauses are present the result order follows them
/// instead and every hit carries a uniform score, so downstream
/// normalization keeps the requested order. The full filtered candidate set
/// is returned; the engine paginates.
#[derive(Debug, Default)]
pub struct MemoryIndexGateway {
    documents: RwLock<Vec<Document>>,
}

impl MemoryIndexGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway over the given documents.
    pub fn with_documents(documents: Vec<Document>) -> Self {
        MemoryIndexGateway {
            documents: RwLock::new(documents),
        }
    }

    /// Load a gateway from a JSON file holding an array of documents.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let documents: Vec<Document> = serde_json::from_str(&content)?;
        Ok(Self::with_documents(documents))
    }

    /// Add one document.
    pub fn add_document(&self, document: Document) {
        self.documents.write().push(document);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// True when no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn search_sync(&self, request: &GatewayRequest) -> Vec<RawHit> {
        let terms: Vec<String> = request
            .query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let weights = field_weights(&request.parameters);

        let documents = self.documents.read();
        let mut candidates: Vec<(Document, f32)> = documents
            .iter()
            .filter(|doc| doc.entity_type == request.entity_type)
            .filter(|doc| matches_filter_set(doc, &request.parameters.filters))
            .filter(|doc| request.filters.iter().all(|f| matches_field_filter(doc, f)))
            .filter(|doc| {
                request
                    .range_filters
                    .iter()
                    .all(|f| matches_range_filter(doc, f))
            })
            .map(|doc| {
                let score = weights
                    .iter()
                    .map(|(field, weight)| term_frequency(doc, field, &terms) * weight)
                    .sum::<f32>();
                (doc.clone(), score)
            })
            .collect();
        drop(documents);

        if request.parameters.sort.is_empty() {
            candidates.retain(|(_, score)| *score > 0.0);
            candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        } else {
            // Explicit sort replaces relevance: every hit scores the same
            // and the requested order survives downstream normalization.
            let clauses = request.parameters.sort.clone();
            candidates.sort_by(|a, b| compare_by_clauses(&a.0, &b.0, &clauses));
            for (_, score) in candidates.iter_mut() {
                *score = 1.0;
            }
        }

        candidates
            .into_iter()
            .map(|(doc, score)| RawHit {
                entity_type: doc.entity_type,
                entity_id: doc.id.clone(),
                raw_score: score,
                source: doc,
            })
            .collect()
    }
}

impl IndexGateway for MemoryIndexGateway {
    fn search(&self, request: &GatewayRequest) -> impl Future<Output = Result<Vec<RawHit>>> + Send {
        std::future::ready(Ok(self.search_sync(request)))
    }
}

/// Scored fields and weights for this request: the boost map restricted to
/// text fields, or every text field at 1.0 when the map names none of them.
fn field_weights(parameters: &SearchParameters) -> Vec<(&'static str, f32)> {
    let from_boost: Vec<(&'static str, f32)> = SCORED_FIELDS
        .iter()
        .filter_map(|&field| parameters.boost.get(field).map(|&weight| (field, weight)))
        .collect();
    if from_boost.is_empty() {
        SCORED_FIELDS.iter().map(|&field| (field, 1.0)).collect()
    } else {
        from_boost
    }
}

/// Occurrences of any query term among the field's words.
fn term_frequency(doc: &Document, field: &str, terms: &[String]) -> f32 {
    let Some(text) = doc.field_text(field) else {
        return 0.0;
    };
    let text = text.to_lowercase();
    let mut count = 0usize;
    for word in text.split_whitespace() {
        if terms.iter().any(|term| term == word) {
            count += 1;
        }
    }
    count as f32
}

fn any_value_matches(doc_values: &[String], wanted: &[String]) -> bool {
    wanted
        .iter()
        .any(|w| doc_values.iter().any(|v| v.eq_ignore_ascii_case(w)))
}

fn scalar_matches(doc_value: Option<&str>, wanted: &[String]) -> bool {
    match doc_value {
        Some(value) => wanted.iter().any(|w| value.eq_ignore_ascii_case(w)),
        None => false,
    }
}

fn matches_filter_set(doc: &Document, filters: &FilterSet) -> bool {
    if !filters.categories.is_empty() && !any_value_matches(&doc.categories, &filters.categories) {
        return false;
    }
    if !filters.brands.is_empty() {
        // Brand documents carry their brand in `name`.
        let branded = match doc.entity_type {
            EntityKind::Brand => Some(doc.name.as_str()),
            _ => doc.brand.as_deref(),
        };
        if !scalar_matches(branded, &filters.brands) {
            return false;
        }
    }
    if !filters.values.is_empty() && !any_value_matches(&doc.values, &filters.values) {
        return false;
    }
    if !filters.colors.is_empty() && !any_value_matches(&doc.colors, &filters.colors) {
        return false;
    }
    if !filters.sizes.is_empty() && !any_value_matches(&doc.sizes, &filters.sizes) {
        return false;
    }
    if !filters.materials.is_empty() && !any_value_matches(&doc.materials, &filters.materials) {
        return false;
    }
    if filters.price_min.is_some() || filters.price_max.is_some() {
        let Some(price) = doc.price else {
            return false;
        };
        if let Some(min) = filters.price_min
            && price < min
        {
            return false;
        }
        if let Some(max) = filters.price_max
            && price > max
        {
            return false;
        }
    }
    if let Some(rating_min) = filters.rating_min {
        match doc.rating {
            Some(rating) if rating >= rating_min => {}
            _ => return false,
        }
    }
    if let Some(rating) = filters.rating {
        if doc.rating != Some(rating) {
            return false;
        }
    }
    true
}

fn matches_field_filter(doc: &Document, filter: &FieldFilter) -> bool {
    match filter.field.as_str() {
        "categories" => any_value_matches(&doc.categories, &filter.values),
        "values" => any_value_matches(&doc.values, &filter.values),
        "colors" => any_value_matches(&doc.colors, &filter.values),
        "materials" => any_value_matches(&doc.materials, &filter.values),
        "sizes" => any_value_matches(&doc.sizes, &filter.values),
        "brand" => scalar_matches(doc.brand.as_deref(), &filter.values),
        "merchant" => scalar_matches(doc.merchant.as_deref(), &filter.values),
        "style" => scalar_matches(doc.style.as_deref(), &filter.values),
        "name" => scalar_matches(Some(&doc.name), &filter.values),
        // Unknown field: nothing can match it.
        _ => false,
    }
}

fn matches_range_filter(doc: &Document, filter: &RangeFilter) -> bool {
    let value = match filter.field.as_str() {
        "price" => doc.price,
        "rating" => doc.rating.map(f64::from),
        "review_count" => doc.review_count.map(|count| count as f64),
        _ => None,
    };
    let Some(value) = value else {
        return false;
    };
    if let Some(min) = filter.min
        && value < min
    {
        return false;
    }
    if let Some(max) = filter.max
        && value > max
    {
        return false;
    }
    true
}

/// Multi-key document comparison. Documents missing a sort field order after
/// documents that have it, regardless of direction.
fn compare_by_clauses(a: &Document, b: &Document, clauses: &[SortClause]) -> Ordering {
    for clause in clauses {
        let desc = clause.order == SortOrder::Desc;
        let ord = match clause.field.as_str() {
            "price" => compare_optional(a.price, b.price, desc),
            "rating" => compare_optional(a.rating, b.rating, desc),
            "created_at" => {
                let ord = a.created_at.cmp(&b.created_at);
                if desc { ord.reverse() } else { ord }
            }
            _ => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare_optional<T: PartialOrd>(a: Option<T>, b: Option<T>, desc: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if desc { ord.reverse() } else { ord }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
