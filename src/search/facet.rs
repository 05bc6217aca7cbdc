//! Facet aggregation over the filtered candidate set.
//!
//! Facets are computed before pagination, over every document that passed
//! the request's filters, so the counts a client renders stay consistent
//! with the page it shows. Large candidate sets aggregate in parallel with
//! a rayon fold/reduce; small ones stay sequential.

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::FacetConfig;
use crate::document::Document;

/// One facet value with its document count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    /// The facet value.
    pub value: String,
    /// Number of documents carrying the value.
    pub count: usize,
}

/// Price bounds over the candidate set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceFacet {
    /// Lowest price among priced documents.
    pub min: f64,
    /// Highest price among priced documents.
    pub max: f64,
}

/// All facets for one response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetCounts {
    /// Category value counts, most frequent first.
    pub categories: Vec<FacetCount>,
    /// Brand counts.
    pub brands: Vec<FacetCount>,
    /// Color counts.
    pub colors: Vec<FacetCount>,
    /// Material counts.
    pub materials: Vec<FacetCount>,
    /// Size counts.
    pub sizes: Vec<FacetCount>,
    /// Style counts.
    pub styles: Vec<FacetCount>,
    /// Price bounds, absent when no candidate carries a price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceFacet>,
}

#[derive(Debug, Default)]
struct FacetAccumulator {
    categories: AHashMap<String, usize>,
    brands: AHashMap<String, usize>,
    colors: AHashMap<String, usize>,
    materials: AHashMap<String, usize>,
    sizes: AHashMap<String, usize>,
    styles: AHashMap<String, usize>,
    price_min: Option<f64>,
    price_max: Option<f64>,
}

impl FacetAccumulator {
    fn add(&mut self, doc: &Document) {
        add_distinct(&mut self.categories, &doc.categories);
        add_distinct(&mut self.colors, &doc.colors);
        add_distinct(&mut self.materials, &doc.materials);
        add_distinct(&mut self.sizes, &doc.sizes);
        if let Some(brand) = &doc.brand {
            *self.brands.entry(brand.clone()).or_insert(0) += 1;
        }
        if let Some(style) = &doc.style {
            *self.styles.entry(style.clone()).or_insert(0) += 1;
        }
        if let Some(price) = doc.price {
            self.price_min = Some(self.price_min.map_or(price, |min| min.min(price)));
            self.price_max = Some(self.price_max.map_or(price, |max| max.max(price)));
        }
    }

    fn merge(mut self, other: Self) -> Self {
        merge_counts(&mut self.categories, other.categories);
        merge_counts(&mut self.brands, other.brands);
        merge_counts(&mut self.colors, other.colors);
        merge_counts(&mut self.materials, other.materials);
        merge_counts(&mut self.sizes, other.sizes);
        merge_counts(&mut self.styles, other.styles);
        self.price_min = merge_bound(self.price_min, other.price_min, f64::min);
        self.price_max = merge_bound(self.price_max, other.price_max, f64::max);
        self
    }

    fn into_counts(self, cap: usize) -> FacetCounts {
        let price = match (self.price_min, self.price_max) {
            (Some(min), Some(max)) => Some(PriceFacet { min, max }),
            _ => None,
        };
        FacetCounts {
            categories: ranked(self.categories, cap),
            brands: ranked(self.brands, cap),
            colors: ranked(self.colors, cap),
            materials: ranked(self.materials, cap),
            sizes: ranked(self.sizes, cap),
            styles: ranked(self.styles, cap),
            price,
        }
    }
}

/// A document contributes once per distinct value it carries.
fn add_distinct(map: &mut AHashMap<String, usize>, values: &[String]) {
    let mut seen: AHashSet<&str> = AHashSet::new();
    for value in values {
        if seen.insert(value.as_str()) {
            *map.entry(value.clone()).or_insert(0) += 1;
        }
    }
}

fn merge_counts(into: &mut AHashMap<String, usize>, from: AHashMap<String, usize>) {
    for (value, count) in from {
        *into.entry(value).or_insert(0) += count;
    }
}

fn merge_bound(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(pick(x, y)),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}

/// Count map to a ranked, capped facet list: count descending, value
/// ascending on ties.
fn ranked(map: AHashMap<String, usize>, cap: usize) -> Vec<FacetCount> {
    let mut counts: Vec<FacetCount> = map
        .into_iter()
        .map(|(value, count)| FacetCount { value, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    counts.truncate(cap);
    counts
}

/// Aggregates facets over a candidate set.
#[derive(Clone, Debug, Default)]
pub struct FacetAggregator {
    config: FacetConfig,
}

impl FacetAggregator {
    /// Create an aggregator with the given limits.
    pub fn new(config: FacetConfig) -> Self {
        FacetAggregator { config }
    }

    /// Aggregate facets over the filtered, pre-pagination candidate set.
    pub fn aggregate(&self, docs: &[Document]) -> FacetCounts {
        let accumulator = if docs.len() >= self.config.parallel_threshold {
            docs.par_iter()
                .fold(FacetAccumulator::default, |mut acc, doc| {
                    acc.add(doc);
                    acc
                })
                .reduce(FacetAccumulator::default, |a, b| a.merge(b))
        } else {
            let mut acc = FacetAccumulator::default();
            for doc in docs {
                acc.add(doc);
            }
            acc
        };
        accumulator.into_counts(self.config.max_values_per_facet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EntityKind;

    fn catalog() -> Vec<Document> {
        vec![
            Document::builder(EntityKind::Product)
                .name("Dress A")
                .category("dresses")
                .color("black")
                .color("black") // duplicate value on one document
                .brand("eco collective")
                .price(49.0)
                .build(),
            Document::builder(EntityKind::Product)
                .name("Dress B")
                .category("dresses")
                .color("red")
                .brand("eco collective")
                .price(89.0)
                .build(),
            Document::builder(EntityKind::Product)
                .name("Tee")
                .category("shirts")
                .color("black")
                .brand("organic basics")
                .build(),
        ]
    }

    #[test]
    fn test_counts_and_per_document_dedup() {
        let aggregator = FacetAggregator::new(FacetConfig::default());
        let facets = aggregator.aggregate(&catalog());

        assert_eq!(
            facets.categories,
            vec![
                FacetCount {
                    value: "dresses".to_string(),
                    count: 2
                },
                FacetCount {
                    value: "shirts".to_string(),
                    count: 1
                },
            ]
        );
        // "black" appears twice on one document but counts once for it.
        assert_eq!(
            facets.colors,
            vec![
                FacetCount {
                    value: "black".to_string(),
                    count: 2
                },
                FacetCount {
                    value: "red".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(facets.brands[0].value, "eco collective");
        assert_eq!(facets.brands[0].count, 2);
    }

    #[test]
    fn test_tie_breaks_alphabetically() {
        let docs = vec![
            Document::builder(EntityKind::Product)
                .name("A")
                .color("teal")
                .build(),
            Document::builder(EntityKind::Product)
                .name("B")
                .color("beige")
                .build(),
        ];
        let aggregator = FacetAggregator::new(FacetConfig::default());
        let facets = aggregator.aggregate(&docs);

        let values: Vec<_> = facets.colors.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["beige", "teal"]);
    }

    #[test]
    fn test_cap_limits_values() {
        let aggregator = FacetAggregator::new(FacetConfig {
            max_values_per_facet: 1,
            ..Default::default()
        });
        let facets = aggregator.aggregate(&catalog());

        assert_eq!(facets.categories.len(), 1);
        assert_eq!(facets.categories[0].value, "dresses");
    }

    #[test]
    fn test_price_bounds() {
        let aggregator = FacetAggregator::new(FacetConfig::default());
        let facets = aggregator.aggregate(&catalog());

        assert_eq!(facets.price, Some(PriceFacet { min: 49.0, max: 89.0 }));
    }

    #[test]
    fn test_no_priced_documents_means_no_price_facet() {
        let docs = vec![
            Document::builder(EntityKind::Product)
                .name("Unpriced")
                .build(),
        ];
        let aggregator = FacetAggregator::new(FacetConfig::default());
        let facets = aggregator.aggregate(&docs);

        assert_eq!(facets.price, None);
    }

    #[test]
    fn test_empty_input() {
        let aggregator = FacetAggregator::new(FacetConfig::default());
        let facets = aggregator.aggregate(&[]);

        assert!(facets.categories.is_empty());
        assert!(facets.brands.is_empty());
        assert_eq!(facets.price, None);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let sequential = FacetAggregator::new(FacetConfig::default()).aggregate(&catalog());
        let parallel = FacetAggregator::new(FacetConfig {
            parallel_threshold: 1,
            ..Default::default()
        })
        .aggregate(&catalog());

        assert_eq!(sequential, parallel);
    }
}
