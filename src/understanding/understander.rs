//! The query understander.
//!
//! [`QueryUnderstander`] runs the full pipeline over one raw query: analysis
//! (tokenize, filter, stem), entity recognition, intent detection, synonym
//! expansion, and search parameter synthesis. Understanding never takes a
//! query down: if any stage fails, the result degrades to a raw-query
//! passthrough and the failure is logged.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::analysis::QueryAnalyzer;
use crate::config::SynthesisConfig;
use crate::error::Result;
use crate::understanding::entity::{EntityExtractor, RecognizedEntity};
use crate::understanding::expansion::SynonymTable;
use crate::understanding::intent::{Intent, IntentDetector};
use crate::understanding::parameters::SearchParameters;

/// Everything the engine knows about one query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryUnderstanding {
    /// The query exactly as the shopper typed it.
    pub original_query: String,
    /// Cleaned tokens with recognized entity values removed, joined by
    /// spaces. Falls back to the original query when every token was an
    /// entity value.
    pub processed_query: String,
    /// The original query with expansion terms appended.
    pub expanded_query: String,
    /// Cleaned token texts, before stemming.
    pub tokens: Vec<String>,
    /// Stemmed token texts, parallel to `tokens`.
    pub stems: Vec<String>,
    /// Recognized entities in extraction order.
    pub entities: Vec<RecognizedEntity>,
    /// Detected intent.
    pub intent: Intent,
    /// Expansion terms in insertion order.
    pub expansion_terms: Vec<String>,
    /// Synthesized retrieval parameters.
    pub search_parameters: SearchParameters,
}

/// Outcome of understanding one query.
#[derive(Clone, Debug)]
pub enum Understanding {
    /// The full pipeline ran.
    Complete(QueryUnderstanding),
    /// A stage failed; retrieval proceeds on the raw query.
    Degraded {
        /// Raw-query passthrough understanding.
        fallback: QueryUnderstanding,
        /// What went wrong, for diagnostics.
        reason: String,
    },
}

impl Understanding {
    /// The understanding to retrieve with, complete or degraded.
    pub fn understanding(&self) -> &QueryUnderstanding {
        match self {
            Understanding::Complete(understanding) => understanding,
            Understanding::Degraded { fallback, .. } => fallback,
        }
    }

    /// Consume and return the inner understanding.
    pub fn into_inner(self) -> QueryUnderstanding {
        match self {
            Understanding::Complete(understanding) => understanding,
            Understanding::Degraded { fallback, .. } => fallback,
        }
    }

    /// True when the full pipeline ran.
    pub fn is_complete(&self) -> bool {
        matches!(self, Understanding::Complete(_))
    }

    /// True when understanding fell back to the raw query.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Understanding::Degraded { .. })
    }
}

/// Runs the query understanding pipeline.
#[derive(Debug, Default)]
pub struct QueryUnderstander {
    analyzer: QueryAnalyzer,
    extractor: EntityExtractor,
    detector: IntentDetector,
    synonyms: SynonymTable,
    synthesis: SynthesisConfig,
}

impl QueryUnderstander {
    /// Create an understander with the default pipeline components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an understander with custom synthesis configuration.
    pub fn with_config(synthesis: SynthesisConfig) -> Self {
        QueryUnderstander {
            synthesis,
            ..Self::default()
        }
    }

    /// Replace the analyzer.
    pub fn with_analyzer(mut self, analyzer: QueryAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Replace the entity extractor.
    pub fn with_extractor(mut self, extractor: EntityExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the intent detector.
    pub fn with_detector(mut self, detector: IntentDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Replace the synonym table.
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Understand one raw query, degrading instead of failing.
    pub fn process(&self, raw_query: &str) -> Understanding {
        match self.try_process(raw_query) {
            Ok(understanding) => Understanding::Complete(understanding),
            Err(err) => {
                tracing::error!(
                    query = raw_query,
                    error = %err,
                    "query understanding failed, falling back to raw query"
                );
                Understanding::Degraded {
                    fallback: Self::fallback(raw_query),
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Run the full pipeline, surfacing stage errors.
    pub fn try_process(&self, raw_query: &str) -> Result<QueryUnderstanding> {
        let tokens = self.analyzer.analyze(raw_query)?;
        let stems = self.analyzer.stems(&tokens);
        let token_texts: Vec<String> = tokens.into_iter().map(|t| t.text).collect();

        let entities = self.extractor.extract(raw_query);
        let intent = self.detector.detect(raw_query);
        let expansion = self.synonyms.expand(raw_query);
        let search_parameters =
            SearchParameters::synthesize(&intent, &entities, raw_query, &self.synthesis);
        let processed_query = processed_query(&token_texts, &entities, raw_query);

        Ok(QueryUnderstanding {
            original_query: raw_query.to_string(),
            processed_query,
            expanded_query: expansion.expanded_query,
            tokens: token_texts,
            stems,
            entities,
            intent,
            expansion_terms: expansion.terms,
            search_parameters,
        })
    }

    /// Raw-query passthrough used when the pipeline fails.
    fn fallback(raw_query: &str) -> QueryUnderstanding {
        QueryUnderstanding {
            original_query: raw_query.to_string(),
            processed_query: raw_query.to_string(),
            expanded_query: raw_query.to_string(),
            tokens: Vec::new(),
            stems: Vec::new(),
            entities: Vec::new(),
            intent: Intent::fallback(),
            expansion_terms: Vec::new(),
            search_parameters: SearchParameters::default(),
        }
    }
}

/// Tokens minus exact entity values, rejoined. An all-entity query keeps the
/// raw text so retrieval never runs on an empty string.
fn processed_query(tokens: &[String], entities: &[RecognizedEntity], raw_query: &str) -> String {
    let entity_values: AHashSet<String> =
        entities.iter().map(|e| e.value.to_lowercase()).collect();
    let kept: Vec<&str> = tokens
        .iter()
        .filter(|token| !entity_values.contains(token.as_str()))
        .map(String::as_str)
        .collect();
    if kept.is_empty() {
        raw_query.to_string()
    } else {
        kept.join(" ")
    }
}
