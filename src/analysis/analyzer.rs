//! Query analyzer combining the tokenizer, filters, and stemmer.
//!
//! The analyzer applies processing in this order:
//! 1. Tokenizer: splits the query into word tokens
//! 2. Token filters: applied sequentially in the order they were added
//! 3. Stemmer: reduces surviving tokens to their stems
//!
//! # Examples
//!
//! ```
//! use agora::analysis::analyzer::QueryAnalyzer;
//!
//! let analyzer = QueryAnalyzer::new();
//! let terms = analyzer.stemmed_terms("Sustainable Dresses under $100").unwrap();
//!
//! assert_eq!(terms, vec!["sustain", "dress", "under"]);
//! ```

use std::sync::Arc;

use crate::analysis::filter::{LengthFilter, LowercaseFilter, StopFilter, TokenFilter};
use crate::analysis::stemmer::{PorterStemmer, Stemmer};
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{Tokenizer, WordTokenizer};
use crate::error::Result;

/// A configurable analyzer that combines a tokenizer with a chain of filters
/// and a stemmer.
///
/// The default pipeline lowercases, removes English stop words, and drops
/// tokens that are too short or purely numeric before stemming.
#[derive(Clone)]
pub struct QueryAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn TokenFilter>>,
    stemmer: Arc<dyn Stemmer>,
}

impl QueryAnalyzer {
    /// Create an analyzer with the default pipeline.
    pub fn new() -> Self {
        QueryAnalyzer {
            tokenizer: Arc::new(WordTokenizer::new()),
            filters: vec![
                Arc::new(LowercaseFilter::new()),
                Arc::new(StopFilter::new()),
                Arc::new(LengthFilter::default()),
            ],
            stemmer: Arc::new(PorterStemmer::new()),
        }
    }

    /// Create an analyzer with a custom tokenizer and no filters.
    pub fn with_tokenizer(tokenizer: Arc<dyn Tokenizer>) -> Self {
        QueryAnalyzer {
            tokenizer,
            filters: Vec::new(),
            stemmer: Arc::new(PorterStemmer::new()),
        }
    }

    /// Add a filter to the end of the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replace the stemmer.
    pub fn with_stemmer(mut self, stemmer: Arc<dyn Stemmer>) -> Self {
        self.stemmer = stemmer;
        self
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn TokenFilter>] {
        &self.filters
    }

    /// Tokenize and filter the given text, without stemming.
    ///
    /// Token positions and offsets refer to the original text, so positions
    /// may be non-contiguous after filtering.
    pub fn analyze(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }
        Ok(tokens.collect())
    }

    /// Stem each token's text, returning one stem per token in order.
    pub fn stems(&self, tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .map(|token| self.stemmer.stem(&token.text))
            .collect()
    }

    /// Analyze the text and return the stemmed term for each surviving token.
    pub fn stemmed_terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.stems(&self.analyze(text)?))
    }
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline() {
        let analyzer = QueryAnalyzer::new();
        let tokens = analyzer.analyze("The Red Dress and Shoes").unwrap();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["red", "dress", "shoes"]);
    }

    #[test]
    fn test_numeric_and_short_tokens_dropped() {
        let analyzer = QueryAnalyzer::new();
        let terms = analyzer
            .stemmed_terms("sustainable dress under $100")
            .unwrap();

        assert_eq!(terms, vec!["sustain", "dress", "under"]);
    }

    #[test]
    fn test_stemming_applied_per_token() {
        let analyzer = QueryAnalyzer::new();
        let terms = analyzer.stemmed_terms("organic cotton t-shirts").unwrap();

        assert_eq!(terms, vec!["organ", "cotton", "shirt"]);
    }

    #[test]
    fn test_stems_parallel_to_tokens() {
        let analyzer = QueryAnalyzer::new();
        let tokens = analyzer.analyze("recycled denim").unwrap();
        let stems = analyzer.stems(&tokens);

        assert_eq!(tokens.len(), stems.len());
        assert_eq!(tokens[0].text, "recycled");
        assert_eq!(stems, vec!["recycl", "denim"]);
    }

    #[test]
    fn test_empty_query() {
        let analyzer = QueryAnalyzer::new();
        assert!(analyzer.analyze("").unwrap().is_empty());
        assert!(analyzer.stemmed_terms("   ").unwrap().is_empty());
    }

    #[test]
    fn test_custom_stop_words() {
        let analyzer = QueryAnalyzer::with_tokenizer(Arc::new(WordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::from_words(vec!["show", "me"])));

        let tokens = analyzer.analyze("Show me dresses").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["dresses"]);
    }
}
