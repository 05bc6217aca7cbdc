//! Token filters for query analysis.
//!
//! Filters transform a token stream: lowercasing, stop word removal, and
//! dropping tokens that are too short or purely numeric to be useful query
//! terms. Filters compose in sequence inside
//! [`QueryAnalyzer`](crate::analysis::analyzer::QueryAnalyzer).

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Default English stop words.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Default English stop words as a HashSet for efficient lookup.
static DEFAULT_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&word| word.to_string())
        .collect()
});

/// Trait for filters that transform token streams.
pub trait TokenFilter: Send + Sync {
    /// Filter the given token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A filter that converts token text to lowercase.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl TokenFilter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|mut token| {
            if token.text.chars().any(|c| c.is_uppercase()) {
                token.text = token.text.to_lowercase();
            }
            token
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// A filter that removes stop words from the token stream.
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// Set of stop words to remove.
    stop_words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    pub fn new() -> Self {
        StopFilter {
            stop_words: Arc::new(DEFAULT_STOP_WORDS_SET.clone()),
        }
    }

    /// Create a stop filter from a list of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words: HashSet<String> = words.into_iter().map(|w| w.into()).collect();
        StopFilter {
            stop_words: Arc::new(stop_words),
        }
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stop_words = Arc::clone(&self.stop_words);
        Ok(Box::new(
            tokens.filter(move |token| !stop_words.contains(&token.text)),
        ))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

/// A filter that drops tokens too short or purely numeric to be query terms.
///
/// Tokens whose text length is less than or equal to `min_length` are
/// removed, as are tokens consisting only of digits (bare numbers carry no
/// lexical signal; prices and sizes are recognized from the raw query by the
/// entity extractor instead).
#[derive(Clone, Debug)]
pub struct LengthFilter {
    min_length: usize,
    drop_numeric: bool,
}

impl LengthFilter {
    /// Create a length filter that drops tokens of length <= `min_length`.
    pub fn new(min_length: usize) -> Self {
        LengthFilter {
            min_length,
            drop_numeric: true,
        }
    }

    /// Keep purely numeric tokens instead of dropping them.
    pub fn keep_numeric(mut self) -> Self {
        self.drop_numeric = false;
        self
    }

    /// The configured minimum length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl Default for LengthFilter {
    fn default() -> Self {
        Self::new(2)
    }
}

impl TokenFilter for LengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let min_length = self.min_length;
        let drop_numeric = self.drop_numeric;
        Ok(Box::new(tokens.filter(move |token| {
            if token.text.chars().count() <= min_length {
                return false;
            }
            if drop_numeric && token.text.chars().all(|c| c.is_ascii_digit()) {
                return false;
            }
            true
        })))
    }

    fn name(&self) -> &'static str {
        "length"
    }
}
