//! Tokenizer implementations for query analysis.
//!
//! The [`WordTokenizer`] splits text on Unicode word boundaries (UAX #29),
//! keeping only segments that contain at least one alphanumeric character.
//! Punctuation and whitespace segments are discarded, so `"$100"` yields
//! `"100"`-adjacent word segments while `"fair-trade"` keeps its hyphenated
//! parts as separate words.
//!
//! # Examples
//!
//! ```
//! use agora::analysis::tokenizer::{Tokenizer, WordTokenizer};
//!
//! let tokenizer = WordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello, world!").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].text, "Hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A tokenizer that splits text on Unicode word boundaries.
///
/// Uses the Unicode Text Segmentation algorithm (UAX #29) via the
/// `unicode-segmentation` crate. Byte offsets into the original text are
/// preserved on every token so later stages can map back to the query.
#[derive(Clone, Debug, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    /// Create a new word tokenizer.
    pub fn new() -> Self {
        WordTokenizer
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;
        let mut offset = 0;

        for word in text.split_word_bounds() {
            let start_offset = offset;
            offset += word.len();

            if word.chars().any(|c| c.is_alphanumeric()) {
                tokens.push(Token::with_offsets(word, position, start_offset, offset));
                position += 1;
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tokenizer() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("hello, world!").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, "world");
    }

    #[test]
    fn test_offsets_track_original_text() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("red dress").unwrap().collect();

        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 3);
        assert_eq!(tokens[1].start_offset, 4);
        assert_eq!(tokens[1].end_offset, 9);
    }

    #[test]
    fn test_repeated_words_keep_distinct_offsets() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("blue blue").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[1].start_offset, 5);
    }

    #[test]
    fn test_price_text_keeps_digits() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("under $100").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["under", "100"]);
    }

    #[test]
    fn test_empty_input() {
        let tokenizer = WordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("").unwrap().collect();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(WordTokenizer::new().name(), "word");
    }
}
