//! Query text analysis for Agora.
//!
//! This module provides the tokenization pipeline that turns raw query text
//! into normalized search terms: word tokenization, lowercasing, stop word
//! removal, length/numeric filtering, and Porter stemming.

pub mod analyzer;
pub mod filter;
pub mod stemmer;
pub mod token;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::QueryAnalyzer;
pub use filter::{LengthFilter, LowercaseFilter, StopFilter, TokenFilter};
pub use stemmer::{PorterStemmer, Stemmer};
pub use token::{Token, TokenStream};
pub use tokenizer::{Tokenizer, WordTokenizer};
