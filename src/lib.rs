//! # Agora
//!
//! A query understanding and multi-entity relevance engine for marketplace
//! search, written in Rust.
//!
//! ## Features
//!
//! - Text analysis pipeline (tokenization, stopwords, stemming)
//! - Entity recognition, intent detection, and synonym expansion
//! - Intent-driven synthesis of boosts, sorts, and filters
//! - Concurrent fan-out over products, brands, and merchants
//! - Per-type score normalization with deterministic merging
//! - Entity boosting and opt-in personalization
//! - Facet aggregation and result highlighting

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod scoring;
pub mod search;
pub mod understanding;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
