//! Query expansion via a synonym table.
//!
//! Expansion appends related terms to the query so the recall set covers
//! vocabulary the shopper did not type. Terms come from a fixed
//! [`SynonymRow`] table, are deduplicated in insertion order, and are capped
//! so a trigger-heavy query cannot balloon the expanded text.

use std::path::Path;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Upper bound on expansion terms per query.
pub const DEFAULT_EXPANSION_CAP: usize = 5;

/// One synonym row: when any trigger occurs in the lowercased query, the
/// row's additions join the expansion terms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SynonymRow {
    /// Lowercase substrings that trigger the row.
    pub triggers: Vec<String>,
    /// Terms appended to the query on a match.
    pub additions: Vec<String>,
}

impl SynonymRow {
    /// Create a row; triggers are lowercased. Rows loaded from JSON bypass
    /// this constructor and should already be lowercase.
    pub fn new(triggers: &[&str], additions: &[&str]) -> Self {
        SynonymRow {
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            additions: additions.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.triggers.iter().any(|t| query.contains(t.as_str()))
    }
}

fn default_rows() -> Vec<SynonymRow> {
    vec![
        SynonymRow::new(&["sustainable"], &["eco-friendly", "green", "ethical"]),
        SynonymRow::new(&["organic"], &["natural", "chemical-free", "pesticide-free"]),
        SynonymRow::new(&["vegan"], &["plant-based", "cruelty-free", "animal-free"]),
        SynonymRow::new(&["dress"], &["gown", "frock", "outfit"]),
        SynonymRow::new(&["t-shirt", "tee"], &["top", "shirt", "tee"]),
        SynonymRow::new(&["jeans"], &["denim", "pants", "trousers"]),
        SynonymRow::new(&["affordable", "cheap"], &["budget", "inexpensive", "economical"]),
        SynonymRow::new(&["premium", "luxury"], &["high-end", "designer", "exclusive"]),
    ]
}

/// Result of expanding one query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpansionResult {
    /// Expansion terms in insertion order, deduplicated and capped.
    pub terms: Vec<String>,
    /// The raw query with the expansion terms appended, or the raw query
    /// unchanged when no row matched.
    pub expanded_query: String,
}

/// Synonym table driving query expansion.
#[derive(Clone, Debug)]
pub struct SynonymTable {
    rows: Vec<SynonymRow>,
    cap: usize,
}

impl SynonymTable {
    /// Create a table with the default rows.
    pub fn new() -> Self {
        Self::with_rows(default_rows())
    }

    /// Create a table from explicit rows.
    pub fn with_rows(rows: Vec<SynonymRow>) -> Self {
        SynonymTable {
            rows,
            cap: DEFAULT_EXPANSION_CAP,
        }
    }

    /// Load rows from a JSON file holding an array of [`SynonymRow`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let rows: Vec<SynonymRow> = serde_json::from_str(&content)?;
        Ok(Self::with_rows(rows))
    }

    /// Override the expansion-term cap.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// The rows in evaluation order.
    pub fn rows(&self) -> &[SynonymRow] {
        &self.rows
    }

    /// Expand the raw query against the table.
    pub fn expand(&self, raw_query: &str) -> ExpansionResult {
        let query = raw_query.to_lowercase();
        let mut terms: Vec<String> = Vec::new();
        let mut seen: AHashSet<&str> = AHashSet::new();

        for row in &self.rows {
            if !row.matches(&query) {
                continue;
            }
            for addition in &row.additions {
                if seen.insert(addition.as_str()) {
                    terms.push(addition.clone());
                }
            }
        }
        terms.truncate(self.cap);

        let expanded_query = if terms.is_empty() {
            raw_query.to_string()
        } else {
            format!("{raw_query} {}", terms.join(" "))
        };

        ExpansionResult {
            terms,
            expanded_query,
        }
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::new()
    }
}
