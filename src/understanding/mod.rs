//! Query understanding: entities, intent, expansion, and parameter
//! synthesis.
//!
//! The pipeline entry point is [`QueryUnderstander::process`], which turns
//! one raw query string into a [`QueryUnderstanding`]. Each stage is also
//! usable on its own:
//!
//! - [`entity`] recognizes categories, brands, values, colors, materials,
//!   sizes, prices, and rating constraints
//! - [`intent`] classifies the shopping intent behind the query
//! - [`expansion`] appends synonym terms for recall
//! - [`parameters`] synthesizes boosts, sorts, and filters for retrieval

pub mod entity;
pub mod expansion;
pub mod intent;
pub mod parameters;
pub mod understander;

pub use entity::{EntityExtractor, LexiconRule, RecognizedEntity, RecognizedEntityType};
pub use expansion::{DEFAULT_EXPANSION_CAP, ExpansionResult, SynonymRow, SynonymTable};
pub use intent::{Intent, IntentCandidate, IntentClass, IntentDetector, IntentRule};
pub use parameters::{FilterSet, SearchParameters, SortClause, SortOrder};
pub use understander::{QueryUnderstander, QueryUnderstanding, Understanding};
