//! Relevance scoring: entity-type boosting, personalization, and
//! normalization.
//!
//! Stages run in a fixed order over the merged gateway hits: entity-type
//! boosting (mixed scopes only), then personalization (opt-in), then
//! per-type normalization with the deterministic merge sort.

pub mod boost;
pub mod normalize;
pub mod personalize;

pub use boost::{
    EntityBoostOverrides, apply_entity_boosting, boost_for, enhance_query_with_entity_boosting,
};
pub use normalize::{ScoredResult, normalize_scores};
pub use personalize::{
    MemoryProfileStore, NoProfiles, UserHistory, UserPreferences, UserProfile,
    UserProfileProvider, apply_personalization,
};
