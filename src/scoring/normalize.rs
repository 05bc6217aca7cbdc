//! Per-entity-type score normalization and the deterministic merge order.
//!
//! Raw scores from different entity types are not comparable: a product
//! index and a brand index score on different scales. Normalization maps
//! each hit into [0, 1] against the maximum score of its own entity type,
//! then re-sorts the merged list with a fully deterministic tie-break.

use std::cmp::Ordering;

use ahash::AHashMap;

use crate::document::EntityKind;
use crate::search::gateway::RawHit;

/// One hit flowing through the scoring pipeline.
#[derive(Clone, Debug)]
pub struct ScoredResult {
    /// The gateway hit.
    pub hit: RawHit,
    /// Working score: raw score with entity and personalization boosts
    /// applied.
    pub score: f32,
    /// Score divided by the maximum of the hit's entity type, in [0, 1].
    /// `None` when that maximum is zero.
    pub normalized_score: Option<f32>,
    /// Position the hit held in its own gateway list.
    pub original_rank: usize,
}

impl ScoredResult {
    /// Wrap a gateway hit, starting the working score at the raw score.
    pub fn from_hit(hit: RawHit, original_rank: usize) -> Self {
        ScoredResult {
            score: hit.raw_score,
            hit,
            normalized_score: None,
            original_rank,
        }
    }
}

/// Normalize scores per entity type and sort the merged list.
///
/// Tie-break, in order: normalized score descending (`None` sorts as 0.0),
/// original rank ascending, entity type (product, brand, merchant), entity
/// id lexicographic. Empty input is a no-op.
pub fn normalize_scores(results: &mut [ScoredResult]) {
    let mut type_max: AHashMap<EntityKind, f32> = AHashMap::new();
    for result in results.iter() {
        let max = type_max.entry(result.hit.entity_type).or_insert(0.0);
        if result.score > *max {
            *max = result.score;
        }
    }

    for result in results.iter_mut() {
        let max = type_max
            .get(&result.hit.entity_type)
            .copied()
            .unwrap_or(0.0);
        result.normalized_score = if max > 0.0 {
            Some(result.score / max)
        } else {
            None
        };
    }

    results.sort_by(compare_results);
}

fn compare_results(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    let a_score = a.normalized_score.unwrap_or(0.0);
    let b_score = b.normalized_score.unwrap_or(0.0);
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.original_rank.cmp(&b.original_rank))
        .then_with(|| a.hit.entity_type.cmp(&b.hit.entity_type))
        .then_with(|| a.hit.entity_id.cmp(&b.hit.entity_id))
}
