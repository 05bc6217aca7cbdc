//! User-profile based score adjustments.
//!
//! Personalization multiplies a hit's working score once per matching
//! signal. Signals are: overlap between the profile's preferred values and
//! the document's values, overlap between preferred categories and the
//! document's categories, and a previously-viewed product or merchant id.
//! Each match applies `1 + (factor - 1) * strength`, so strength 0 is a
//! no-op, 1 applies the configured factor, and 2 doubles its distance from
//! neutral.

use std::future::Future;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::config::EntityBoostConfig;
use crate::document::EntityKind;
use crate::error::Result;
use crate::scoring::normalize::ScoredResult;

/// Stated shopping preferences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Marketplace values the user shops by.
    #[serde(default)]
    pub values: Vec<String>,
    /// Categories the user favors.
    #[serde(default)]
    pub preferred_categories: Vec<String>,
}

/// Browsing history signals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserHistory {
    /// Product ids the user has viewed.
    #[serde(default)]
    pub viewed_products: Vec<String>,
    /// Merchant ids the user has viewed.
    #[serde(default)]
    pub viewed_merchants: Vec<String>,
}

/// One user's personalization profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Profile key.
    pub user_id: String,
    /// Stated preferences.
    #[serde(default)]
    pub preferences: UserPreferences,
    /// Browsing history.
    #[serde(default)]
    pub history: UserHistory,
}

/// Capability trait over profile storage.
pub trait UserProfileProvider: Send + Sync {
    /// Look up a profile; `Ok(None)` when the user is unknown.
    fn profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserProfile>>> + Send;
}

/// Provider for callers without personalization.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProfiles;

impl UserProfileProvider for NoProfiles {
    fn profile(
        &self,
        _user_id: &str,
    ) -> impl Future<Output = Result<Option<UserProfile>>> + Send {
        std::future::ready(Ok(None))
    }
}

/// Profile provider backed by an in-memory map, keyed by user id.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: AHashMap<String, UserProfile>,
}

impl MemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from existing profiles.
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        MemoryProfileStore {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.user_id.clone(), profile))
                .collect(),
        }
    }

    /// Load a store from a JSON file holding an array of profiles.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let profiles: Vec<UserProfile> = serde_json::from_str(&content)?;
        Ok(Self::with_profiles(profiles))
    }

    /// Insert or replace one profile.
    pub fn insert(&mut self, profile: UserProfile) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no profiles are stored.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl UserProfileProvider for MemoryProfileStore {
    fn profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserProfile>>> + Send {
        std::future::ready(Ok(self.profiles.get(user_id).cloned()))
    }
}

/// Apply the profile's signals to every hit, scaled by `strength` in [0, 2].
pub fn apply_personalization(
    results: &mut [ScoredResult],
    profile: &UserProfile,
    strength: f32,
    config: &EntityBoostConfig,
) {
    if strength <= 0.0 {
        return;
    }
    let preference_multiplier = 1.0 + (config.user_preferences_boost_factor - 1.0) * strength;
    let history_multiplier = 1.0 + (config.user_history_boost_factor - 1.0) * strength;

    for result in results.iter_mut() {
        let doc = &result.hit.source;

        if overlaps(&profile.preferences.values, &doc.values) {
            result.score *= preference_multiplier;
        }
        if overlaps(&profile.preferences.preferred_categories, &doc.categories) {
            result.score *= preference_multiplier;
        }

        let viewed = match result.hit.entity_type {
            EntityKind::Product => profile
                .history
                .viewed_products
                .iter()
                .any(|id| id == &result.hit.entity_id),
            EntityKind::Merchant => profile
                .history
                .viewed_merchants
                .iter()
                .any(|id| id == &result.hit.entity_id),
            EntityKind::Brand => false,
        };
        if viewed {
            result.score *= history_multiplier;
        }
    }
}

fn overlaps(wanted: &[String], carried: &[String]) -> bool {
    wanted
        .iter()
        .any(|w| carried.iter().any(|c| c.eq_ignore_ascii_case(w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::search::gateway::RawHit;

    fn result(kind: EntityKind, id: &str, doc: Document) -> ScoredResult {
        ScoredResult::from_hit(
            RawHit {
                entity_type: kind,
                entity_id: id.to_string(),
                raw_score: 1.0,
                source: doc,
            },
            0,
        )
    }

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "user-1".to_string(),
            preferences: UserPreferences {
                values: vec!["sustainable".to_string()],
                preferred_categories: vec!["dresses".to_string()],
            },
            history: UserHistory {
                viewed_products: vec!["p-viewed".to_string()],
                viewed_merchants: vec!["m-viewed".to_string()],
            },
        }
    }

    #[test]
    fn test_strength_zero_is_noop() {
        let config = EntityBoostConfig::default();
        let doc = Document::builder(EntityKind::Product)
            .id("p-viewed")
            .name("Dress")
            .value("sustainable")
            .category("dresses")
            .build();
        let mut results = vec![result(EntityKind::Product, "p-viewed", doc)];

        apply_personalization(&mut results, &profile(), 0.0, &config);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_each_signal_multiplies_once() {
        let config = EntityBoostConfig::default();
        let doc = Document::builder(EntityKind::Product)
            .id("p-viewed")
            .name("Dress")
            .value("sustainable")
            .category("dresses")
            .build();
        let mut results = vec![result(EntityKind::Product, "p-viewed", doc)];

        apply_personalization(&mut results, &profile(), 1.0, &config);
        // Value overlap x category overlap x viewed product:
        // 1.5 * 1.5 * 1.2 = 2.7.
        assert!((results[0].score - 2.7).abs() < 1e-5);
    }

    #[test]
    fn test_strength_scales_the_factor() {
        let config = EntityBoostConfig::default();
        let doc = Document::builder(EntityKind::Product)
            .id("p1")
            .name("Dress")
            .value("sustainable")
            .build();
        let mut at_one = vec![result(EntityKind::Product, "p1", doc.clone())];
        let mut at_two = vec![result(EntityKind::Product, "p1", doc)];

        apply_personalization(&mut at_one, &profile(), 1.0, &config);
        apply_personalization(&mut at_two, &profile(), 2.0, &config);

        assert!((at_one[0].score - 1.5).abs() < 1e-5);
        assert!((at_two[0].score - 2.0).abs() < 1e-5);
        assert!(at_two[0].score > at_one[0].score);
    }

    #[test]
    fn test_history_matches_only_its_entity_type() {
        let config = EntityBoostConfig::default();
        // A brand whose id collides with a viewed product id must not get
        // the history boost.
        let doc = Document::builder(EntityKind::Brand)
            .id("p-viewed")
            .name("Some Brand")
            .build();
        let mut results = vec![result(EntityKind::Brand, "p-viewed", doc)];

        apply_personalization(&mut results, &profile(), 1.0, &config);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_merchant_history_boost() {
        let config = EntityBoostConfig::default();
        let doc = Document::builder(EntityKind::Merchant)
            .id("m-viewed")
            .name("Viewed Merchant")
            .build();
        let mut results = vec![result(EntityKind::Merchant, "m-viewed", doc)];

        apply_personalization(&mut results, &profile(), 1.0, &config);
        assert!((results[0].score - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_no_overlap_unchanged() {
        let config = EntityBoostConfig::default();
        let doc = Document::builder(EntityKind::Product)
            .id("p-other")
            .name("Plastic Raincoat")
            .value("waterproof")
            .category("outerwear")
            .build();
        let mut results = vec![result(EntityKind::Product, "p-other", doc)];

        apply_personalization(&mut results, &profile(), 2.0, &config);
        assert_eq!(results[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_memory_store_lookup() {
        let store = MemoryProfileStore::with_profiles([profile()]);
        assert_eq!(store.len(), 1);

        let found = store.profile("user-1").await.unwrap();
        assert_eq!(found, Some(profile()));
        assert_eq!(store.profile("unknown").await.unwrap(), None);
    }

    #[test]
    fn test_memory_store_loads_profile_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&[profile()]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let store = MemoryProfileStore::load_from_file(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }
}
