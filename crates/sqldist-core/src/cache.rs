//! Module: cache
//! Responsibility: session-scoped memo of condition text → translation result.
//! Does not own: eviction (the set of distinct conditions per schema is bounded).
//! Boundary: failures are cached too, so a malformed text is parsed once.

use crate::condition::{ConditionFingerprint, ParsedCondition, TranslateError, parse_condition};
use dashmap::DashMap;
use std::sync::Arc;

type CachedTranslation = Result<Arc<ParsedCondition>, TranslateError>;

///
/// CacheLookup
///
/// Translation result plus whether it was served from the cache.
///

#[derive(Clone, Debug)]
pub struct CacheLookup {
    pub translation: CachedTranslation,
    pub hit: bool,
}

///
/// ConditionCache
///
/// Concurrent map keyed by condition fingerprint. Entries are immutable
/// once inserted; two threads racing on the same text build equal entries
/// and the first insert wins.
///

#[derive(Debug, Default)]
pub struct ConditionCache {
    entries: DashMap<ConditionFingerprint, CachedTranslation>,
}

impl ConditionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached translation of `text`, translating on first use.
    pub fn get_or_parse(&self, text: &str) -> CacheLookup {
        let fingerprint = ConditionFingerprint::of(text);

        if let Some(entry) = self.entries.get(&fingerprint) {
            return CacheLookup {
                translation: entry.value().clone(),
                hit: true,
            };
        }

        // parse outside the shard lock
        let translated = parse_condition(text).map(Arc::new);
        let translation = self
            .entries
            .entry(fingerprint)
            .or_insert(translated)
            .value()
            .clone();

        CacheLookup {
            translation,
            hit: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

///
/// TESTS
///
