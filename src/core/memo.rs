//! Bounded memoization cache for the search engine.
//!
//! Maps a canonical [`StateKey`] to the best state reachable from it. The
//! cache holds at most `capacity` entries and evicts the least recently used
//! one when full. An evicted entry is simply recomputed the next time its
//! state is reached: under the exhaustive strategy that costs time only, the
//! result does not change.
//!
//! A cache belongs to exactly one search invocation. Keys carry no catalogue
//! identity, so a cache filled against one catalogue must never be consulted
//! for another.

use crate::core::state::{SearchState, StateKey};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;

/// Capacity used when none is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct MemoCache {
    entries: Option<LruCache<StateKey, SearchState>>,
    stats: CacheStatistics,
}

impl MemoCache {
    /// A cache holding up to `capacity` entries; zero disables memoization.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            stats: CacheStatistics::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |cache| cache.cap().get())
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&mut self, key: &StateKey) -> Option<SearchState> {
        let cache = self.entries.as_mut()?;
        match cache.get(key) {
            Some(best) => {
                self.stats.hits += 1;
                Some(best.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: StateKey, best: SearchState) {
        let Some(cache) = self.entries.as_mut() else {
            return;
        };
        if cache.len() == cache.cap().get() && !cache.contains(&key) {
            self.stats.evictions += 1;
        }
        cache.put(key, best);
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        if let Some(cache) = self.entries.as_mut() {
            cache.clear();
        }
        self.stats = CacheStatistics::default();
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.stats
    }
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
