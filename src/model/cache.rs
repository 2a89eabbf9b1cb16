//! Bounded cache of search results keyed by query and mode

use std::collections::{HashMap, VecDeque};

use super::track::Track;
use super::types::SearchMode;

pub const SEARCH_CACHE_CAPACITY: usize = 50;

/// Cache key: the trimmed query exactly as typed, plus the search mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub mode: SearchMode,
}

impl CacheKey {
    pub fn new(query: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            query: query.into(),
            mode,
        }
    }
}

/// Insertion-ordered cache with FIFO eviction.
///
/// Re-putting an existing key replaces the value but keeps its original
/// position in the eviction order; reads never affect the order.
#[derive(Debug)]
pub struct SearchCache {
    entries: HashMap<CacheKey, Vec<Track>>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::with_capacity(SEARCH_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&[Track]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn put(&mut self, key: CacheKey, tracks: Vec<Track>) {
        if self.entries.insert(key.clone(), tracks).is_none() {
            self.order.push_back(key);
        }

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            tracing::trace!(query = %oldest.query, mode = ?oldest.mode, "Evicting search cache entry");
            self.entries.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::fixtures::track;

    fn key(i: usize) -> CacheKey {
        CacheKey::new(format!("query {i}"), SearchMode::Full)
    }

    #[test]
    fn get_returns_what_was_put() {
        let mut cache = SearchCache::new();
        let tracks = vec![track("1", 30), track("2", 30)];
        cache.put(key(0), tracks.clone());
        assert_eq!(cache.get(&key(0)), Some(tracks.as_slice()));
        assert_eq!(cache.get(&key(1)), None);
    }

    #[test]
    fn fifty_first_insert_evicts_only_the_oldest() {
        let mut cache = SearchCache::new();
        for i in 0..=SEARCH_CACHE_CAPACITY {
            cache.put(key(i), vec![track(&i.to_string(), 30)]);
        }

        assert_eq!(cache.len(), SEARCH_CACHE_CAPACITY);
        assert!(!cache.contains(&key(0)));
        for i in 1..=SEARCH_CACHE_CAPACITY {
            let stored = cache.get(&key(i)).expect("entry survives");
            assert_eq!(stored, [track(&i.to_string(), 30)].as_slice());
        }
    }

    #[test]
    fn reads_and_overwrites_do_not_refresh_position() {
        let mut cache = SearchCache::with_capacity(2);
        cache.put(key(0), vec![track("a", 30)]);
        cache.put(key(1), vec![track("b", 30)]);

        assert!(cache.get(&key(0)).is_some());
        cache.put(key(0), vec![track("c", 30)]);
        cache.put(key(2), vec![track("d", 30)]);

        assert!(!cache.contains(&key(0)));
        assert!(cache.contains(&key(1)));
        assert!(cache.contains(&key(2)));
    }

    #[test]
    fn keys_are_case_and_mode_sensitive() {
        let mut cache = SearchCache::new();
        cache.put(CacheKey::new("Daft Punk", SearchMode::Full), vec![track("1", 30)]);

        assert!(cache.get(&CacheKey::new("daft punk", SearchMode::Full)).is_none());
        assert!(cache.get(&CacheKey::new("Daft Punk", SearchMode::Suggestions)).is_none());
        assert!(cache.get(&CacheKey::new("Daft Punk", SearchMode::Full)).is_some());
    }
}
