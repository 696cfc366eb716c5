use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::model::MatchData;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<MatchData>,
    loaded_at: Instant,
}

/// In-memory store of loaded matches, keyed by match id. Owned by the
/// application; entries live until invalidated or cleared.
#[derive(Debug, Clone, Default)]
pub struct MatchCache {
    entries: HashMap<u64, CacheEntry>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, match_id: u64) -> Option<Arc<MatchData>> {
        let hit = self.entries.get(&match_id).map(|entry| entry.data.clone());
        debug!(match_id, hit = hit.is_some(), "match cache lookup");
        hit
    }

    pub fn contains(&self, match_id: u64) -> bool {
        self.entries.contains_key(&match_id)
    }

    /// Stores `data` under its own match id, replacing any previous entry.
    pub fn insert(&mut self, data: Arc<MatchData>) -> Option<Arc<MatchData>> {
        let match_id = data.match_id;
        let entry = CacheEntry {
            data,
            loaded_at: Instant::now(),
        };
        self.entries
            .insert(match_id, entry)
            .map(|previous| previous.data)
    }

    /// Returns the cached value or runs `load` and caches its result.
    /// Failed loads are not cached.
    pub fn get_or_load<E>(
        &mut self,
        match_id: u64,
        load: impl FnOnce() -> Result<MatchData, E>,
    ) -> Result<Arc<MatchData>, E> {
        if let Some(data) = self.get(match_id) {
            return Ok(data);
        }
        let data = Arc::new(load()?);
        self.insert(data.clone());
        Ok(data)
    }

    pub fn invalidate(&mut self, match_id: u64) -> bool {
        let removed = self.entries.remove(&match_id).is_some();
        debug!(match_id, removed, "match cache invalidate");
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn age(&self, match_id: u64) -> Option<Duration> {
        self.entries
            .get(&match_id)
            .map(|entry| entry.loaded_at.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventCollection;

    fn data(match_id: u64) -> MatchData {
        MatchData {
            match_id,
            info: None,
            lineups: Vec::new(),
            events: EventCollection::default(),
        }
    }

    #[test]
    fn get_or_load_only_loads_once() {
        let mut cache = MatchCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let loaded: Result<_, ()> = cache.get_or_load(7, || {
                calls += 1;
                Ok(data(7))
            });
            assert_eq!(loaded.unwrap().match_id, 7);
        }
        assert_eq!(calls, 1);
        assert!(cache.contains(7));
        assert!(cache.age(7).is_some());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache = MatchCache::new();
        let loaded: Result<Arc<MatchData>, &str> = cache.get_or_load(1, || Err("offline"));
        assert_eq!(loaded.unwrap_err(), "offline");
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_forces_reload() {
        let mut cache = MatchCache::new();
        cache.insert(Arc::new(data(3)));
        assert!(cache.invalidate(3));
        assert!(!cache.invalidate(3));
        assert!(cache.get(3).is_none());

        let mut calls = 0;
        let _: Result<_, ()> = cache.get_or_load(3, || {
            calls += 1;
            Ok(data(3))
        });
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_every_match() {
        let mut cache = MatchCache::new();
        cache.insert(Arc::new(data(1)));
        cache.insert(Arc::new(data(2)));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
