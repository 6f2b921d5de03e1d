//! # Resolution Cache
//!
//! Successful resolution results are cached by canonical DID. Entries never
//! expire unless a time-to-live is configured.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::resolve::ResolutionResult;

/// Storage for successful resolution results.
pub trait ResolutionCache: Send + Sync {
    /// The cached result for `did`, if any.
    fn get(&self, did: &str) -> Option<ResolutionResult>;

    /// Cache `result` for `did`. Concurrent inserts for the same DID are
    /// last-writer-wins.
    fn insert(&self, did: &str, result: ResolutionResult);

    /// Drop the cached result for `did`.
    fn remove(&self, did: &str);
}

/// In-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, (Instant, ResolutionResult)>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// A cache whose entries never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose entries expire `ttl` after insertion.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Number of cached entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResolutionCache for MemoryCache {
    fn get(&self, did: &str) -> Option<ResolutionResult> {
        let expired = {
            let entry = self.entries.get(did)?;
            let (inserted, result) = entry.value();
            match self.ttl {
                Some(ttl) if inserted.elapsed() >= ttl => true,
                _ => return Some(result.clone()),
            }
        };
        if expired {
            self.entries.remove(did);
        }
        None
    }

    fn insert(&self, did: &str, result: ResolutionResult) {
        self.entries.insert(did.to_string(), (Instant::now(), result));
    }

    fn remove(&self, did: &str) {
        self.entries.remove(did);
    }
}

/// A cache that stores nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl ResolutionCache for NoCache {
    fn get(&self, _: &str) -> Option<ResolutionResult> {
        None
    }

    fn insert(&self, _: &str, _: ResolutionResult) {}

    fn remove(&self, _: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const DID: &str = "did:orgid:1:0x6d98103810d50b3711ea81c187a48245109ba094644ddbc54f8d0c4c7e2bb0b6";

    fn result() -> ResolutionResult {
        ResolutionResult::new(DID)
    }

    #[test]
    fn memory() {
        let cache = MemoryCache::new();
        assert!(cache.get(DID).is_none());

        cache.insert(DID, result());
        assert_eq!(cache.get(DID).expect("should be cached").did, DID);
        assert_eq!(cache.len(), 1);

        cache.remove(DID);
        assert!(cache.is_empty());
    }

    #[test]
    fn expired() {
        let cache = MemoryCache::with_ttl(Duration::ZERO);
        cache.insert(DID, result());
        assert!(cache.get(DID).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn no_cache() {
        let cache = NoCache;
        cache.insert(DID, result());
        assert!(cache.get(DID).is_none());
    }
}
