//! Per-query cache for search provider responses.
//!
//! Keyed by the (lowercased query, freshness window) pair. Uses [`moka`]
//! for async-friendly caching with TTL and automatic eviction. Each client
//! owns its cache instance — there is no process-wide cache state. A zero
//! TTL disables caching entirely, which is the default: a polling deployment
//! can raise it to absorb repeated runs.

use std::time::Duration;

use moka::future::Cache;

use crate::types::{Freshness, NewsItem};

/// Maximum number of cached query responses.
const MAX_CACHE_ENTRIES: u64 = 256;

/// Composite cache key: normalised query plus freshness window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed query string.
    query: String,
    /// Freshness window the query was issued with.
    freshness: Freshness,
}

impl CacheKey {
    /// Build a deterministic cache key from a query and freshness window.
    pub fn new(query: &str, freshness: Freshness) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            freshness,
        }
    }
}

/// TTL cache of search responses, disabled when the TTL is zero.
#[derive(Debug)]
pub struct ResponseCache {
    inner: Option<Cache<CacheKey, Vec<NewsItem>>>,
}

impl ResponseCache {
    /// Create a cache with the given TTL; `Duration::ZERO` disables it.
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(ttl)
                .build()
        });
        Self { inner }
    }

    /// Whether caching is active.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up cached results for the given key.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<NewsItem>> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    /// Insert results for the given key. No-op when caching is disabled.
    pub async fn insert(&self, key: CacheKey, results: Vec<NewsItem>) {
        if let Some(cache) = &self.inner {
            cache.insert(key, results).await;
        }
    }
}
