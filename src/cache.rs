//! Freshness policy for cached indicator responses
//!
//! The pipeline itself never caches. This is the policy a data-access layer
//! applies in front of it: one entry per `(symbol, interval, range start)`,
//! kept for an interval-dependent time to live. The clock is always passed in.

use crate::types::{Interval, Timestamp};
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one cached response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub symbol: String,
    pub interval: Interval,
    pub range_start: NaiveDate,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, interval: Interval, range_start: NaiveDate) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            interval,
            range_start,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.symbol, self.interval, self.range_start)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Timestamp,
}

/// In-memory response cache honoring [`Interval::cache_ttl`]
#[derive(Debug, Clone)]
pub struct ResponseCache<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
}

impl<V> ResponseCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: CacheKey, value: V, now: Timestamp) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    /// The cached value, if it is still younger than its interval's TTL
    pub fn get(&self, key: &CacheKey, now: Timestamp) -> Option<&V> {
        let entry = self.entries.get(key)?;
        if now - entry.stored_at < key.interval.cache_ttl() {
            log::debug!("Cache hit for {}", key);
            Some(&entry.value)
        } else {
            log::debug!("Cache entry for {} expired", key);
            None
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&mut self, now: Timestamp) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, entry| now - entry.stored_at < key.interval.cache_ttl());
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
