//! Compiled-condition cache.
//!
//! Surveys repeat the same handful of condition sentences for every
//! submission. [`ConditionCache`] keeps their parse trees keyed by the
//! whitespace-normalized sentence, so `"a == 1  AND b"` and `"a == 1 AND b"`
//! share one entry. Parse trees never go stale, so entries leave only when
//! the least recently used one makes room for a new sentence.
//!
//! # Example
//!
//! ```rust
//! use survey_condition::Grammar;
//! use survey_condition_executor::{CacheConfig, ConditionCache};
//!
//! let cache = ConditionCache::new(&CacheConfig::default(), Grammar::default());
//! let first = cache.compile("mood == 1").unwrap();
//! let again = cache.compile("mood  ==  1").unwrap();
//!
//! assert!(std::sync::Arc::ptr_eq(&first, &again));
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use survey_condition::{Condition, Grammar};

use crate::config::CacheConfig;
use crate::error::ExecutorResult;

/// LRU map from normalized sentence to parsed condition.
///
/// Every entry is parsed with the grammar the cache was built with, so one
/// cache serves one grammar.
pub struct ConditionCache {
    grammar: Grammar,
    conditions: Mutex<LruCache<String, Arc<Condition>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Counters reported by [`ConditionCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Sentences currently held.
    pub entries: usize,
    /// Maximum sentences held before eviction.
    pub capacity: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to parse.
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl ConditionCache {
    /// Creates a cache that parses misses with `grammar`.
    pub fn new(config: &CacheConfig, grammar: Grammar) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            grammar,
            conditions: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The grammar misses are parsed with.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    // A poisoned lock only means another thread panicked mid-insert; the map
    // itself is still consistent.
    fn conditions(&self) -> MutexGuard<'_, LruCache<String, Arc<Condition>>> {
        self.conditions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached parse of `sentence`, parsing it on a miss.
    ///
    /// Parsing happens outside the lock. Two threads missing on the same
    /// sentence both parse it and the later insert wins. Sentences that fail
    /// to parse are not cached.
    pub fn compile(&self, sentence: &str) -> ExecutorResult<Arc<Condition>> {
        let key = normalize_cache_key(sentence);
        if let Some(condition) = self.conditions().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(sentence = key.as_str(), "condition cache hit");
            return Ok(Arc::clone(condition));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let condition = Arc::new(Condition::parse_with(sentence, &self.grammar)?);
        self.conditions().put(key, Arc::clone(&condition));
        Ok(condition)
    }

    /// Whether `sentence` is cached. Does not touch recency or counters.
    pub fn contains(&self, sentence: &str) -> bool {
        self.conditions().contains(&normalize_cache_key(sentence))
    }

    /// Number of cached sentences.
    pub fn len(&self) -> usize {
        self.conditions().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.conditions().is_empty()
    }

    /// Drops every cached sentence. Counters are kept.
    pub fn clear(&self) {
        self.conditions().clear();
    }

    /// Returns the current counters.
    pub fn stats(&self) -> CacheStats {
        let conditions = self.conditions();
        CacheStats {
            entries: conditions.len(),
            capacity: conditions.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ConditionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionCache")
            .field("max_depth", &self.grammar.max_depth())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Collapses whitespace runs so spacing variants share a cache entry.
pub fn normalize_cache_key(sentence: &str) -> String {
    sentence.split_whitespace().collect::<Vec<_>>().join(" ")
}
