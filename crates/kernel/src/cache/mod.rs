//! Age-bounded content cache.
//!
//! Entries are shared read-only through `Arc` and invalidated purely by age:
//! a read of an entry older than `max_age` evicts it and misses. There is no
//! background sweeper and no global instance; each composer owns its cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

/// Default entry lifetime (10 minutes).
pub const DEFAULT_MAX_AGE_SECS: i64 = 600;

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    stored_at: DateTime<Utc>,
}

/// Keyed cache with age-based expiry.
pub struct ContentCache<V> {
    inner: Arc<CacheInner<V>>,
}

struct CacheInner<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
}

impl<V> Clone for ContentCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for ContentCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentCache")
            .field("entries", &self.inner.entries.read().len())
            .field("max_age", &self.inner.max_age)
            .finish()
    }
}

impl<V> ContentCache<V> {
    /// Create a cache on the wall clock.
    pub fn new(max_age: Duration) -> Self {
        Self::with_clock(max_age, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`.
    pub fn with_clock(max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                clock,
                max_age,
            }),
        }
    }

    pub fn max_age(&self) -> Duration {
        self.inner.max_age
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.stored_at <= self.inner.max_age
    }

    /// Get a fresh value, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let now = self.inner.clock.now();
        {
            let entries = self.inner.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if self.is_fresh(entry, now) => {
                    return Some(Arc::clone(&entry.value));
                }
                Some(_) => {}
            }
        }

        let mut entries = self.inner.entries.write();
        // Re-check under the write lock; another writer may have refreshed it.
        if let Some(entry) = entries.get(key) {
            if self.is_fresh(entry, now) {
                return Some(Arc::clone(&entry.value));
            }
            entries.remove(key);
            debug!(key = %key, "cache entry expired");
        }
        None
    }

    /// Check for a fresh value (evicts an expired one).
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store a value, replacing any previous one, and return the shared handle.
    pub fn insert(&self, key: impl Into<String>, value: V) -> Arc<V> {
        let key = key.into();
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            stored_at: self.inner.clock.now(),
        };
        self.inner.entries.write().insert(key.clone(), entry);
        debug!(key = %key, "cache set");
        value
    }

    /// Remove one key.
    pub fn remove(&self, key: &str) {
        self.inner.entries.write().remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner.entries.write().clear();
        debug!("cache cleared");
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }
}
