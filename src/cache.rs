//! Process-local response cache with a fixed TTL.
//!
//! Each endpoint owns one cache. Entries are written after a successful
//! upstream call and checked against the TTL on every read; stale entries are
//! shadowed rather than purged, and nothing is ever evicted.
//!
//! The clock is injected so tests can move time forward without sleeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Weather reports go stale after 15 minutes.
pub const WEATHER_TTL: Duration = Duration::from_secs(15 * 60);

/// Location suggestions are kept for a day.
pub const SUGGESTION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.start + offset
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    payload: V,
    stored_at: Instant,
}

/// TTL cache shared across request handlers.
///
/// Cloning is cheap and every clone sees the same entries. Concurrent writes
/// to one key are last-writer-wins.
#[derive(Clone)]
pub struct ResponseCache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache using the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Return the payload for `key` if it was stored less than one TTL ago.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        if age < self.ttl {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Store `payload` under `key`, replacing whatever was there.
    pub async fn put(&self, key: impl Into<String>, payload: V) {
        let entry = CacheEntry {
            payload,
            stored_at: self.clock.now(),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_clock(ttl: Duration) -> (ResponseCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::with_clock(ttl, clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_miss_on_empty_cache() {
        let cache: ResponseCache<String> = ResponseCache::new(WEATHER_TTL);
        assert!(cache.get("denver, CO").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let (cache, clock) = cache_with_clock(WEATHER_TTL);
        cache.put("denver, CO", "sunny".to_string()).await;

        clock.advance(Duration::from_secs(14 * 60));
        assert_eq!(cache.get("denver, CO").await.as_deref(), Some("sunny"));
    }

    #[tokio::test]
    async fn test_expires_at_ttl() {
        let (cache, clock) = cache_with_clock(WEATHER_TTL);
        cache.put("denver, CO", "sunny".to_string()).await;

        clock.advance(WEATHER_TTL);
        assert!(cache.get("denver, CO").await.is_none());
        // Stale entries are shadowed, not removed
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock(Duration::from_secs(60));
        cache.put("k", "old".to_string()).await;
        clock.advance(Duration::from_secs(50));
        cache.put("k", "new".to_string()).await;
        clock.advance(Duration::from_secs(50));

        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache: ResponseCache<Vec<String>> = ResponseCache::new(SUGGESTION_TTL);
        let other = cache.clone();
        other
            .put("den", vec!["Denver, CO".to_string()])
            .await;

        assert_eq!(
            cache.get("den").await,
            Some(vec!["Denver, CO".to_string()])
        );
    }
}
