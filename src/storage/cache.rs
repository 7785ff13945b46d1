// src/storage/cache.rs
use dashmap::DashMap;
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::models::status::QueryOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub host: String,
    pub port: u16,
}

impl CacheKey {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub outcome: QueryOutcome,
    pub inserted_at: u64,
}

impl CacheEntry {
    fn is_fresh(&self, now: u64, ttl: Duration) -> bool {
        now.saturating_sub(self.inserted_at) < ttl.as_secs()
    }
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Latest query outcome per `(host, port)`, failures included.
///
/// Every key owns its own async mutex. A caller that misses holds that mutex
/// while fetching, so concurrent callers for the same key wait and then read
/// what was stored instead of fetching again. Unrelated keys never contend.
pub struct StatusCache {
    slots: DashMap<CacheKey, Slot>,
    clock: Arc<dyn Clock>,
}

impl StatusCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: DashMap::new(),
            clock,
        }
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        if let Some(slot) = self.slots.get(key) {
            return slot.value().clone();
        }
        self.slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .value()
            .clone()
    }

    /// Returns the stored outcome for `(host, port)` if it is younger than
    /// `ttl`, otherwise runs `fetch`, stores what it returns and returns it.
    pub async fn get_or_fetch<F, Fut>(&self, host: &str, port: u16, ttl: Duration, fetch: F) -> QueryOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = QueryOutcome>,
    {
        let key = CacheKey::new(host, port);
        let arrived_at = self.clock.now();
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            // An entry stored no earlier than our arrival came from a fetch we
            // waited on, share it whatever the TTL.
            if cached.is_fresh(self.clock.now(), ttl) || cached.inserted_at >= arrived_at {
                debug!("Cache hit for {}:{}", host, port);
                return cached.outcome.clone();
            }
        }

        debug!("Cache miss for {}:{}, querying", host, port);
        let outcome = fetch().await;
        *entry = Some(CacheEntry {
            outcome: outcome.clone(),
            inserted_at: self.clock.now(),
        });
        outcome
    }

    /// Drops expired entries nobody is currently fetching.
    ///
    /// A slot some caller has already cloned out of the map is kept even when
    /// unlocked, so that caller and any later one still share the same mutex.
    /// `retain` holds the shard lock, so no new clone can appear meanwhile.
    pub fn purge_expired(&self, ttl: Duration) {
        let now = self.clock.now();
        self.slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().map_or(false, |e| e.is_fresh(now, ttl)),
                Err(_) => true,
            }
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
