// src/service.rs
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::models::status::QueryOutcome;
use crate::storage::cache::StatusCache;

/// Anything that can ask a server for its status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn query(&self, host: &str, port: u16) -> QueryOutcome;
}

/// Cached front door to a `StatusSource`.
pub struct StatusService {
    cache: StatusCache,
    source: Arc<dyn StatusSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl StatusService {
    pub fn new(source: Arc<dyn StatusSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            cache: StatusCache::new(clock.clone()),
            source,
            clock,
            ttl,
        }
    }

    pub async fn status(&self, host: &str, port: u16) -> QueryOutcome {
        let source = &self.source;
        self.cache
            .get_or_fetch(host, port, self.ttl, || source.query(host, port))
            .await
    }

    pub fn cleanup_stale_entries(&self) {
        self.cache.purge_expired(self.ttl);
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }
}
