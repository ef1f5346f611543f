//! In-memory session store using moka
//!
//! Entries expire a fixed time after their last write, so a refresh or a
//! flash extends the session.

use super::{Session, SessionStore};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

/// Default maximum number of concurrent sessions
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

pub struct MemorySessionStore {
    cache: Cache<String, Session>,
    ttl: Duration,
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("entry_count", &self.cache.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY, ttl)
    }

    pub fn with_capacity(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.cache.get(id).await)
    }

    async fn put(&self, session: Session) -> Result<()> {
        self.cache.insert(session.id.clone(), session).await;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.cache.invalidate(id).await;
        Ok(())
    }
}
