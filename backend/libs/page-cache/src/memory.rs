//! In-process backend built on moka
//!
//! Each entry carries its own TTL so callers can mix short and long lived
//! pages in one cache.

use crate::{CacheBackend, CacheResult};
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
struct CachedPage {
    body: String,
    ttl: Duration,
}

struct PageExpiry;

impl Expiry<String, CachedPage> for PageExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedPage,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedPage,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local page cache
#[derive(Clone)]
pub struct MemoryBackend {
    pages: Cache<String, CachedPage>,
}

impl MemoryBackend {
    pub fn new(max_entries: u64) -> Self {
        let pages = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PageExpiry)
            .build();
        Self { pages }
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.pages.get(key).await.map(|page| page.body))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        self.pages
            .insert(key.to_string(), CachedPage { body: value, ttl })
            .await;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.pages.invalidate(key).await;
        Ok(())
    }

    async fn del_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let keys: Vec<String> = self
            .pages
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| String::clone(&key))
            .collect();

        for key in &keys {
            self.pages.invalidate(key).await;
        }

        debug!(prefix = %prefix, deleted = keys.len(), "Memory cache prefix delete");
        Ok(keys.len())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.pages.invalidate_all();
        self.pages.run_pending_tasks().await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
