//! Rendered-page caching layer
//!
//! Stores whole rendered response bodies under versioned keys and serves them
//! until their TTL elapses or they are invalidated. Reads within the TTL return
//! the stored body even if the data behind it changed; callers that need fresh
//! output invalidate explicitly.
//!
//! - Unified key schema (`v{N}:page:{view}:{variant}`)
//! - In-process backend (moka) or shared backend (Redis)
//! - Backend failures degrade to uncached rendering
//! - Metrics integration

mod error;
mod keys;
mod memory;
mod metrics;
mod redis_backend;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CACHE_VERSION};
pub use memory::MemoryBackend;
pub use metrics::CacheMetrics;
pub use redis_backend::{RedisBackend, SharedRedis};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default TTL values (seconds)
pub mod ttl {
    pub const INDEX_PAGE: u64 = 300; // 5 minutes
}

/// Default capacity of the in-process backend
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Storage operations a page cache backend must provide
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a stored body
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a body for `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Delete one key
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Delete every key starting with `prefix`, returning how many were removed
    async fn del_prefix(&self, prefix: &str) -> CacheResult<usize>;

    /// Delete every page this cache owns
    async fn clear(&self) -> CacheResult<()>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Page cache service injected into request handlers
#[derive(Clone)]
pub struct PageCache {
    backend: Arc<dyn CacheBackend>,
    metrics: CacheMetrics,
}

impl PageCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            metrics: CacheMetrics::new(),
        }
    }

    pub fn in_memory(max_entries: u64) -> Self {
        Self::new(Arc::new(MemoryBackend::new(max_entries)))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Return the cached body for `key`, or run `compute`, store its output for
    /// `ttl` and return it.
    ///
    /// Errors from `compute` are returned untouched and nothing is stored.
    /// Backend errors never reach the caller: a failed read falls through to
    /// `compute`, a failed write is logged.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        match self.backend.get(key).await {
            Ok(Some(body)) => {
                debug!(key = %key, "Page cache hit");
                self.metrics.record_hit(key);
                return Ok(body);
            }
            Ok(None) => {
                debug!(key = %key, "Page cache miss");
                self.metrics.record_miss(key);
            }
            Err(e) => {
                warn!(key = %key, backend = self.backend.name(), error = %e, "Page cache read failed");
                self.metrics.record_error(key, "get");
            }
        }

        let body = compute().await?;

        match self.backend.set(key, body.clone(), ttl).await {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl.as_secs(), "Page cache set");
                self.metrics.record_write(key);
            }
            Err(e) => {
                warn!(key = %key, backend = self.backend.name(), error = %e, "Page cache write failed");
                self.metrics.record_error(key, "set");
            }
        }

        Ok(body)
    }

    /// Drop one cached page
    pub async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.backend.del(key).await?;
        debug!(key = %key, "Page cache invalidate");
        self.metrics.record_invalidation(key);
        Ok(())
    }

    /// Drop every cached variant of a view
    pub async fn invalidate_view(&self, view: &str) -> CacheResult<usize> {
        let prefix = CacheKey::view_prefix(view);
        let deleted = self.backend.del_prefix(&prefix).await?;
        debug!(view = %view, deleted, "Page cache view invalidate");
        self.metrics.record_invalidation(&CacheKey::page(view, "*"));
        Ok(deleted)
    }

    /// Drop every cached page
    pub async fn clear(&self) -> CacheResult<()> {
        self.backend.clear().await?;
        debug!(backend = self.backend.name(), "Page cache cleared");
        Ok(())
    }
}
