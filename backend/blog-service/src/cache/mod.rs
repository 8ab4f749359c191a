//! Timeline cache for the public index page
//!
//! The rendered body of `/` is stored per raw `?page=` value and served as-is
//! until the TTL runs out or the cache is cleared. Writes to posts do not
//! invalidate it, so readers may see a stale index for up to one TTL.

use page_cache::{CacheKey, PageCache};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::Result;

pub const INDEX_VIEW: &str = "index";

#[derive(Clone)]
pub struct TimelineCache {
    pages: PageCache,
    index_ttl: Duration,
}

impl TimelineCache {
    pub fn new(pages: PageCache, index_ttl: Duration) -> Self {
        Self { pages, index_ttl }
    }

    /// Cache key for one index page; an absent page parameter is page `1`
    pub fn index_key(raw_page: Option<&str>) -> String {
        CacheKey::page(INDEX_VIEW, raw_page.unwrap_or("1"))
    }

    pub fn backend_name(&self) -> &'static str {
        self.pages.backend_name()
    }

    /// Serve the cached index body or render and store it
    pub async fn index_page<F, Fut>(&self, raw_page: Option<&str>, render: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let key = Self::index_key(raw_page);
        self.pages.get_or_compute(&key, self.index_ttl, render).await
    }

    /// Drop every cached index page
    pub async fn invalidate_index(&self) -> Result<usize> {
        Ok(self.pages.invalidate_view(INDEX_VIEW).await?)
    }

    /// Drop everything, logging rather than failing when the backend is down
    pub async fn clear(&self) {
        if let Err(e) = self.pages.clear().await {
            warn!(backend = self.backend_name(), error = %e, "Timeline cache clear failed");
        }
    }
}
