//! Page cache key schema
//!
//! Key format: v{VERSION}:page:{view}:{variant}

/// Cache schema version - increment when the rendered page layout changes
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Rendered page of a view
    /// Format: v1:page:{view}:{variant}
    pub fn page(view: &str, variant: &str) -> String {
        format!("v{}:page:{}:{}", CACHE_VERSION, view, variant)
    }

    /// Prefix shared by every variant of a view
    pub fn view_prefix(view: &str) -> String {
        format!("v{}:page:{}:", CACHE_VERSION, view)
    }

    /// Prefix shared by every key this crate writes
    pub fn root_prefix() -> String {
        format!("v{}:page:", CACHE_VERSION)
    }

    /// Extract the view name from a key
    pub fn view_of(key: &str) -> Option<&str> {
        let mut parts = key.splitn(4, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(_), Some("page"), Some(view)) => Some(view),
            _ => None,
        }
    }
}
