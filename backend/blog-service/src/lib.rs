/// Blog Service Library
///
/// Posts grouped into topical communities, comments, author follows and a
/// cached public timeline.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Row types for users, groups, posts, comments, follows
/// - `services`: Pagination, feed composition, follows, posts and comments
/// - `db`: SQLite pool, migrations and repositories
/// - `cache`: Timeline cache for the index page
/// - `middleware`: Access-token authentication and request context
/// - `render`: Page documents and the 404 page
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod render;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use cache::TimelineCache;
use page_cache::PageCache;
use services::{CommentService, FeedService, FollowService, Paginator, PostService};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub feed: FeedService,
    pub follows: FollowService,
    pub posts: PostService,
    pub comments: CommentService,
    pub timeline: TimelineCache,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool, pages: PageCache) -> Self {
        let paginator = Paginator::new(config.feed.posts_per_page);
        let timeline =
            TimelineCache::new(pages, Duration::from_secs(config.cache.index_ttl_secs));

        Self {
            feed: FeedService::new(pool.clone(), paginator),
            follows: FollowService::new(pool.clone()),
            posts: PostService::new(pool.clone()),
            comments: CommentService::new(pool.clone()),
            timeline,
            pool,
            config: Arc::new(config),
        }
    }
}
