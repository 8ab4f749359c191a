/// Configuration management for Blog Service
///
/// All settings come from environment variables (a `.env` file is loaded first
/// by the binary). Every value has a development default except the JWT secret
/// in production.
use serde::{Deserialize, Serialize};

/// Minimum HS256 secret length accepted outside development
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Page cache configuration
    pub cache: CacheConfig,
    /// Feed configuration
    pub feed: FeedConfig,
    /// Authentication seam configuration
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://yatube.db?mode=rwc` or `sqlite::memory:`
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Page cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; when unset pages are cached in-process
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Lifetime of the cached index page
    pub index_ttl_secs: u64,
    /// Capacity of the in-process cache
    pub max_entries: u64,
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub posts_per_page: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the service that issues access tokens
    pub jwt_secret: String,
    /// Where anonymous users are sent for auth-required routes
    pub login_url: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                env: "development".to_string(),
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "sqlite://yatube.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            cache: CacheConfig {
                redis_url: None,
                index_ttl_secs: page_cache::ttl::INDEX_PAGE,
                max_entries: page_cache::DEFAULT_MAX_ENTRIES,
            },
            feed: FeedConfig { posts_per_page: 10 },
            auth: AuthConfig {
                jwt_secret: "dev-only-secret-change-me-dev-only-secret".to_string(),
                login_url: "/auth/login/".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| defaults.app.env.clone());
        let is_production = app_env.eq_ignore_ascii_case("production");

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if is_production => {
                return Err("JWT_SECRET must be set in production".to_string())
            }
            Err(_) => defaults.auth.jwt_secret.clone(),
        };
        if is_production && jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(format!(
                "JWT_SECRET must be at least {} bytes in production",
                MIN_JWT_SECRET_LEN
            ));
        }

        let posts_per_page: usize = parse_env_or_default("POSTS_ON_PAGE", defaults.feed.posts_per_page)?;
        if posts_per_page == 0 {
            return Err("POSTS_ON_PAGE must be greater than zero".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or(defaults.app.host),
                port: parse_env_or_default("BLOG_SERVICE_PORT", defaults.app.port)?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_env_or_default(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
            },
            cache: CacheConfig {
                redis_url: std::env::var("REDIS_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty()),
                index_ttl_secs: parse_env_or_default(
                    "INDEX_CACHE_TTL_SECS",
                    defaults.cache.index_ttl_secs,
                )?,
                max_entries: parse_env_or_default(
                    "PAGE_CACHE_MAX_ENTRIES",
                    defaults.cache.max_entries,
                )?,
            },
            feed: FeedConfig { posts_per_page },
            auth: AuthConfig {
                jwt_secret,
                login_url: std::env::var("LOGIN_URL").unwrap_or(defaults.auth.login_url),
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
