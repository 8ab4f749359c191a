use actix_web::{web, App, HttpServer};
use blog_service::db::{self, DbConfig};
use blog_service::handlers;
use blog_service::metrics::register_cache_metrics;
use blog_service::middleware::AuthMiddleware;
use blog_service::{AppState, Config};
use page_cache::{PageCache, RedisBackend};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Pick the page cache tier: Redis when configured and reachable, otherwise
/// in-process.
async fn build_page_cache(config: &Config) -> PageCache {
    if let Some(url) = config.cache.redis_url.as_deref() {
        match RedisBackend::connect(url).await {
            Ok(backend) => {
                tracing::info!("Page cache using Redis");
                return PageCache::new(Arc::new(backend));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, falling back to in-process page cache");
            }
        }
    }
    PageCache::in_memory(config.cache.max_entries)
}

/// Blog Service
///
/// Serves the public timeline, group and profile pages, post authoring,
/// comments and author follows.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_config = DbConfig::new(&config.database.url, config.database.max_connections);
    let pool = db::create_pool(&db_config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("{e:#}")))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("{e:#}")))?;

    register_cache_metrics();
    let pages = build_page_cache(&config).await;
    tracing::info!(
        backend = pages.backend_name(),
        ttl_secs = config.cache.index_ttl_secs,
        "Timeline cache ready"
    );

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let jwt_secret = config.auth.jwt_secret.clone();
    let state = web::Data::new(AppState::new(config, pool, pages));

    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(AuthMiddleware::new(jwt_secret.clone()))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .shutdown_timeout(10)
    .run();

    let handle = server.handle();
    tokio::select! {
        result = server => result?,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping HTTP server");
            handle.stop(true).await;
        }
    }

    tracing::info!("blog-service stopped");
    Ok(())
}
