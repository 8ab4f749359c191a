//! Prometheus metrics for blog-service.
//!
//! Exposes feed collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use prometheus::{Encoder, TextEncoder};

pub mod feed;

/// Register the page cache collectors on the default registry.
///
/// Safe to call more than once; repeated registration is ignored.
pub fn register_cache_metrics() {
    if let Err(err) = page_cache::CacheMetrics::register(prometheus::default_registry()) {
        tracing::debug!("page cache metrics already registered: {}", err);
    }
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
