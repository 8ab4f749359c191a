/// HTTP handlers and route table
///
/// - Feeds: index, group, profile and following pages
/// - Posts: detail, create, edit and comments
/// - Follow: follow / unfollow an author
pub mod feed;
pub mod follow;
pub mod posts;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::time::Instant;

use crate::metrics::serve_metrics;
use crate::{render, AppState};

/// Register every route. Unknown paths get the themed 404 page.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(feed::index))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .route("/profile/{username}/", web::get().to(feed::profile))
        .route(
            "/profile/{username}/follow/",
            web::get().to(follow::profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            web::get().to(follow::profile_unfollow),
        )
        .route("/follow/", web::get().to(feed::follow_index))
        .route("/posts/{post_id:\\d+}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id:\\d+}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route(
            "/posts/{post_id:\\d+}/comment/",
            web::post().to(posts::add_comment),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/health/live", web::get().to(liveness))
        .route("/health/ready", web::get().to(readiness))
        .route("/metrics", web::get().to(serve_metrics))
        .default_service(web::to(not_found));
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub(crate) fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

async fn not_found() -> HttpResponse {
    render::not_found_page()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        latency_ms: None,
        message: None,
    })
}

async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => HttpResponse::Ok().json(HealthResponse {
            status: "ready",
            latency_ms: Some(start.elapsed().as_millis() as u64),
            message: None,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unavailable",
                latency_ms: None,
                message: Some(e.to_string()),
            })
        }
    }
}
