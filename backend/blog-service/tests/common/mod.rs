//! Shared fixtures for blog-service integration tests
//!
//! Every test gets its own in-memory SQLite database and in-process page
//! cache. Viewers authenticate with access tokens signed by [`SECRET`].

#![allow(dead_code)]

use actix_web::{body::MessageBody, dev::ServiceResponse, web};
use blog_service::db::{self, user_repo};
use blog_service::middleware::{issue_token, Viewer};
use blog_service::models::User;
use blog_service::{AppState, Config};
use page_cache::PageCache;

pub const SECRET: &str = "integration-test-secret-integration-test";

/// Build the app the same way `main` does, minus request logging
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(blog_service::middleware::AuthMiddleware::new(
                    common::SECRET.to_string(),
                ))
                .configure(blog_service::handlers::configure),
        )
        .await
    };
}

pub async fn state() -> web::Data<AppState> {
    state_with(|_| {}).await
}

pub async fn state_with(tweak: impl FnOnce(&mut Config)) -> web::Data<AppState> {
    let mut config = Config::default();
    config.auth.jwt_secret = SECRET.to_string();
    tweak(&mut config);

    let pool = db::memory_pool().await.expect("in-memory database");
    web::Data::new(AppState::new(config, pool, PageCache::in_memory(1_000)))
}

pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn auth(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub async fn user(state: &web::Data<AppState>, username: &str) -> TestUser {
    let user = user_repo::create_user(&state.pool, username)
        .await
        .expect("create user");
    let viewer = Viewer {
        id: user.id,
        username: user.username.clone(),
    };
    let token = issue_token(SECRET, &viewer, 3600).expect("sign token");
    TestUser { user, token }
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn json_body<B>(resp: ServiceResponse<B>) -> serde_json::Value
where
    B: MessageBody,
{
    let body = actix_web::test::read_body(resp).await;
    serde_json::from_slice(&body).expect("JSON page body")
}

/// Texts of the posts on a rendered page, in display order
pub fn page_texts(body: &serde_json::Value) -> Vec<String> {
    body["page_obj"]["object_list"]
        .as_array()
        .map(|posts| {
            posts
                .iter()
                .filter_map(|p| p["text"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
