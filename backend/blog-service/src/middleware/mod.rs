/// HTTP middleware utilities for blog-service
///
/// Provides the authentication seam (HS256 access tokens issued elsewhere)
/// and the per-request context handed to every page handler.
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::debug;

use crate::db::user_repo;
use crate::error::AppError;
use crate::AppState;

/// Cookie checked when no Authorization header is present
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub username: String, // Display name, also the profile slug
    pub iat: usize,       // Issued at
    pub exp: usize,       // Expiration time
}

/// Authenticated user stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub id: i64,
    pub username: String,
}

/// Sign an access token for `viewer`
pub fn issue_token(
    secret: &str,
    viewer: &Viewer,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: viewer.id.to_string(),
        username: viewer.username.clone(),
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token. Invalid, expired or malformed tokens yield `None`.
pub fn decode_token(secret: &str, token: &str) -> Option<Viewer> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let data = match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => data,
        Err(e) => {
            debug!("Ignoring invalid access token: {}", e);
            return None;
        }
    };

    let id = data.claims.sub.parse::<i64>().ok()?;
    Some(Viewer {
        id,
        username: data.claims.username,
    })
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(|t| t.trim().to_string())
}

/// Resolves the viewer from the request, if any. A missing or bad token never
/// rejects a request: routes that need a viewer ask for one through
/// [`RequestContext`].
pub struct AuthMiddleware {
    secret: Rc<String>,
}

impl AuthMiddleware {
    pub fn new(secret: String) -> Self {
        Self {
            secret: Rc::new(secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(&req)
            .or_else(|| req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()));

        let claimed = token.and_then(|t| decode_token(&self.secret, &t));
        let service = self.service.clone();

        Box::pin(async move {
            if let Some(claimed) = claimed {
                if let Some(viewer) = resolve_viewer(&req, claimed).await? {
                    req.extensions_mut().insert(viewer);
                }
            }
            service.call(req).await
        })
    }
}

/// Match a token's subject against the users table. A subject whose account
/// no longer exists is anonymous.
async fn resolve_viewer(req: &ServiceRequest, claimed: Viewer) -> Result<Option<Viewer>, Error> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Ok(Some(claimed));
    };

    match user_repo::find_by_id(&state.pool, claimed.id).await {
        Ok(Some(user)) => Ok(Some(Viewer {
            id: user.id,
            username: user.username,
        })),
        Ok(None) => {
            debug!(user_id = claimed.id, "Ignoring access token for unknown user");
            Ok(None)
        }
        Err(e) => Err(AppError::Database(e).into()),
    }
}

/// Per-request context passed explicitly to page handlers
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub viewer: Option<Viewer>,
    /// Path plus query string of the current request
    pub path: String,
    /// Raw `?page=` value
    pub page: Option<String>,
    pub login_url: String,
}

impl RequestContext {
    pub fn viewer_id(&self) -> Option<i64> {
        self.viewer.as_ref().map(|v| v.id)
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    /// Login redirect carrying the current path as `next`
    pub fn login_redirect(&self) -> String {
        let next = urlencoding::encode(&self.path).replace("%2F", "/");
        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        format!("{}{}next={}", self.login_url, separator, next)
    }

    /// The viewer, or an error redirecting anonymous callers to the login page
    pub fn require_viewer(&self) -> Result<&Viewer, AppError> {
        self.viewer.as_ref().ok_or_else(|| AppError::Unauthenticated {
            redirect_to: self.login_redirect(),
        })
    }

    pub fn from_http_request(req: &HttpRequest) -> Self {
        let login_url = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.config.auth.login_url.clone())
            .unwrap_or_else(|| crate::config::Config::default().auth.login_url);

        let page = web::Query::<HashMap<String, String>>::from_query(req.query_string())
            .ok()
            .and_then(|query| query.get("page").cloned());

        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());

        Self {
            viewer: req.extensions().get::<Viewer>().cloned(),
            path,
            page,
            login_url,
        }
    }
}

impl FromRequest for RequestContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(RequestContext::from_http_request(req)))
    }
}
