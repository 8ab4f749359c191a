/// Error types for Blog Service
///
/// Handlers return `Result<HttpResponse>`; every failure is converted into the
/// response the browser expects. Missing resources get the themed 404 page,
/// auth and ownership failures become redirects and everything else is JSON.
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use thiserror::Error;
use validator::ValidationErrors;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown post, group slug, username or route
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anonymous caller on a route that requires a viewer
    #[error("Authentication required")]
    Unauthenticated { redirect_to: String },

    /// Authenticated caller that does not own the resource
    #[error("Forbidden")]
    Forbidden { redirect_to: String },

    /// Form input rejected; form handlers re-render instead of surfacing this
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] page_cache::CacheError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated { .. } | AppError::Forbidden { .. } => StatusCode::FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) => crate::render::not_found_page(),
            AppError::Unauthenticated { redirect_to } | AppError::Forbidden { redirect_to } => {
                HttpResponse::Found()
                    .insert_header((header::LOCATION, redirect_to.as_str()))
                    .finish()
            }
            AppError::Validation(errors) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Validation error",
                    "status": 400,
                    "fields": crate::render::field_errors(errors),
                }))
            }
            _ => {
                let status = self.status_code();
                if status.is_server_error() {
                    tracing::error!(error = %self, "Request failed");
                }
                // Internal details stay in the log
                let message = match self {
                    AppError::BadRequest(msg) => msg.clone(),
                    _ => "Internal server error".to_string(),
                };
                HttpResponse::build(status).json(serde_json::json!({
                    "error": message,
                    "status": status.as_u16(),
                }))
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
