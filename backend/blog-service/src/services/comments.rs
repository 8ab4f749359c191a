use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::services::not_blank;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

#[derive(Clone)]
pub struct CommentService {
    pool: SqlitePool,
}

impl CommentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a comment to an existing post. An invalid form stores nothing and
    /// returns `None`; the caller redirects back to the post either way.
    pub async fn add(
        &self,
        post_id: i64,
        author_id: i64,
        form: &CommentForm,
    ) -> Result<Option<Comment>> {
        if post_repo::find_post_by_id(&self.pool, post_id).await?.is_none() {
            return Err(AppError::not_found(format!("post {}", post_id)));
        }

        if let Err(errors) = form.validate() {
            debug!(post_id, author_id, %errors, "Comment rejected");
            return Ok(None);
        }

        let comment =
            comment_repo::create_comment(&self.pool, post_id, author_id, form.text.trim(), Utc::now())
                .await?;

        info!(comment_id = comment.id, post_id, author_id, "Comment added");
        Ok(Some(comment))
    }
}
