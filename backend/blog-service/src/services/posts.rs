/// Post service - creation, editing and the detail page
use crate::db::{comment_repo, group_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{CommentView, Group, Post, PostView};
use crate::services::not_blank;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::borrow::Cow;
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

/// Submitted post form. `group` is the raw select value; empty means none.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    /// Storage key of an already uploaded image
    #[serde(default)]
    #[validate(length(max = 255))]
    pub image: Option<String>,
}

impl PostForm {
    /// Prefilled form for editing an existing post
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: post.image.clone(),
        }
    }

    fn image_key(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Post detail page data
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub comment_count: i64,
}

#[derive(Clone)]
pub struct PostService {
    pool: SqlitePool,
}

impl PostService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, author_id: i64, form: &PostForm) -> Result<Post> {
        let group_id = self.validate_form(form).await?;

        let post = post_repo::create_post(
            &self.pool,
            author_id,
            form.text.trim(),
            group_id,
            form.image_key(),
            Utc::now(),
        )
        .await?;

        info!(post_id = post.id, author_id, "Post created");
        Ok(post)
    }

    /// Update text, group and image. The publication date and author are
    /// fixed; an edit without an image keeps the current one.
    pub async fn edit(&self, post_id: i64, editor_id: i64, form: &PostForm) -> Result<Post> {
        let post = self.owned_post(post_id, editor_id).await?;
        let group_id = self.validate_form(form).await?;
        let image = form.image_key().or(post.image.as_deref());

        let updated = post_repo::update_post(&self.pool, post.id, form.text.trim(), group_id, image)
            .await?
            .ok_or_else(|| AppError::not_found(format!("post {}", post_id)))?;

        info!(post_id, editor_id, "Post updated");
        Ok(updated)
    }

    /// Load a post for editing, checking ownership
    pub async fn owned_post(&self, post_id: i64, editor_id: i64) -> Result<Post> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("post {}", post_id)))?;

        if post.author_id != editor_id {
            return Err(AppError::Forbidden {
                redirect_to: format!("/posts/{}/", post_id),
            });
        }
        Ok(post)
    }

    pub async fn detail(&self, post_id: i64) -> Result<PostDetail> {
        let post = post_repo::find_view_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("post {}", post_id)))?;
        let comments = comment_repo::list_for_post(&self.pool, post_id).await?;
        let comment_count = comments.len() as i64;

        Ok(PostDetail {
            post,
            comments,
            comment_count,
        })
    }

    /// Groups offered by the post form
    pub async fn form_choices(&self) -> Result<Vec<Group>> {
        Ok(group_repo::list_groups(&self.pool).await?)
    }

    /// Run field validation and resolve the group choice
    async fn validate_form(&self, form: &PostForm) -> Result<Option<i64>> {
        let mut errors = match form.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let group_id = match form.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let found = match raw.parse::<i64>() {
                    Ok(id) => group_repo::find_by_id(&self.pool, id).await?.map(|g| g.id),
                    Err(_) => None,
                };
                if found.is_none() {
                    errors.add("group", invalid_choice());
                }
                found
            }
        };

        if errors.errors().is_empty() {
            Ok(group_id)
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

fn invalid_choice() -> ValidationError {
    ValidationError::new("invalid_choice")
        .with_message(Cow::Borrowed("Select a valid choice."))
}
