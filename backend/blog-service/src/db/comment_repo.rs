use crate::models::{Comment, CommentView};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub async fn create_comment(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
    created: DateTime<Utc>,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, text, created)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, post_id, author_id, text, created
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .bind(created)
    .fetch_one(pool)
    .await
}

/// Comments on a post, newest first
pub async fn list_for_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<CommentView>, sqlx::Error> {
    sqlx::query_as::<_, CommentView>(
        r#"
        SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?1
        ORDER BY c.created DESC, c.id DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}

pub async fn count_for_post(pool: &SqlitePool, post_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = ?1")
        .bind(post_id)
        .fetch_one(pool)
        .await
}
