use crate::models::{Post, PostView};
use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};

const POST_COLUMNS: &str = "id, text, pub_date, author_id, group_id, image";

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, g.title AS group_title, p.image
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

/// Which posts a feed query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows
    FollowedBy(i64),
}

impl PostScope {
    /// WHERE clause over `p` plus the value for `?1` (NULL for the global feed)
    fn filter(&self) -> (&'static str, Option<i64>) {
        match self {
            PostScope::All => ("WHERE ?1 IS NULL", None),
            PostScope::Group(id) => ("WHERE p.group_id = ?1", Some(*id)),
            PostScope::Author(id) => ("WHERE p.author_id = ?1", Some(*id)),
            PostScope::FollowedBy(id) => (
                "WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ?1)",
                Some(*id),
            ),
        }
    }
}

/// Insert a post. `pub_date` is assigned by the caller and never updated.
pub async fn create_post(
    pool: &SqlitePool,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
    pub_date: DateTime<Utc>,
) -> Result<Post, sqlx::Error> {
    let sql = format!(
        "INSERT INTO posts (text, pub_date, author_id, group_id, image)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING {POST_COLUMNS}"
    );
    sqlx::query_as::<_, Post>(&sql)
        .bind(text)
        .bind(pub_date)
        .bind(author_id)
        .bind(group_id)
        .bind(image)
        .fetch_one(pool)
        .await
}

/// Update the editable fields of a post
pub async fn update_post(
    pool: &SqlitePool,
    post_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<Option<Post>, sqlx::Error> {
    let sql = format!(
        "UPDATE posts SET text = ?1, group_id = ?2, image = ?3
         WHERE id = ?4
         RETURNING {POST_COLUMNS}"
    );
    sqlx::query_as::<_, Post>(&sql)
        .bind(text)
        .bind(group_id)
        .bind(image)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_post_by_id(pool: &SqlitePool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1");
    sqlx::query_as::<_, Post>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_view_by_id(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Option<PostView>, sqlx::Error> {
    let sql = format!("{VIEW_SELECT} WHERE p.id = ?1");
    sqlx::query_as::<_, PostView>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// One window of a feed, newest first
pub async fn list_posts<'e>(
    executor: impl SqliteExecutor<'e>,
    scope: PostScope,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, sqlx::Error> {
    let (filter, value) = scope.filter();
    let sql = format!(
        "{VIEW_SELECT} {filter}
         ORDER BY p.pub_date DESC, p.id DESC
         LIMIT ?2 OFFSET ?3"
    );
    sqlx::query_as::<_, PostView>(&sql)
        .bind(value)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn count_posts<'e>(
    executor: impl SqliteExecutor<'e>,
    scope: PostScope,
) -> Result<i64, sqlx::Error> {
    let (filter, value) = scope.filter();
    let sql = format!("SELECT COUNT(*) FROM posts p {filter}");
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(value)
        .fetch_one(executor)
        .await
}

/// Delete one post; its comments go with it
pub async fn delete_post(pool: &SqlitePool, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all_posts(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts").execute(pool).await?;
    Ok(result.rows_affected())
}
