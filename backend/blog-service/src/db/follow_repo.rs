use crate::models::Follow;
use sqlx::SqlitePool;

/// Insert a follow edge. Returns false when the edge already existed,
/// including when a concurrent request inserted it first.
pub async fn insert_follow(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES (?1, ?2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a follow edge. Returns false when there was nothing to remove.
pub async fn delete_follow(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn follow_exists(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = ?1 AND author_id = ?2)",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn find_follow(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<Option<Follow>, sqlx::Error> {
    sqlx::query_as::<_, Follow>(
        r#"
        SELECT f.id, f.user_id, fu.username AS user_username,
               f.author_id, au.username AS author_username
        FROM follows f
        JOIN users fu ON fu.id = f.user_id
        JOIN users au ON au.id = f.author_id
        WHERE f.user_id = ?1 AND f.author_id = ?2
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
}

pub async fn count_followers(pool: &SqlitePool, author_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE author_id = ?1")
        .bind(author_id)
        .fetch_one(pool)
        .await
}

pub async fn count_following(pool: &SqlitePool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
