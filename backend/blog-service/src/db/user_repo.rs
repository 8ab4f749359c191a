use crate::models::User;
use chrono::Utc;
use sqlx::SqlitePool;

/// Mirror an account issued by the auth service
pub async fn create_user(pool: &SqlitePool, username: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, date_joined)
        VALUES (?1, ?2)
        RETURNING id, username, date_joined
        "#,
    )
    .bind(username)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, date_joined FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, username, date_joined FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Delete an account; posts, comments and follow edges go with it
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
