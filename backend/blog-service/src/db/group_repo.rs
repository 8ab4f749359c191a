use crate::models::Group;
use sqlx::SqlitePool;

pub async fn create_group(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<Group, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO post_groups (title, slug, description)
        VALUES (?1, ?2, ?3)
        RETURNING id, title, slug, description
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, group_id: i64) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE id = ?1",
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE slug = ?1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// All groups, alphabetical, for the post form's group choices
pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
    )
    .fetch_all(pool)
    .await
}

/// Delete a group; its posts stay, detached
pub async fn delete_group(pool: &SqlitePool, group_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM post_groups WHERE id = ?1")
        .bind(group_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
