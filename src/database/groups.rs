use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::Group;

// Groups have no write path over HTTP; these are used by the admin CLI and tests.

pub async fn list(pool: &SqlitePool) -> Result<Vec<Group>, DatabaseError> {
    let groups = sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM groups ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(groups)
}

pub async fn create(pool: &SqlitePool, title: &str, slug: &str, description: &str) -> Result<Group, DatabaseError> {
    let group = sqlx::query_as::<_, Group>(
        "INSERT INTO groups (title, slug, description) VALUES (?, ?, ?)
         RETURNING id, title, slug, description",
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created group '{}' (id {})", group.slug, group.id);
    Ok(group)
}

/// Delete a group by slug; posts in it keep living with `group` set to null
pub async fn delete_by_slug(pool: &SqlitePool, slug: &str) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM groups WHERE slug = ?")
        .bind(slug)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    tracing::info!("Deleted group '{}'", slug);
    Ok(())
}
