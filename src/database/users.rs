use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

const SELECT_USERS: &str = "SELECT id, username, password_hash, date_joined FROM users";

/// Look up a user by username
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE username = ?", SELECT_USERS))
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Look up a user by primary key
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", SELECT_USERS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<User>, DatabaseError> {
    let users = sqlx::query_as::<_, User>(&format!("{} ORDER BY id", SELECT_USERS))
        .fetch_all(pool)
        .await?;
    Ok(users)
}

/// Insert a user with an already-hashed password
pub async fn create(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash, date_joined) VALUES (?, ?, ?)
         RETURNING id, username, password_hash, date_joined",
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!("Created user '{}' (id {})", user.username, user.id);
    Ok(user)
}

/// Delete a user; posts, comments and follows on both sides cascade
pub async fn delete_by_username(pool: &SqlitePool, username: &str) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM users WHERE username = ?")
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    tracing::info!("Deleted user '{}'", username);
    Ok(())
}
