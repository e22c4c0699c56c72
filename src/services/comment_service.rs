use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use super::validation::Validator;
use super::{Create, Destroy, List, Resource, Retrieve, Update};
use crate::api::{Fetched, ListParams};
use crate::auth::ensure_owner;
use crate::database::models::comment::SELECT_COMMENTS;
use crate::database::models::Comment;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::Identity;

/// Comments under one post. The scope is the parent post id from the path;
/// a missing parent is a 404 for every operation.
#[derive(Clone, Debug)]
pub struct CommentService {
    pool: SqlitePool,
}

impl CommentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_post(&self, post_id: i64) -> Result<(), ApiError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        found.map(|_| ()).ok_or_else(ApiError::not_found)
    }

    async fn fetch(&self, post_id: i64, id: i64) -> Result<Comment, ApiError> {
        sqlx::query_as::<_, Comment>(&format!("{} WHERE c.post_id = ? AND c.id = ?", SELECT_COMMENTS))
            .bind(post_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(ApiError::not_found)
    }

    fn validate(payload: &Value, partial: bool) -> Result<Option<String>, ApiError> {
        let mut v = Validator::new(payload)?;
        let text = v.text("text", !partial);
        v.finish()?;
        Ok(text)
    }
}

impl Resource for CommentService {
    type Scope = i64;
    type Record = Comment;
}

#[async_trait]
impl List for CommentService {
    async fn list(&self, _identity: &Identity, post_id: i64, _params: ListParams) -> Result<Fetched<Comment>, ApiError> {
        self.ensure_post(post_id).await?;
        let comments = sqlx::query_as::<_, Comment>(&format!("{} WHERE c.post_id = ? ORDER BY c.id", SELECT_COMMENTS))
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(Fetched::All(comments))
    }
}

#[async_trait]
impl Retrieve for CommentService {
    async fn retrieve(&self, _identity: &Identity, post_id: i64, id: i64) -> Result<Comment, ApiError> {
        self.ensure_post(post_id).await?;
        self.fetch(post_id, id).await
    }
}

#[async_trait]
impl Create for CommentService {
    async fn create(&self, identity: &Identity, post_id: i64, payload: Value) -> Result<Comment, ApiError> {
        let author = identity.require()?;
        self.ensure_post(post_id).await?;
        let text = Self::validate(&payload, false)?.unwrap_or_default();

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO comments (text, created, author_id, post_id) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(text)
        .bind(Utc::now())
        .bind(author.id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        tracing::info!("User '{}' commented on post {} (comment {})", author.username, post_id, id);
        self.fetch(post_id, id).await
    }
}

#[async_trait]
impl Update for CommentService {
    async fn update(
        &self,
        identity: &Identity,
        post_id: i64,
        id: i64,
        payload: Value,
        partial: bool,
    ) -> Result<Comment, ApiError> {
        let requester = identity.require()?;
        self.ensure_post(post_id).await?;
        let existing = self.fetch(post_id, id).await?;
        let text = Self::validate(&payload, partial)?;
        ensure_owner(requester, existing.author_id)?;

        if let Some(text) = text {
            sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
                .bind(text)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
            tracing::info!("User '{}' updated comment {}", requester.username, id);
        }
        self.fetch(post_id, id).await
    }
}

#[async_trait]
impl Destroy for CommentService {
    async fn destroy(&self, identity: &Identity, post_id: i64, id: i64) -> Result<(), ApiError> {
        let requester = identity.require()?;
        self.ensure_post(post_id).await?;
        let existing = self.fetch(post_id, id).await?;
        ensure_owner(requester, existing.author_id)?;

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        tracing::info!("User '{}' deleted comment {}", requester.username, id);
        Ok(())
    }
}
