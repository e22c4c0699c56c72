use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use super::validation::Validator;
use super::{Create, Destroy, List, Resource, Retrieve, Update};
use crate::api::{Fetched, ListParams};
use crate::auth::ensure_owner;
use crate::database::models::post::SELECT_POSTS;
use crate::database::models::Post;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::Identity;

/// Posts: public reads, authenticated create, owner-only update and delete
#[derive(Clone, Debug)]
pub struct PostService {
    pool: SqlitePool,
}

/// Writable fields after validation. `None` means "not supplied".
#[derive(Debug, Default)]
struct PostChanges {
    text: Option<String>,
    image: Option<Option<String>>,
    group: Option<Option<i64>>,
}

impl PostService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find(&self, id: i64) -> Result<Option<Post>, DatabaseError> {
        let post = sqlx::query_as::<_, Post>(&format!("{} WHERE p.id = ?", SELECT_POSTS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn fetch(&self, id: i64) -> Result<Post, ApiError> {
        self.find(id).await?.ok_or_else(ApiError::not_found)
    }

    async fn group_exists(&self, id: i64) -> Result<bool, DatabaseError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Validate the writable fields. Full writes need `text`; everything else
    /// is optional and client-supplied read-only fields are ignored.
    async fn validate(&self, payload: &Value, partial: bool) -> Result<PostChanges, ApiError> {
        let mut v = Validator::new(payload)?;
        let changes = PostChanges {
            text: v.text("text", !partial),
            image: v.nullable_string("image"),
            group: v.nullable_pk("group"),
        };

        if let Some(Some(group_id)) = changes.group {
            if !self.group_exists(group_id).await? {
                v.error("group", format!("Invalid pk \"{}\" - object does not exist.", group_id));
            }
        }

        v.finish()?;
        Ok(changes)
    }
}

impl Resource for PostService {
    type Scope = ();
    type Record = Post;
}

#[async_trait]
impl List for PostService {
    async fn list(&self, _identity: &Identity, _scope: (), params: ListParams) -> Result<Fetched<Post>, ApiError> {
        let Some(page) = params.page else {
            let posts = sqlx::query_as::<_, Post>(&format!("{} ORDER BY p.id", SELECT_POSTS))
                .fetch_all(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
            return Ok(Fetched::All(posts));
        };

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let results = sqlx::query_as::<_, Post>(&format!("{} ORDER BY p.id LIMIT ? OFFSET ?", SELECT_POSTS))
            .bind(i64::try_from(page.limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(Fetched::Window { page, count: count.max(0) as u64, results })
    }
}

#[async_trait]
impl Retrieve for PostService {
    async fn retrieve(&self, _identity: &Identity, _scope: (), id: i64) -> Result<Post, ApiError> {
        self.fetch(id).await
    }
}

#[async_trait]
impl Create for PostService {
    async fn create(&self, identity: &Identity, _scope: (), payload: Value) -> Result<Post, ApiError> {
        let author = identity.require()?;
        let changes = self.validate(&payload, false).await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO posts (text, pub_date, author_id, image, group_id) VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(changes.text.unwrap_or_default())
        .bind(Utc::now())
        .bind(author.id)
        .bind(changes.image.flatten())
        .bind(changes.group.flatten())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        tracing::info!("User '{}' created post {}", author.username, id);
        self.fetch(id).await
    }
}

#[async_trait]
impl Update for PostService {
    async fn update(
        &self,
        identity: &Identity,
        _scope: (),
        id: i64,
        payload: Value,
        partial: bool,
    ) -> Result<Post, ApiError> {
        let requester = identity.require()?;
        let existing = self.fetch(id).await?;
        let changes = self.validate(&payload, partial).await?;
        ensure_owner(requester, existing.author_id)?;

        sqlx::query("UPDATE posts SET text = ?, image = ?, group_id = ? WHERE id = ?")
            .bind(changes.text.unwrap_or(existing.text))
            .bind(changes.image.unwrap_or(existing.image))
            .bind(changes.group.unwrap_or(existing.group))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        tracing::info!("User '{}' updated post {}", requester.username, id);
        self.fetch(id).await
    }
}

#[async_trait]
impl Destroy for PostService {
    async fn destroy(&self, identity: &Identity, _scope: (), id: i64) -> Result<(), ApiError> {
        let requester = identity.require()?;
        let existing = self.fetch(id).await?;
        ensure_owner(requester, existing.author_id)?;

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        tracing::info!("User '{}' deleted post {}", requester.username, id);
        Ok(())
    }
}
