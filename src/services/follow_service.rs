use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;

use super::validation::Validator;
use super::{Create, List, Resource};
use crate::api::{Fetched, ListParams};
use crate::database::models::follow::SELECT_FOLLOWS;
use crate::database::models::Follow;
use crate::database::{users, DatabaseError};
use crate::error::ApiError;
use crate::middleware::Identity;

/// Follow edges of the requester. Every operation needs an identity.
#[derive(Clone, Debug)]
pub struct FollowService {
    pool: SqlitePool,
}

impl FollowService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn already_following(&self, user_id: i64, following_id: i64) -> Result<bool, DatabaseError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM follows WHERE user_id = ? AND following_id = ?")
            .bind(user_id)
            .bind(following_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// The unique constraint still decides concurrent duplicates; its
    /// violation maps to the same 400 as the pre-check in `create`.
    async fn insert(&self, user_id: i64, following_id: i64) -> Result<i64, ApiError> {
        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO follows (user_id, following_id) VALUES (?, ?) RETURNING id")
                .bind(user_id)
                .bind(following_id)
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
        Ok(id)
    }
}

impl Resource for FollowService {
    type Scope = ();
    type Record = Follow;
}

#[async_trait]
impl List for FollowService {
    /// Own follows only. `search` is a case-sensitive substring match on the
    /// followed username.
    async fn list(&self, identity: &Identity, _scope: (), params: ListParams) -> Result<Fetched<Follow>, ApiError> {
        let user = identity.require()?;

        let follows = match params.search.as_deref().filter(|s| !s.is_empty()) {
            Some(term) => {
                sqlx::query_as::<_, Follow>(&format!(
                    "{} WHERE f.user_id = ? AND instr(t.username, ?) > 0 ORDER BY f.id",
                    SELECT_FOLLOWS
                ))
                .bind(user.id)
                .bind(term)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Follow>(&format!("{} WHERE f.user_id = ? ORDER BY f.id", SELECT_FOLLOWS))
                    .bind(user.id)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(DatabaseError::from)?;

        Ok(Fetched::All(follows))
    }
}

#[async_trait]
impl Create for FollowService {
    async fn create(&self, identity: &Identity, _scope: (), payload: Value) -> Result<Follow, ApiError> {
        let user = identity.require()?;

        let mut v = Validator::new(&payload)?;
        let following = v.text("following", true);
        v.finish()?;
        let following = following.unwrap_or_default();

        let target = users::find_by_username(&self.pool, &following).await?.ok_or_else(|| {
            ApiError::field_error("following", format!("Object with username={} does not exist.", following))
        })?;

        if self.already_following(user.id, target.id).await? {
            return Err(ApiError::field_error(
                "non_field_errors",
                "The fields user, following must make a unique set.",
            ));
        }

        if target.id == user.id {
            return Err(ApiError::field_error("following", "You cannot follow yourself."));
        }

        let id = self.insert(user.id, target.id).await?;
        tracing::info!("User '{}' now follows '{}'", user.username, target.username);
        Ok(Follow { id, user: user.username.clone(), following: target.username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{db, user};
    use serde_json::json;

    fn names(fetched: Fetched<Follow>) -> Vec<String> {
        match fetched {
            Fetched::All(follows) => follows.into_iter().map(|f| f.following).collect(),
            other => panic!("follows are never paginated: {:?}", other),
        }
    }

    #[tokio::test]
    async fn anonymous_is_unauthorized() {
        let db = db().await;
        let service = FollowService::new(db.pool().clone());
        let anon = Identity::anonymous();

        assert_eq!(service.list(&anon, (), ListParams::default()).await.unwrap_err().status_code(), 401);
        let err = service.create(&anon, (), json!({ "following": "x" })).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn follow_then_duplicate_then_self() {
        let db = db().await;
        let service = FollowService::new(db.pool().clone());
        let u1 = user(&db, "u1").await;
        user(&db, "u2").await;

        let follow = service.create(&u1, (), json!({ "following": "u2", "user": "u2" })).await.unwrap();
        assert_eq!(serde_json::to_value(&follow).unwrap(), json!({ "user": "u1", "following": "u2" }));

        let err = service.create(&u1, (), json!({ "following": "u2" })).await.unwrap_err();
        assert_eq!(
            err.to_json(),
            json!({ "non_field_errors": ["The fields user, following must make a unique set."] })
        );

        let err = service.create(&u1, (), json!({ "following": "u1" })).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_json().get("following").is_some());

        assert_eq!(names(service.list(&u1, (), ListParams::default()).await.unwrap()), vec!["u2"]);
    }

    #[tokio::test]
    async fn missing_or_unknown_target_is_rejected() {
        let db = db().await;
        let service = FollowService::new(db.pool().clone());
        let u1 = user(&db, "u1").await;

        let err = service.create(&u1, (), json!({})).await.unwrap_err();
        assert_eq!(err.to_json(), json!({ "following": ["This field is required."] }));

        let err = service.create(&u1, (), json!({ "following": "ghost" })).await.unwrap_err();
        assert_eq!(err.to_json(), json!({ "following": ["Object with username=ghost does not exist."] }));
    }

    #[tokio::test]
    async fn list_is_own_follows_with_case_sensitive_search() {
        let db = db().await;
        let service = FollowService::new(db.pool().clone());
        let u1 = user(&db, "u1").await;
        let u2 = user(&db, "u2").await;
        user(&db, "TheCat").await;
        user(&db, "catfish").await;
        user(&db, "dog").await;

        for target in ["TheCat", "catfish", "dog"] {
            service.create(&u1, (), json!({ "following": target })).await.unwrap();
        }
        service.create(&u2, (), json!({ "following": "dog" })).await.unwrap();

        let all = names(service.list(&u1, (), ListParams::default()).await.unwrap());
        assert_eq!(all, vec!["TheCat", "catfish", "dog"]);

        let params = ListParams { page: None, search: Some("cat".into()) };
        assert_eq!(names(service.list(&u1, (), params).await.unwrap()), vec!["catfish"]);

        assert_eq!(names(service.list(&u2, (), ListParams::default()).await.unwrap()), vec!["dog"]);
    }

    #[tokio::test]
    async fn racing_duplicate_loses_with_400() {
        let db = db().await;
        let service = FollowService::new(db.pool().clone());
        let u1 = user(&db, "u1").await;
        let u2 = user(&db, "u2").await;
        let (u1_id, u2_id) = (u1.require().unwrap().id, u2.require().unwrap().id);

        // A concurrent request that already passed the pre-check reaches the insert
        service.insert(u1_id, u2_id).await.unwrap();
        let err = service.insert(u1_id, u2_id).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_json(),
            json!({ "non_field_errors": ["The fields user, following must make a unique set."] })
        );

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows").fetch_one(db.pool()).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn unique_violation_names_both_columns() {
        let db = db().await;
        let u1 = user(&db, "u1").await.require().unwrap().id;
        let u2 = user(&db, "u2").await.require().unwrap().id;
        let insert = "INSERT INTO follows (user_id, following_id) VALUES (?, ?)";
        sqlx::query(insert).bind(u1).bind(u2).execute(db.pool()).await.unwrap();
        let err = sqlx::query(insert).bind(u1).bind(u2).execute(db.pool()).await.unwrap_err();

        match DatabaseError::from(err) {
            DatabaseError::UniqueViolation(cols) => assert_eq!(cols, "user, following"),
            other => panic!("expected unique violation, got {:?}", other),
        }
    }
}
