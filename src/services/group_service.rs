use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{List, Resource, Retrieve};
use crate::api::{Fetched, ListParams};
use crate::database::models::Group;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::Identity;

const SELECT_GROUPS: &str = "SELECT id, title, slug, description FROM groups";

/// Groups are read-only over HTTP: only `List` and `Retrieve` are implemented
#[derive(Clone, Debug)]
pub struct GroupService {
    pool: SqlitePool,
}

impl GroupService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl Resource for GroupService {
    type Scope = ();
    type Record = Group;
}

#[async_trait]
impl List for GroupService {
    async fn list(&self, _identity: &Identity, _scope: (), _params: ListParams) -> Result<Fetched<Group>, ApiError> {
        let groups = sqlx::query_as::<_, Group>(&format!("{} ORDER BY id", SELECT_GROUPS))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(Fetched::All(groups))
    }
}

#[async_trait]
impl Retrieve for GroupService {
    async fn retrieve(&self, _identity: &Identity, _scope: (), id: i64) -> Result<Group, ApiError> {
        sqlx::query_as::<_, Group>(&format!("{} WHERE id = ?", SELECT_GROUPS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(ApiError::not_found)
    }
}
