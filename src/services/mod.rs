//! Resource services. Each resource implements only the capabilities it
//! exposes over HTTP; handlers call them with the request's `Identity`.

pub mod comment_service;
pub mod follow_service;
pub mod group_service;
pub mod post_service;
pub mod validation;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{Fetched, ListParams};
use crate::error::ApiError;
use crate::middleware::Identity;

pub use comment_service::CommentService;
pub use follow_service::FollowService;
pub use group_service::GroupService;
pub use post_service::PostService;

/// A resource family. `Scope` identifies the parent collection (`()` for
/// top-level resources, the post id for comments).
pub trait Resource: Send + Sync {
    type Scope: Copy + Send + Sync + 'static;
    type Record: serde::Serialize + Send;
}

#[async_trait]
pub trait List: Resource {
    async fn list(
        &self,
        identity: &Identity,
        scope: Self::Scope,
        params: ListParams,
    ) -> Result<Fetched<Self::Record>, ApiError>;
}

#[async_trait]
pub trait Retrieve: Resource {
    async fn retrieve(&self, identity: &Identity, scope: Self::Scope, id: i64) -> Result<Self::Record, ApiError>;
}

#[async_trait]
pub trait Create: Resource {
    async fn create(&self, identity: &Identity, scope: Self::Scope, payload: Value) -> Result<Self::Record, ApiError>;
}

#[async_trait]
pub trait Update: Resource {
    /// `partial` is true for PATCH: absent fields keep their stored value
    async fn update(
        &self,
        identity: &Identity,
        scope: Self::Scope,
        id: i64,
        payload: Value,
        partial: bool,
    ) -> Result<Self::Record, ApiError>;
}

#[async_trait]
pub trait Destroy: Resource {
    async fn destroy(&self, identity: &Identity, scope: Self::Scope, id: i64) -> Result<(), ApiError>;
}
