// handlers/groups.rs - /api/v1/groups/ (read-only; other methods get 405)

use axum::extract::{Extension, State};

use crate::api::{Fetched, IdPath, ListParams};
use crate::app::AppState;
use crate::database::models::Group;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::{List, Retrieve};

/// GET /api/v1/groups/
pub async fn list(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<Vec<Group>> {
    let groups = match state.groups().list(&identity, (), ListParams::default()).await? {
        Fetched::All(groups) | Fetched::Window { results: groups, .. } => groups,
    };
    Ok(ApiResponse::success(groups))
}

/// GET /api/v1/groups/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath(id): IdPath<i64>,
) -> ApiResult<Group> {
    Ok(ApiResponse::success(state.groups().retrieve(&identity, (), id).await?))
}
