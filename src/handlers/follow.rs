// handlers/follow.rs - /api/v1/follow/ (authenticated only)

use axum::extract::{Extension, Query, State};

use crate::api::{Fetched, ListParams, ListQuery, Payload};
use crate::app::AppState;
use crate::database::models::Follow;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::{Create, List};

/// GET /api/v1/follow/?search=<substring>
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Follow>> {
    let params = ListParams { page: None, search: query.search };
    let follows = match state.follows().list(&identity, (), params).await? {
        Fetched::All(follows) | Fetched::Window { results: follows, .. } => follows,
    };
    Ok(ApiResponse::success(follows))
}

/// POST /api/v1/follow/
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Payload(payload): Payload,
) -> ApiResult<Follow> {
    let follow = state.follows().create(&identity, (), payload).await?;
    Ok(ApiResponse::created(follow))
}
