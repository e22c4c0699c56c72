// handlers/comments.rs - /api/v1/posts/:post_id/comments/[:id/]

use axum::extract::{Extension, State};

use crate::api::{Fetched, IdPath, ListParams, Payload};
use crate::app::AppState;
use crate::database::models::Comment;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::{Create, Destroy, List, Retrieve, Update};

/// GET /api/v1/posts/:post_id/comments/
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath(post_id): IdPath<i64>,
) -> ApiResult<Vec<Comment>> {
    let comments = match state.comments().list(&identity, post_id, ListParams::default()).await? {
        Fetched::All(comments) | Fetched::Window { results: comments, .. } => comments,
    };
    Ok(ApiResponse::success(comments))
}

/// POST /api/v1/posts/:post_id/comments/
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath(post_id): IdPath<i64>,
    Payload(payload): Payload,
) -> ApiResult<Comment> {
    let comment = state.comments().create(&identity, post_id, payload).await?;
    Ok(ApiResponse::created(comment))
}

/// GET /api/v1/posts/:post_id/comments/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath((post_id, id)): IdPath<(i64, i64)>,
) -> ApiResult<Comment> {
    Ok(ApiResponse::success(state.comments().retrieve(&identity, post_id, id).await?))
}

/// PUT /api/v1/posts/:post_id/comments/:id/
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath((post_id, id)): IdPath<(i64, i64)>,
    Payload(payload): Payload,
) -> ApiResult<Comment> {
    let comment = state.comments().update(&identity, post_id, id, payload, false).await?;
    Ok(ApiResponse::success(comment))
}

/// PATCH /api/v1/posts/:post_id/comments/:id/
pub async fn partial_update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath((post_id, id)): IdPath<(i64, i64)>,
    Payload(payload): Payload,
) -> ApiResult<Comment> {
    let comment = state.comments().update(&identity, post_id, id, payload, true).await?;
    Ok(ApiResponse::success(comment))
}

/// DELETE /api/v1/posts/:post_id/comments/:id/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath((post_id, id)): IdPath<(i64, i64)>,
) -> ApiResult<()> {
    state.comments().destroy(&identity, post_id, id).await?;
    Ok(ApiResponse::no_content())
}
