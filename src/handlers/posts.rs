// handlers/posts.rs - /api/v1/posts/ and /api/v1/posts/:post_id/

use axum::extract::{Extension, Query, State};

use crate::api::{IdPath, ListParams, ListQuery, Listing, PageRequest, Payload, RequestUrl};
use crate::app::AppState;
use crate::database::models::Post;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::services::{Create, Destroy, List, Retrieve, Update};

/// GET /api/v1/posts/ - all posts, paginated when `limit` is given
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
    RequestUrl(url): RequestUrl,
) -> ApiResult<Listing<Post>> {
    let params = ListParams {
        page: PageRequest::from_query(&query, state.config.pagination.max_limit),
        search: None,
    };
    let fetched = state.posts().list(&identity, (), params).await?;
    Ok(ApiResponse::success(fetched.shape(&url)))
}

/// POST /api/v1/posts/
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Payload(payload): Payload,
) -> ApiResult<Post> {
    let post = state.posts().create(&identity, (), payload).await?;
    Ok(ApiResponse::created(post))
}

/// GET /api/v1/posts/:post_id/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath(id): IdPath<i64>,
) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.posts().retrieve(&identity, (), id).await?))
}

/// PUT /api/v1/posts/:post_id/
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath(id): IdPath<i64>,
    Payload(payload): Payload,
) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.posts().update(&identity, (), id, payload, false).await?))
}

/// PATCH /api/v1/posts/:post_id/
pub async fn partial_update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath(id): IdPath<i64>,
    Payload(payload): Payload,
) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.posts().update(&identity, (), id, payload, true).await?))
}

/// DELETE /api/v1/posts/:post_id/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    IdPath(id): IdPath<i64>,
) -> ApiResult<()> {
    state.posts().destroy(&identity, (), id).await?;
    Ok(ApiResponse::no_content())
}
