use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::database::users;
use crate::error::ApiError;

const AUTH_HEADER_TYPE: &str = "Bearer";

/// Authenticated requester resolved from an access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Resolved identity for one request, anonymous when no bearer credential
/// was sent. Handlers pass it explicitly into every service operation.
#[derive(Clone, Debug, Default)]
pub struct Identity(Option<AuthUser>);

impl Identity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(user: AuthUser) -> Self {
        Self(Some(user))
    }

    /// The authenticated user, or 401 for anonymous callers
    pub fn require(&self) -> Result<&AuthUser, ApiError> {
        self.0.as_ref().ok_or_else(ApiError::not_authenticated)
    }
}

/// JWT authentication middleware. Missing or non-Bearer credentials leave the
/// request anonymous; a Bearer credential that does not resolve to a live
/// user rejects the request with 401 regardless of endpoint.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match extract_jwt_from_headers(request.headers())? {
        None => Identity::anonymous(),
        Some(token) => Identity::user(resolve_user(&state, &token).await?),
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header.to_str().map_err(|_| {
        ApiError::unauthorized("Authorization header contains invalid characters", "bad_authorization_header")
    })?;

    let mut parts = value.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme == AUTH_HEADER_TYPE => {}
        // Some other scheme; not ours to judge
        _ => return Ok(None),
    }

    match (parts.next(), parts.next()) {
        (Some(token), None) => Ok(Some(token.to_string())),
        _ => Err(ApiError::unauthorized(
            "Authorization header must contain two space-delimited values",
            "bad_authorization_header",
        )),
    }
}

async fn resolve_user(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = state.tokens.decode_access(token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Given token not valid for any token type", "token_not_valid")
    })?;

    let user = users::find_by_id(state.db.pool(), claims.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Bearer token for missing user id {}", claims.user_id);
            ApiError::unauthorized("User not found", "user_not_found")
        })?;

    tracing::debug!("Authenticated request as '{}'", user.username);
    Ok(AuthUser { id: user.id, username: user.username })
}
