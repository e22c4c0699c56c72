// handlers/jwt.rs - token endpoints under /api/v1/jwt/

use axum::extract::State;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::Payload;
use crate::app::AppState;
use crate::auth::TokenPair;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::validation::Validator;

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/**
 * POST /api/v1/jwt/create/ - exchange credentials for a token pair
 *
 * Input: `{"username": "...", "password": "..."}`
 * Output: `{"refresh": "...", "access": "..."}`
 *
 * Missing fields are a 400 keyed by field; unknown user or wrong password
 * is a 401 with `detail` only.
 */
pub async fn create(State(state): State<AppState>, Payload(payload): Payload) -> ApiResult<TokenPair> {
    let mut v = Validator::new(&payload)?;
    let username = v.text("username", true);
    let password = v.text("password", true);
    v.finish()?;

    let (user, pair) = state
        .tokens
        .authenticate(
            state.db.pool(),
            &username.unwrap_or_default(),
            &password.unwrap_or_default(),
        )
        .await?;

    tracing::info!("Issued tokens for '{}'", user.username);
    Ok(ApiResponse::success(pair))
}

/// POST /api/v1/jwt/refresh/ - `{"refresh": "..."}` to `{"access": "..."}`
pub async fn refresh(State(state): State<AppState>, Payload(payload): Payload) -> ApiResult<AccessToken> {
    let mut v = Validator::new(&payload)?;
    let refresh = v.text("refresh", true);
    v.finish()?;

    let access = state.tokens.refresh(&refresh.unwrap_or_default())?;
    Ok(ApiResponse::success(AccessToken { access }))
}

/// POST /api/v1/jwt/verify/ - `{"token": "..."}`, empty object when valid
pub async fn verify(State(state): State<AppState>, Payload(payload): Payload) -> ApiResult<Value> {
    let mut v = Validator::new(&payload)?;
    let token = v.text("token", true);
    v.finish()?;

    state.tokens.verify(&token.unwrap_or_default())?;
    Ok(ApiResponse::success(json!({})))
}
