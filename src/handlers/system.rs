// handlers/system.rs - service banner and liveness

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Json}};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service name, version and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Yatube API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "posts": "/api/v1/posts/[:id/]",
            "comments": "/api/v1/posts/:post_id/comments/[:id/]",
            "groups": "/api/v1/groups/[:id/] (read-only)",
            "follow": "/api/v1/follow/ (authenticated)",
            "jwt": "/api/v1/jwt/create/, /api/v1/jwt/refresh/, /api/v1/jwt/verify/",
        }
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "database": "unavailable" })),
            )
        }
    }
}
