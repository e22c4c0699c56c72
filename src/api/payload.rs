use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form,
};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Request body accepted by write endpoints. JSON and urlencoded forms are
/// both accepted; an empty body reads as an empty object so that missing
/// fields surface as field-keyed validation errors rather than a parse error.
#[derive(Debug, Clone)]
pub struct Payload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| body_rejection(e.status(), e.body_text()))?;
            let object: Map<String, Value> = fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
            return Ok(Payload(Value::Object(object)));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| body_rejection(e.status(), e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload(Value::Object(Map::new())));
        }

        serde_json::from_slice(&bytes)
            .map(Payload)
            .map_err(|e| ApiError::bad_request(format!("JSON parse error - {}", e)))
    }
}

/// Oversized bodies keep their 413; every other read failure is a 400
fn body_rejection(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(text)
    } else {
        ApiError::bad_request(text)
    }
}
