// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Field name to list of messages, serialized as the 400 response body
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(FieldErrors),

    // 401 Unauthorized
    Unauthorized {
        detail: String,
        code: Option<&'static str>,
    },

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::ValidationError(fields) => fields
                .iter()
                .map(|(field, msgs)| format!("{}: {}", field, msgs.join(" ")))
                .collect::<Vec<_>>()
                .join("; "),
            ApiError::Unauthorized { detail, .. } => detail.clone(),
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError(fields) => json!(fields),
            ApiError::Unauthorized { detail, code: Some(code) } => {
                json!({ "detail": detail, "code": code })
            }
            _ => json!({ "detail": self.message() }),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "parse_error",
            ApiError::ValidationError(_) => "invalid",
            ApiError::Unauthorized { code, .. } => code.unwrap_or("not_authenticated"),
            ApiError::Forbidden(_) => "permission_denied",
            ApiError::NotFound(_) => "not_found",
            ApiError::MethodNotAllowed(_) => "method_not_allowed",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::InternalServerError(_) => "error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(field_errors: FieldErrors) -> Self {
        ApiError::ValidationError(field_errors)
    }

    /// Single-field validation error
    pub fn field_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.into(), vec![message.into()]);
        ApiError::ValidationError(field_errors)
    }

    /// Anonymous caller on an endpoint that needs an identity
    pub fn not_authenticated() -> Self {
        ApiError::Unauthorized {
            detail: "Authentication credentials were not provided.".to_string(),
            code: None,
        }
    }

    pub fn unauthorized(detail: impl Into<String>, code: &'static str) -> Self {
        ApiError::Unauthorized {
            detail: detail.into(),
            code: Some(code),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not found.".to_string())
    }

    pub fn method_not_allowed(method: &str) -> Self {
        ApiError::MethodNotAllowed(format!("Method \"{}\" not allowed.", method))
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        use crate::database::manager::DatabaseError;
        match err {
            DatabaseError::NotFound => ApiError::not_found(),
            DatabaseError::UniqueViolation(field) => {
                ApiError::field_error("non_field_errors", format!("The fields {} must make a unique set.", field))
            }
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("A server error occurred.")
            }
        }
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        use crate::auth::TokenError;
        match err {
            TokenError::Invalid | TokenError::WrongType => {
                ApiError::unauthorized("Token is invalid or expired", "token_not_valid")
            }
            TokenError::InvalidSecret | TokenError::Generation(_) | TokenError::Hashing(_) => {
                tracing::error!("Token provider error: {}", err);
                ApiError::internal_server_error("A server error occurred.")
            }
        }
    }
}

impl From<crate::auth::AuthenticationError> for ApiError {
    fn from(err: crate::auth::AuthenticationError) -> Self {
        use crate::auth::AuthenticationError;
        match err {
            AuthenticationError::InvalidCredentials => ApiError::Unauthorized {
                detail: err.to_string(),
                code: None,
            },
            AuthenticationError::Token(e) => e.into(),
            AuthenticationError::Database(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self.message());
        } else {
            tracing::debug!(code = self.error_code(), status = status.as_u16(), "{}", self.message());
        }
        (status, Json(self.to_json())).into_response()
    }
}
