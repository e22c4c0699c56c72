use axum::{
    async_trait,
    extract::{FromRequestParts, Host, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;

/// Numeric path segments. A segment that does not parse matches no resource,
/// so it is a 404 rather than a 400.
#[derive(Debug)]
pub struct IdPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(IdPath(value)),
            Err(rejection) => {
                tracing::debug!("Unroutable path {}: {}", parts.uri.path(), rejection.body_text());
                Err(ApiError::not_found())
            }
        }
    }
}

/// Absolute URL of the current request, used to build pagination links
#[derive(Debug, Clone)]
pub struct RequestUrl(pub Url);

#[async_trait]
impl<S> FromRequestParts<S> for RequestUrl
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Host(host) = Host::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Request has no Host header"))?;

        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("http");
        let path_and_query = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        let url = Url::parse(&format!("{}://{}{}", scheme, host, path_and_query))
            .map_err(|e| ApiError::bad_request(format!("Invalid request URL: {}", e)))?;
        Ok(RequestUrl(url))
    }
}
