//! Query-string extractor that reports failures as `400 {"message": ...}`.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// Like [`axum::extract::Query`], but a missing or unparsable parameter is an
/// [`AppError::QueryRejection`] instead of axum's plain-text rejection.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Threshold {
        threshold: i32,
    }

    async fn handler(ApiQuery(q): ApiQuery<Threshold>) -> String {
        q.threshold.to_string()
    }

    async fn status_of(uri: &str) -> StatusCode {
        Router::new()
            .route("/low", get(handler))
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_valid_query() {
        assert_eq!(status_of("/low?threshold=5").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_or_invalid_parameter_is_bad_request() {
        assert_eq!(status_of("/low").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of("/low?threshold=many").await, StatusCode::BAD_REQUEST);
    }
}
