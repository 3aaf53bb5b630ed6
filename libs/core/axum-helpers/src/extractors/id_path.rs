//! Numeric id path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Extractor for a single `i64` path parameter.
///
/// ```ignore
/// async fn get_category(IdPath(id): IdPath) -> String {
///     format!("Category {id}")
/// }
///
/// let app = Router::new().route("/categories/{id}", get(get_category));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;

        raw.parse::<i64>()
            .map(IdPath)
            .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
    }
}
