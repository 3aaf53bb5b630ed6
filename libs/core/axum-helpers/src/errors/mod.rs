pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every non-validation error response.
///
/// ```json
/// { "message": "Category not found with id: 7" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of a 400 caused by field validation: one message per offending field.
///
/// ```json
/// { "name": "Category name is required", "price": "Price must not be negative" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({"name": "Category name is required"}))]
pub struct ValidationErrorResponse(pub BTreeMap<String, String>);

impl From<&ValidationErrors> for ValidationErrorResponse {
    fn from(errors: &ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errors)| {
                errors.first().map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value ({})", error.code));
                    (field.to_string(), message)
                })
            })
            .collect();

        Self(fields)
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain crates convert their own errors into this type; each variant maps to
/// exactly one status code and is logged with its [`ErrorCode`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Path extraction error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Query extraction error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(_)
            | AppError::PathRejection(_)
            | AppError::QueryRejection(_)
            | AppError::ValidationError(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::JsonExtractorRejection(_) => ErrorCode::InvalidJson,
            AppError::PathRejection(_) => ErrorCode::InvalidPath,
            AppError::QueryRejection(_) => ErrorCode::InvalidQuery,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), error = %self, "Request failed");
        } else {
            tracing::info!(error_code = code.code(), error = %self, "Request rejected");
        }

        match self {
            AppError::ValidationError(errors) => {
                (status, Json(ValidationErrorResponse::from(&errors))).into_response()
            }
            AppError::JsonExtractorRejection(rejection) => {
                (status, Json(ErrorResponse::new(rejection.body_text()))).into_response()
            }
            AppError::PathRejection(rejection) => {
                (status, Json(ErrorResponse::new(rejection.body_text()))).into_response()
            }
            AppError::QueryRejection(rejection) => {
                (status, Json(ErrorResponse::new(rejection.body_text()))).into_response()
            }
            // 5xx bodies carry the raw message as well.
            AppError::BadRequest(message)
            | AppError::NotFound(message)
            | AppError::Conflict(message)
            | AppError::InternalServerError(message) => {
                (status, Json(ErrorResponse::new(message))).into_response()
            }
        }
    }
}

/// Build a `{ "message": ... }` response with an explicit status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use validator::Validate;

    #[derive(Validate)]
    struct Draft {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 0))]
        quantity: i32,
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404_with_message() {
        let response = AppError::NotFound("Product not found with id: 3".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Product not found with id: 3"})
        );
    }

    #[tokio::test]
    async fn test_validation_errors_are_flattened_per_field() {
        let errors = Draft {
            name: String::new(),
            quantity: -1,
        }
        .validate()
        .unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["name"], "Name is required");
        assert_eq!(body["quantity"], "invalid value (range)");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_keeps_raw_message() {
        let response =
            AppError::InternalServerError("Database error: pool timed out".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Database error: pool timed out"})
        );
    }

    #[test]
    fn test_status_and_code_mapping() {
        let conflict = AppError::Conflict("in use".into());
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(conflict.error_code(), ErrorCode::Conflict);

        let bad = AppError::BadRequest("Invalid id: abc".into());
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }
}
