//! Reusable OpenAPI response types for the error bodies.

use super::{ErrorResponse, ValidationErrorResponse};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({"message": "Category not found with id: 42"})
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - field validation failed",
    content_type = "application/json",
    example = json!({"name": "Product name is required", "price": "Price must not be negative"})
)]
pub struct BadRequestValidationResponse(pub ValidationErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - malformed body, path or query",
    content_type = "application/json",
    example = json!({"message": "Invalid id: abc"})
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict with the current state of the resource",
    content_type = "application/json",
    example = json!({"message": "Category 1 is still referenced by 3 product(s)"})
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({"message": "Database error: connection refused"})
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
