use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category not found with id: {0}")]
    CategoryNotFound(i64),

    #[error("Product not found with id: {0}")]
    ProductNotFound(i64),

    #[error("Category {id} is still referenced by {products} product(s)")]
    CategoryInUse { id: i64, products: u64 },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        CatalogError::Database(err.to_string())
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::CategoryNotFound(_) | CatalogError::ProductNotFound(_) => {
                AppError::NotFound(message)
            }
            CatalogError::CategoryInUse { .. } => AppError::Conflict(message),
            CatalogError::Validation(errors) => AppError::ValidationError(errors),
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                AppError::InternalServerError(message)
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
