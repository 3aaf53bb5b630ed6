use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{Category, CreateCategory, UpdateCategory};
use crate::repository::{CategoryRepository, ProductRepository};
use crate::service::CategoryService;

const TAG: &str = "categories";

/// OpenAPI documentation for Categories API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        create_category,
        get_category,
        update_category,
        delete_category,
    ),
    components(
        schemas(Category, CreateCategory, UpdateCategory),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Category management endpoints")
    )
)]
pub struct CategoriesApiDoc;

type SharedService<C, P> = State<Arc<CategoryService<C, P>>>;

/// Create the category router with all HTTP endpoints
pub fn router<C, P>(service: CategoryService<C, P>) -> Router
where
    C: CategoryRepository + 'static,
    P: ProductRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .with_state(shared_service)
}

/// List all categories
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<C: CategoryRepository, P: ProductRepository>(
    State(service): SharedService<C, P>,
) -> CatalogResult<Json<Vec<Category>>> {
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created successfully", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<C: CategoryRepository, P: ProductRepository>(
    State(service): SharedService<C, P>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<C: CategoryRepository, P: ProductRepository>(
    State(service): SharedService<C, P>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<Category>> {
    let category = service.get_category(id).await?;
    Ok(Json(category))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated successfully", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<C: CategoryRepository, P: ProductRepository>(
    State(service): SharedService<C, P>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CatalogResult<Json<Category>> {
    let category = service.update_category(id, input).await?;
    Ok(Json(category))
}

/// Delete a category that no product references
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted successfully"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<C: CategoryRepository, P: ProductRepository>(
    State(service): SharedService<C, P>,
    IdPath(id): IdPath,
) -> CatalogResult<StatusCode> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
