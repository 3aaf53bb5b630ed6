use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ApiQuery, IdPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{
    CategoryRef, CreateProduct, NameSearch, PriceRange, Product, StockThreshold, UpdateProduct,
};
use crate::repository::{CategoryRepository, ProductRepository};
use crate::service::ProductService;

const TAG: &str = "products";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        get_product,
        create_product,
        update_product,
        delete_product,
        search_by_name,
        search_by_price_range,
        find_low_stock,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, CategoryRef),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product management and search endpoints")
    )
)]
pub struct ProductsApiDoc;

type SharedService<P, C> = State<Arc<ProductService<P, C>>>;

/// Create the product router with all HTTP endpoints
pub fn router<P, C>(service: ProductService<P, C>) -> Router
where
    P: ProductRepository + 'static,
    C: CategoryRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_by_name))
        .route("/price-range", get(search_by_price_range))
        .route("/low-stock", get(find_low_stock))
        .route("/category/{category_id}", post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Create a product under an existing category
#[utoipa::path(
    post,
    path = "/category/{category_id}",
    tag = TAG,
    params(
        ("category_id" = i64, Path, description = "Owning category ID")
    ),
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    IdPath(category_id): IdPath,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create_product(category_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product, optionally moving it to another category
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    IdPath(id): IdPath,
) -> CatalogResult<StatusCode> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search products by name
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(NameSearch),
    responses(
        (status = 200, description = "Products whose name contains the fragment", body = Vec<Product>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_by_name<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    ApiQuery(query): ApiQuery<NameSearch>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.search_by_name(&query.name).await?;
    Ok(Json(products))
}

/// Find products within a price range
#[utoipa::path(
    get,
    path = "/price-range",
    tag = TAG,
    params(PriceRange),
    responses(
        (status = 200, description = "Products priced within [min, max]", body = Vec<Product>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_by_price_range<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    ApiQuery(range): ApiQuery<PriceRange>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.search_by_price_range(range.min, range.max).await?;
    Ok(Json(products))
}

/// Find products running low on stock
#[utoipa::path(
    get,
    path = "/low-stock",
    tag = TAG,
    params(StockThreshold),
    responses(
        (status = 200, description = "Products with quantity below the threshold", body = Vec<Product>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn find_low_stock<P: ProductRepository, C: CategoryRepository>(
    State(service): SharedService<P, C>,
    ApiQuery(query): ApiQuery<StockThreshold>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.find_low_stock(query.threshold).await?;
    Ok(Json(products))
}
