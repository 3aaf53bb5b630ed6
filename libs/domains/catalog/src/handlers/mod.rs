//! HTTP handlers, one module per resource.

pub mod categories;
pub mod products;

use axum::Router;

use crate::repository::{CategoryRepository, ProductRepository};
use crate::service::{CategoryService, ProductService};

pub use categories::CategoriesApiDoc;
pub use products::ProductsApiDoc;

/// Both resource routers under `/categories` and `/products`.
pub fn router<C, P>(
    category_service: CategoryService<C, P>,
    product_service: ProductService<P, C>,
) -> Router
where
    C: CategoryRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .nest("/categories", categories::router(category_service))
        .nest("/products", products::router(product_service))
}
