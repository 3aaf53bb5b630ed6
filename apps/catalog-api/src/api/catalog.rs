use axum::Router;
use domain_catalog::{
    CategoryService, InMemoryCatalog, PgCategoryRepository, PgProductRepository, ProductService,
    handlers,
};

use crate::state::{AppState, Storage};

/// `/categories` and `/products` over the configured store.
pub fn router(state: &AppState) -> Router {
    match &state.storage {
        Storage::Postgres(db) => handlers::router(
            CategoryService::new(
                PgCategoryRepository::new(db.clone()),
                PgProductRepository::new(db.clone()),
            ),
            ProductService::new(
                PgProductRepository::new(db.clone()),
                PgCategoryRepository::new(db.clone()),
            ),
        ),
        Storage::Memory(store) => memory_router(store),
    }
}

fn memory_router(store: &InMemoryCatalog) -> Router {
    handlers::router(
        CategoryService::new(store.clone(), store.clone()),
        ProductService::new(store.clone(), store.clone()),
    )
}
