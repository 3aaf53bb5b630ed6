//! Catalog Domain
//!
//! Categories and the products filed under them, with name, price-range and
//! low-stock searches.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (/categories, /products)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← Existence checks, category resolution, delete guard
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Traits + in-memory and PostgreSQL implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Category, Product, request DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers,
//!     repository::InMemoryCatalog,
//!     service::{CategoryService, ProductService},
//! };
//!
//! let store = InMemoryCatalog::new();
//! let categories = CategoryService::new(store.clone(), store.clone());
//! let products = ProductService::new(store.clone(), store);
//!
//! let router = handlers::router(categories, products);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use handlers::{CategoriesApiDoc, ProductsApiDoc};
pub use models::{
    Category, CategoryRef, CreateCategory, CreateProduct, NewProduct, Product, UpdateCategory,
    UpdateProduct,
};
pub use postgres::{PgCategoryRepository, PgProductRepository};
pub use repository::{CategoryRepository, InMemoryCatalog, ProductRepository};
pub use service::{CategoryService, ProductService};
