use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::instrument;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CreateProduct, NewProduct, Product, UpdateProduct};
use crate::repository::{CategoryRepository, ProductRepository};

/// Service layer for Product business logic
pub struct ProductService<P: ProductRepository, C: CategoryRepository> {
    products: Arc<P>,
    categories: Arc<C>,
}

impl<P: ProductRepository, C: CategoryRepository> Clone for ProductService<P, C> {
    fn clone(&self) -> Self {
        Self {
            products: Arc::clone(&self.products),
            categories: Arc::clone(&self.categories),
        }
    }
}

impl<P: ProductRepository, C: CategoryRepository> ProductService<P, C> {
    pub fn new(products: P, categories: C) -> Self {
        Self {
            products: Arc::new(products),
            categories: Arc::new(categories),
        }
    }

    async fn resolve_category(&self, id: i64) -> CatalogResult<Category> {
        self.categories
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        self.products.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> CatalogResult<Product> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Nothing is persisted when `category_id` does not exist.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        category_id: i64,
        input: CreateProduct,
    ) -> CatalogResult<Product> {
        input.validate()?;

        let category = self.resolve_category(category_id).await?;
        self.products
            .create(NewProduct::new(category.id, input))
            .await
    }

    /// The target category is resolved before anything is written, so an
    /// unknown `category.id` leaves the stored product as it was.
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i64, input: UpdateProduct) -> CatalogResult<Product> {
        input.validate()?;

        let mut product = self.get_product(id).await?;

        let category = match input.target_category_id() {
            Some(category_id) => Some(self.resolve_category(category_id).await?),
            None => None,
        };

        product.apply_update(input, category);
        self.products.update(product).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> CatalogResult<()> {
        self.get_product(id).await?;

        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(CatalogError::ProductNotFound(id))
        }
    }

    #[instrument(skip(self))]
    pub async fn search_by_name(&self, fragment: &str) -> CatalogResult<Vec<Product>> {
        self.products.search_by_name(fragment).await
    }

    /// An inverted range (`min > max`) is empty and never reaches storage.
    #[instrument(skip(self))]
    pub async fn search_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> CatalogResult<Vec<Product>> {
        if min > max {
            return Ok(Vec::new());
        }
        self.products.find_by_price_range(min, max).await
    }

    #[instrument(skip(self))]
    pub async fn find_low_stock(&self, threshold: i32) -> CatalogResult<Vec<Product>> {
        self.products.find_low_stock(threshold).await
    }
}
