use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CreateCategory, NewProduct, Product};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, input: CreateCategory) -> CatalogResult<Category>;

    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<Category>>;

    /// All categories ordered by id.
    async fn list(&self) -> CatalogResult<Vec<Category>>;

    /// Persist the name of an existing category and bump `updated_at`.
    async fn update(&self, category: Category) -> CatalogResult<Category>;

    /// Returns `false` when no row had that id.
    async fn delete(&self, id: i64) -> CatalogResult<bool>;
}

/// Repository trait for Product persistence
///
/// Every returned [`Product`] carries its category.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: NewProduct) -> CatalogResult<Product>;

    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<Product>>;

    /// All products ordered by id.
    async fn list(&self) -> CatalogResult<Vec<Product>>;

    /// Persist every mutable field, including `category.id`, and bump `updated_at`.
    async fn update(&self, product: Product) -> CatalogResult<Product>;

    async fn delete(&self, id: i64) -> CatalogResult<bool>;

    async fn count_by_category(&self, category_id: i64) -> CatalogResult<u64>;

    /// Case-insensitive substring match; `%`, `_` and `\` are literal.
    async fn search_by_name(&self, fragment: &str) -> CatalogResult<Vec<Product>>;

    /// Inclusive on both ends.
    async fn find_by_price_range(&self, min: Decimal, max: Decimal)
    -> CatalogResult<Vec<Product>>;

    /// Products with `quantity < threshold`.
    async fn find_low_stock(&self, threshold: i32) -> CatalogResult<Vec<Product>>;
}

#[derive(Debug, Clone)]
struct ProductRecord {
    id: i64,
    name: String,
    description: Option<String>,
    price: Decimal,
    quantity: i32,
    category_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, ProductRecord>,
    last_category_id: i64,
    last_product_id: i64,
}

impl Tables {
    fn join(&self, record: &ProductRecord) -> CatalogResult<Product> {
        let category = self
            .categories
            .get(&record.category_id)
            .cloned()
            .ok_or_else(|| {
                CatalogError::Internal(format!(
                    "Product {} references missing category {}",
                    record.id, record.category_id
                ))
            })?;

        Ok(Product {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            price: record.price,
            quantity: record.quantity,
            category,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    fn select<F>(&self, predicate: F) -> CatalogResult<Vec<Product>>
    where
        F: Fn(&ProductRecord) -> bool,
    {
        self.products
            .values()
            .filter(|record| predicate(record))
            .map(|record| self.join(record))
            .collect()
    }

    fn category_in_use(&self, category_id: i64) -> u64 {
        self.products
            .values()
            .filter(|p| p.category_id == category_id)
            .count() as u64
    }
}

/// In-memory store implementing both repositories (for development/testing).
///
/// Clones share the same tables, so one value can back both services. Ids
/// start at 1 and are never reused; deleting a referenced category is
/// refused the way the `ON DELETE RESTRICT` foreign key refuses it.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalog {
    async fn create(&self, input: CreateCategory) -> CatalogResult<Category> {
        let mut tables = self.tables.write().await;
        tables.last_category_id += 1;

        let now = Utc::now();
        let category = Category {
            id: tables.last_category_id,
            name: input.name,
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());

        tracing::info!(category_id = category.id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.get(&id).cloned())
    }

    async fn list(&self) -> CatalogResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().cloned().collect())
    }

    async fn update(&self, mut category: Category) -> CatalogResult<Category> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .categories
            .get_mut(&category.id)
            .ok_or(CatalogError::CategoryNotFound(category.id))?;

        category.created_at = stored.created_at;
        category.updated_at = Utc::now();
        *stored = category.clone();

        tracing::info!(category_id = category.id, "Updated category");
        Ok(category)
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let mut tables = self.tables.write().await;

        let products = tables.category_in_use(id);
        if products > 0 {
            return Err(CatalogError::CategoryInUse { id, products });
        }

        let removed = tables.categories.remove(&id).is_some();
        if removed {
            tracing::info!(category_id = id, "Deleted category");
        }
        Ok(removed)
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn create(&self, input: NewProduct) -> CatalogResult<Product> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&input.category_id) {
            return Err(CatalogError::CategoryNotFound(input.category_id));
        }

        tables.last_product_id += 1;
        let now = Utc::now();
        let record = ProductRecord {
            id: tables.last_product_id,
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        };
        let product = tables.join(&record)?;
        tables.products.insert(record.id, record);

        tracing::info!(
            product_id = product.id,
            category_id = product.category.id,
            "Created product"
        );
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<Product>> {
        let tables = self.tables.read().await;
        tables
            .products
            .get(&id)
            .map(|record| tables.join(record))
            .transpose()
    }

    async fn list(&self) -> CatalogResult<Vec<Product>> {
        self.tables.read().await.select(|_| true)
    }

    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&product.category.id) {
            return Err(CatalogError::CategoryNotFound(product.category.id));
        }

        let record = tables
            .products
            .get_mut(&product.id)
            .ok_or(CatalogError::ProductNotFound(product.id))?;

        record.name = product.name;
        record.description = product.description;
        record.price = product.price;
        record.quantity = product.quantity;
        record.category_id = product.category.id;
        record.updated_at = Utc::now();

        let record = record.clone();
        let updated = tables.join(&record)?;

        tracing::info!(product_id = updated.id, "Updated product");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let removed = self.tables.write().await.products.remove(&id).is_some();
        if removed {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(removed)
    }

    async fn count_by_category(&self, category_id: i64) -> CatalogResult<u64> {
        Ok(self.tables.read().await.category_in_use(category_id))
    }

    async fn search_by_name(&self, fragment: &str) -> CatalogResult<Vec<Product>> {
        let needle = fragment.to_lowercase();
        self.tables
            .read()
            .await
            .select(|p| p.name.to_lowercase().contains(&needle))
    }

    async fn find_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> CatalogResult<Vec<Product>> {
        self.tables
            .read()
            .await
            .select(|p| p.price >= min && p.price <= max)
    }

    async fn find_low_stock(&self, threshold: i32) -> CatalogResult<Vec<Product>> {
        self.tables
            .read()
            .await
            .select(|p| p.quantity < threshold)
    }
}
