use std::sync::Arc;

use tracing::instrument;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CreateCategory, UpdateCategory};
use crate::repository::{CategoryRepository, ProductRepository};

/// Service layer for Category business logic
///
/// Holds the product repository only to refuse deleting a category that
/// products still reference.
pub struct CategoryService<C: CategoryRepository, P: ProductRepository> {
    categories: Arc<C>,
    products: Arc<P>,
}

impl<C: CategoryRepository, P: ProductRepository> Clone for CategoryService<C, P> {
    fn clone(&self) -> Self {
        Self {
            categories: Arc::clone(&self.categories),
            products: Arc::clone(&self.products),
        }
    }
}

impl<C: CategoryRepository, P: ProductRepository> CategoryService<C, P> {
    pub fn new(categories: C, products: P) -> Self {
        Self {
            categories: Arc::new(categories),
            products: Arc::new(products),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.categories.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: i64) -> CatalogResult<Category> {
        self.categories
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        input.validate()?;

        self.categories.create(input).await
    }

    /// Only the name changes; id and `created_at` are kept.
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: i64,
        input: UpdateCategory,
    ) -> CatalogResult<Category> {
        input.validate()?;

        let mut category = self.get_category(id).await?;
        category.apply_update(input);
        self.categories.update(category).await
    }

    /// Fails with [`CatalogError::CategoryInUse`] while any product points at
    /// the category; nothing is removed in that case.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i64) -> CatalogResult<()> {
        self.get_category(id).await?;

        let products = self.products.count_by_category(id).await?;
        if products > 0 {
            return Err(CatalogError::CategoryInUse { id, products });
        }

        if self.categories.delete(id).await? {
            Ok(())
        } else {
            Err(CatalogError::CategoryNotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockCategoryRepository, MockProductRepository};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn electronics() -> Category {
        let now = Utc::now();
        Category {
            id: 1,
            name: "Electronics".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_missing_category_is_not_found() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_get_by_id()
            .with(eq(7))
            .returning(|_| Ok(None));

        let service = CategoryService::new(categories, MockProductRepository::new());
        let err = service.get_category(7).await.unwrap_err();

        assert!(matches!(err, CatalogError::CategoryNotFound(7)));
    }

    #[tokio::test]
    async fn test_update_overwrites_name_only() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_get_by_id()
            .returning(|_| Ok(Some(electronics())));
        categories
            .expect_update()
            .withf(|c| c.id == 1 && c.name == "Gadgets")
            .returning(Ok);

        let service = CategoryService::new(categories, MockProductRepository::new());
        let updated = service
            .update_category(
                1,
                UpdateCategory {
                    name: "Gadgets".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "Gadgets");
    }

    #[tokio::test]
    async fn test_update_missing_category_never_writes() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_get_by_id().returning(|_| Ok(None));
        categories.expect_update().never();

        let service = CategoryService::new(categories, MockProductRepository::new());
        let err = service
            .update_category(
                3,
                UpdateCategory {
                    name: "Gadgets".into(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::CategoryNotFound(3)));
    }

    #[tokio::test]
    async fn test_delete_referenced_category_is_rejected() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_get_by_id()
            .returning(|_| Ok(Some(electronics())));
        categories.expect_delete().never();

        let mut products = MockProductRepository::new();
        products
            .expect_count_by_category()
            .with(eq(1))
            .returning(|_| Ok(2));

        let service = CategoryService::new(categories, products);
        let err = service.delete_category(1).await.unwrap_err();

        assert!(matches!(
            err,
            CatalogError::CategoryInUse { id: 1, products: 2 }
        ));
    }

    #[tokio::test]
    async fn test_delete_unreferenced_category() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_get_by_id()
            .returning(|_| Ok(Some(electronics())));
        categories
            .expect_delete()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(true));

        let mut products = MockProductRepository::new();
        products.expect_count_by_category().returning(|_| Ok(0));

        let service = CategoryService::new(categories, products);
        assert!(service.delete_category(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_create().never();

        let service = CategoryService::new(categories, MockProductRepository::new());
        let err = service
            .create_category(CreateCategory { name: "  ".into() })
            .await
            .unwrap_err();

        match err {
            CatalogError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("name"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
