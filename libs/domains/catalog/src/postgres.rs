use async_trait::async_trait;
use chrono::Utc;
use database::BaseRepository;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select, SqlErr,
};

use crate::{
    entity::{category, product},
    error::{CatalogError, CatalogResult},
    models::{Category, CreateCategory, NewProduct, Product},
    repository::{CategoryRepository, ProductRepository},
};

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

/// `%`, `_` and the escape character itself match literally.
fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct PgCategoryRepository {
    base: BaseRepository<category::Entity>,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn count_products(&self, id: i64) -> CatalogResult<u64> {
        let count = product::Entity::find()
            .filter(product::Column::CategoryId.eq(id))
            .count(self.base.db())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, input: CreateCategory) -> CatalogResult<Category> {
        let now = Utc::now();
        let active_model = category::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = self.base.insert(active_model).await?;

        tracing::info!(category_id = model.id, "Created category");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<Category>> {
        let model = self.base.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self) -> CatalogResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, category: Category) -> CatalogResult<Category> {
        let active_model = category::ActiveModel {
            id: Unchanged(category.id),
            name: Set(category.name),
            created_at: NotSet,
            updated_at: Set(Utc::now().into()),
        };

        let model = self.base.update(active_model).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => CatalogError::CategoryNotFound(category.id),
            e => e.into(),
        })?;

        tracing::info!(category_id = model.id, "Updated category");
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let rows_affected = match self.base.delete_by_id(id).await {
            Ok(rows) => rows,
            Err(e) if is_foreign_key_violation(&e) => {
                let products = self.count_products(id).await?;
                return Err(CatalogError::CategoryInUse { id, products });
            }
            Err(e) => return Err(e.into()),
        };

        if rows_affected > 0 {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

pub struct PgProductRepository {
    base: BaseRepository<product::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Products joined with their category, ordered by id.
    fn joined() -> sea_orm::SelectTwo<product::Entity, category::Entity> {
        product::Entity::find()
            .find_also_related(category::Entity)
            .order_by_asc(product::Column::Id)
    }

    async fn fetch_joined(
        &self,
        query: sea_orm::SelectTwo<product::Entity, category::Entity>,
    ) -> CatalogResult<Vec<Product>> {
        let rows = query.all(self.base.db()).await?;
        rows.into_iter().map(|(p, c)| join(p, c)).collect()
    }

    fn by_id(id: i64) -> Select<product::Entity> {
        product::Entity::find().filter(product::Column::Id.eq(id))
    }
}

fn join(product: product::Model, category: Option<category::Model>) -> CatalogResult<Product> {
    let category = category.ok_or_else(|| {
        CatalogError::Internal(format!(
            "Product {} references missing category {}",
            product.id, product.category_id
        ))
    })?;
    Ok(product.into_product(category.into()))
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> CatalogResult<Product> {
        let category_id = input.category_id;
        let now = Utc::now();
        let active_model = product::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            quantity: Set(input.quantity),
            category_id: Set(category_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = self.base.insert(active_model).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                CatalogError::CategoryNotFound(category_id)
            } else {
                e.into()
            }
        })?;

        let category = category::Entity::find_by_id(category_id)
            .one(self.base.db())
            .await?;
        let product = join(model, category)?;

        tracing::info!(
            product_id = product.id,
            category_id = category_id,
            "Created product"
        );
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> CatalogResult<Option<Product>> {
        let row = Self::by_id(id)
            .find_also_related(category::Entity)
            .one(self.base.db())
            .await?;

        row.map(|(p, c)| join(p, c)).transpose()
    }

    async fn list(&self) -> CatalogResult<Vec<Product>> {
        self.fetch_joined(Self::joined()).await
    }

    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let id = product.id;
        let category_id = product.category.id;
        let active_model = product::ActiveModel {
            id: Unchanged(id),
            name: Set(product.name),
            description: Set(product.description),
            price: Set(product.price),
            quantity: Set(product.quantity),
            category_id: Set(category_id),
            created_at: NotSet,
            updated_at: Set(Utc::now().into()),
        };

        self.base.update(active_model).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => CatalogError::ProductNotFound(id),
            e if is_foreign_key_violation(&e) => CatalogError::CategoryNotFound(category_id),
            e => e.into(),
        })?;

        let updated = self
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        tracing::info!(product_id = id, "Updated product");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> CatalogResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count_by_category(&self, category_id: i64) -> CatalogResult<u64> {
        let count = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(self.base.db())
            .await?;
        Ok(count)
    }

    async fn search_by_name(&self, fragment: &str) -> CatalogResult<Vec<Product>> {
        let query = Self::joined().filter(Expr::cust_with_values(
            r#""products"."name" ILIKE $1 ESCAPE '\'"#,
            [like_pattern(fragment)],
        ));
        self.fetch_joined(query).await
    }

    async fn find_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> CatalogResult<Vec<Product>> {
        let query = Self::joined().filter(product::Column::Price.between(min, max));
        self.fetch_joined(query).await
    }

    async fn find_low_stock(&self, threshold: i32) -> CatalogResult<Vec<Product>> {
        let query = Self::joined().filter(product::Column::Quantity.lt(threshold));
        self.fetch_joined(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn category_model(id: i64, name: &str) -> category::Model {
        let now = Utc::now().into();
        category::Model {
            id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn product_model(id: i64, category_id: i64) -> product::Model {
        let now = Utc::now().into();
        product::Model {
            id,
            name: "Cable".to_string(),
            description: None,
            price: Decimal::new(500, 2),
            quantity: 100,
            category_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cable"), "%cable%");
        assert_eq!(like_pattern("100%"), r"%100\%%");
        assert_eq!(like_pattern("a_b"), r"%a\_b%");
        assert_eq!(like_pattern(r"C:\"), r"%C:\\%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[tokio::test]
    async fn test_get_category_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category_model(1, "Electronics")]])
            .into_connection();
        let repo = PgCategoryRepository::new(db);

        let category = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(category.id, 1);
        assert_eq!(category.name, "Electronics");
    }

    #[tokio::test]
    async fn test_delete_missing_category_returns_false() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = PgCategoryRepository::new(db);

        assert!(!repo.delete(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_product_embeds_category() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(
                product_model(7, 1),
                Some(category_model(1, "Electronics")),
            )]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo.get_by_id(7).await.unwrap().unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.category.name, "Electronics");
    }

    #[tokio::test]
    async fn test_product_without_category_row_is_internal_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(product_model(7, 3), None::<category::Model>)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let err = repo.list().await.unwrap_err();
        assert!(matches!(err, CatalogError::Internal(_)));
    }

    #[tokio::test]
    async fn test_database_failure_maps_to_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let err = repo.find_low_stock(5).await.unwrap_err();
        assert!(matches!(err, CatalogError::Database(_)));
    }
}
