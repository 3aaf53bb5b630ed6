//! Integration tests for the Catalog domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - The sea-orm queries match the migrated schema
//! - The category foreign key is enforced
//! - Name search escapes LIKE wildcards
//!
//! They need a Docker daemon: `cargo test -p domain_catalog -- --ignored`.

use domain_catalog::*;
use rust_decimal::Decimal;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

struct Repos {
    categories: PgCategoryRepository,
    products: PgProductRepository,
}

fn repos(db: &TestDatabase) -> Repos {
    Repos {
        categories: PgCategoryRepository::new(db.connection()),
        products: PgProductRepository::new(db.connection()),
    }
}

async fn seed_category(repos: &Repos, name: String) -> Category {
    repos
        .categories
        .create(CreateCategory { name })
        .await
        .unwrap()
}

fn new_product(category_id: i64, name: &str, cents: i64, quantity: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price: Decimal::new(cents, 2),
        quantity,
        category_id,
    }
}

// ============================================================================
// Category Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_get_update_category() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);
    let builder = TestDataBuilder::from_test_name("category_crud");

    let created = seed_category(&repos, builder.name("category", "main")).await;

    let fetched = assert_some(
        repos.categories.get_by_id(created.id).await.unwrap(),
        "category should exist",
    );
    assert_eq!(fetched.name, created.name);

    let mut renamed = fetched.clone();
    renamed.name = builder.name("category", "renamed");
    let updated = repos.categories.update(renamed).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, builder.name("category", "renamed"));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_categories_in_id_order() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);
    let builder = TestDataBuilder::from_test_name("category_list");

    for suffix in ["b", "a", "c"] {
        seed_category(&repos, builder.name("category", suffix)).await;
    }

    let ids: Vec<i64> = repos
        .categories
        .list()
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids.len(), 3);
    assert_ascending_ids(&ids, "categories");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_foreign_key_blocks_category_delete() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);
    let builder = TestDataBuilder::from_test_name("category_fk");

    let category = seed_category(&repos, builder.name("category", "main")).await;
    repos
        .products
        .create(new_product(category.id, "Cable", 500, 1))
        .await
        .unwrap();

    let err = repos.categories.delete(category.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::CategoryInUse { products: 1, .. }));
    assert!(repos.categories.get_by_id(category.id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_missing_category_returns_false() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);

    assert!(!repos.categories.delete(999).await.unwrap());
}

// ============================================================================
// Product Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_product_embeds_category() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);
    let builder = TestDataBuilder::from_test_name("product_create");

    let category = seed_category(&repos, builder.name("category", "main")).await;
    let product = repos
        .products
        .create(new_product(category.id, "Cable", 550, 100))
        .await
        .unwrap();

    assert_eq!(product.category, category);
    assert_eq!(product.price, Decimal::new(550, 2));

    let fetched = assert_some(
        repos.products.get_by_id(product.id).await.unwrap(),
        "product should exist",
    );
    assert_eq!(fetched.category.id, category.id);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_product_with_unknown_category() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);

    let err = repos
        .products
        .create(new_product(12345, "Cable", 500, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::CategoryNotFound(12345)));
    assert!(repos.products.list().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_product_reassigns_category() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);
    let builder = TestDataBuilder::from_test_name("product_update");

    let first = seed_category(&repos, builder.name("category", "first")).await;
    let second = seed_category(&repos, builder.name("category", "second")).await;
    let mut product = repos
        .products
        .create(new_product(first.id, "Cable", 500, 100))
        .await
        .unwrap();

    product.quantity = 10;
    product.category = second.clone();
    let updated = repos.products.update(product).await.unwrap();

    assert_eq!(updated.quantity, 10);
    assert_eq!(updated.category.id, second.id);
    assert_eq!(repos.products.count_by_category(first.id).await.unwrap(), 0);
    assert_eq!(repos.products.count_by_category(second.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_search_queries() {
    let db = TestDatabase::new().await;
    let repos = repos(&db);
    let builder = TestDataBuilder::from_test_name("product_search");

    let category = seed_category(&repos, builder.name("category", "main")).await;
    for (name, cents, quantity) in [
        ("USB Cable", 500, 100),
        ("HDMI cable", 1000, 5),
        ("100% Cotton", 1050, 0),
        ("snake_case", 200, 50),
    ] {
        repos
            .products
            .create(new_product(category.id, name, cents, quantity))
            .await
            .unwrap();
    }

    let names = |products: Vec<Product>| -> Vec<String> {
        products.into_iter().map(|p| p.name).collect()
    };

    assert_eq!(
        names(repos.products.search_by_name("CABLE").await.unwrap()),
        vec!["USB Cable", "HDMI cable"]
    );
    assert_eq!(
        names(repos.products.search_by_name("%").await.unwrap()),
        vec!["100% Cotton"]
    );
    assert_eq!(
        names(repos.products.search_by_name("_").await.unwrap()),
        vec!["snake_case"]
    );
    assert_eq!(repos.products.search_by_name("").await.unwrap().len(), 4);

    let in_range = repos
        .products
        .find_by_price_range(Decimal::new(500, 2), Decimal::new(1000, 2))
        .await
        .unwrap();
    assert_eq!(names(in_range), vec!["USB Cable", "HDMI cable"]);

    let low = repos.products.find_low_stock(50).await.unwrap();
    assert_eq!(names(low), vec!["HDMI cable", "100% Cotton"]);
}
