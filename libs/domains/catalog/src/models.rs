use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// A named grouping of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sellable item. Always belongs to exactly one [`Category`], which is
/// embedded in every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = f64, example = 19.99)]
    pub price: Decimal,
    pub quantity: i32,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /categories`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters"),
        custom(function = "not_blank", message = "Category name is required")
    )]
    pub name: String,
}

/// Body of `PUT /categories/{id}`. Only the name is mutable.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters"),
        custom(function = "not_blank", message = "Category name is required")
    )]
    pub name: String,
}

/// Body of `POST /products/category/{categoryId}`.
///
/// Absent fields take their defaults: no description, price 0, quantity 0.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200, message = "Product name must be between 1 and 200 characters"),
        custom(function = "not_blank", message = "Product name is required")
    )]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = f64, example = 19.99)]
    #[validate(custom(function = "valid_price"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,
}

/// Reference to the category a product should move to.
///
/// Any other fields sent alongside `id` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct CategoryRef {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Body of `PUT /products/{id}`.
///
/// Name, description, price and quantity are always overwritten (absent
/// fields take their defaults). The category changes only when
/// `category.id` is present.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200, message = "Product name must be between 1 and 200 characters"),
        custom(function = "not_blank", message = "Product name is required")
    )]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = f64, example = 19.99)]
    #[validate(custom(function = "valid_price"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,
    #[serde(default)]
    pub category: Option<CategoryRef>,
}

impl UpdateProduct {
    /// The category id to reassign to, if the body names one.
    pub fn target_category_id(&self) -> Option<i64> {
        self.category.as_ref().and_then(|c| c.id)
    }
}

/// Insert payload handed to [`ProductRepository::create`](crate::repository::ProductRepository::create)
/// once the category has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: i64,
}

impl NewProduct {
    pub fn new(category_id: i64, input: CreateProduct) -> Self {
        Self {
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            category_id,
        }
    }
}

impl Category {
    pub fn apply_update(&mut self, input: UpdateCategory) {
        self.name = input.name;
    }
}

impl Product {
    /// Overwrite the scalar fields and, when given, the owning category.
    pub fn apply_update(&mut self, input: UpdateProduct, category: Option<Category>) {
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.quantity = input.quantity;
        if let Some(category) = category {
            self.category = category;
        }
    }
}

/// Query of `GET /products/search`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameSearch {
    /// Case-insensitive substring; empty matches every product.
    #[serde(default)]
    pub name: String,
}

/// Query of `GET /products/price-range`. Both bounds are inclusive and required.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceRange {
    #[param(value_type = f64)]
    pub min: Decimal,
    #[param(value_type = f64)]
    pub max: Decimal,
}

/// Query of `GET /products/low-stock`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockThreshold {
    /// Products with a quantity strictly below this value are returned.
    pub threshold: i32,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Largest value a `NUMERIC(12, 2)` price column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Prices must fit `NUMERIC(12, 2)` so every store keeps the same value.
fn valid_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("range")
            .with_message(Cow::Borrowed("Price must not be negative")));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("scale")
            .with_message(Cow::Borrowed("Price must have at most 2 decimal places")));
    }
    if *price > MAX_PRICE {
        return Err(ValidationError::new("range")
            .with_message(Cow::Borrowed("Price must not exceed 9999999999.99")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn product_input(name: &str, price: f64, quantity: i32) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: None,
            price: Decimal::from_f64(price).unwrap(),
            quantity,
        }
    }

    #[test]
    fn test_category_name_length_bounds() {
        assert!(CreateCategory { name: "Electronics".into() }.validate().is_ok());
        assert!(CreateCategory { name: "a".repeat(100) }.validate().is_ok());

        let errors = CreateCategory { name: "a".repeat(101) }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_blank_category_name_is_rejected() {
        let errors = UpdateCategory { name: "   ".into() }.validate().unwrap_err();
        let name_errors = errors.field_errors()["name"];
        assert_eq!(
            name_errors[0].message.as_deref(),
            Some("Category name is required")
        );
    }

    #[test]
    fn test_missing_name_defaults_to_empty_and_fails() {
        let input: CreateCategory = serde_json::from_str("{}").unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_product_defaults_when_fields_absent() {
        let input: UpdateProduct = serde_json::from_str(r#"{"name":"Cable"}"#).unwrap();
        assert_eq!(input.description, None);
        assert_eq!(input.price, Decimal::ZERO);
        assert_eq!(input.quantity, 0);
        assert_eq!(input.target_category_id(), None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_negative_price_and_quantity_are_rejected() {
        let errors = product_input("Cable", -0.01, -1).validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(
            fields["price"][0].message.as_deref(),
            Some("Price must not be negative")
        );
        assert_eq!(
            fields["quantity"][0].message.as_deref(),
            Some("Quantity must not be negative")
        );
    }

    #[test]
    fn test_price_must_fit_two_decimal_places() {
        let errors = product_input("Cable", 5.555, 1).validate().unwrap_err();
        assert_eq!(
            errors.field_errors()["price"][0].message.as_deref(),
            Some("Price must have at most 2 decimal places")
        );

        assert!(product_input("Cable", 5.5, 1).validate().is_ok());
        assert!(product_input("Cable", 5.50, 1).validate().is_ok());
    }

    #[test]
    fn test_price_upper_bound() {
        assert_eq!(MAX_PRICE, Decimal::new(999_999_999_999, 2));

        let at_limit = CreateProduct {
            price: MAX_PRICE,
            ..product_input("Cable", 0.0, 1)
        };
        assert!(at_limit.validate().is_ok());

        let errors = product_input("Cable", 100_000_000_000.0, 1)
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.field_errors()["price"][0].message.as_deref(),
            Some("Price must not exceed 9999999999.99")
        );
    }

    #[test]
    fn test_price_is_read_from_json_number() {
        let input: CreateProduct =
            serde_json::from_str(r#"{"name":"Cable","price":5.5,"quantity":100}"#).unwrap();
        assert_eq!(input.price, Decimal::new(55, 1));
    }

    #[test]
    fn test_category_ref_without_id_does_not_reassign() {
        let input: UpdateProduct =
            serde_json::from_str(r#"{"name":"Cable","category":{"name":"Other"}}"#).unwrap();
        assert_eq!(input.target_category_id(), None);

        let input: UpdateProduct =
            serde_json::from_str(r#"{"name":"Cable","category":{"id":4}}"#).unwrap();
        assert_eq!(input.target_category_id(), Some(4));
    }

    #[test]
    fn test_product_apply_update_keeps_category_when_none_given() {
        let now = Utc::now();
        let category = Category {
            id: 1,
            name: "Electronics".into(),
            created_at: now,
            updated_at: now,
        };
        let mut product = Product {
            id: 9,
            name: "Cable".into(),
            description: Some("USB-C".into()),
            price: Decimal::new(500, 2),
            quantity: 100,
            category: category.clone(),
            created_at: now,
            updated_at: now,
        };

        product.apply_update(
            UpdateProduct {
                name: "Cable 2m".into(),
                quantity: 10,
                ..Default::default()
            },
            None,
        );

        assert_eq!(product.name, "Cable 2m");
        assert_eq!(product.description, None);
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.quantity, 10);
        assert_eq!(product.category, category);
    }
}
