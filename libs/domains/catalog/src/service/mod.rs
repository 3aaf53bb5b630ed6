//! Business rules on top of the repositories: existence checks, association
//! resolution and the category delete guard.

mod category;
mod product;

pub use category::CategoryService;
pub use product::ProductService;
