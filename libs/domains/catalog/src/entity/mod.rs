//! sea-orm entities backing the PostgreSQL repositories.

pub mod category;
pub mod product;
