//! Extractors whose rejections go through [`AppError`](crate::AppError), so
//! every malformed request gets the same JSON error body.

pub mod api_query;
pub mod id_path;
pub mod validated_json;

pub use api_query::ApiQuery;
pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
