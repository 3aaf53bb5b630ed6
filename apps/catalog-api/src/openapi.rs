use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            axum_helpers::ErrorResponse,
            axum_helpers::ValidationErrorResponse,
            axum_helpers::HealthResponse
        )
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Categories and products with name, price-range and low-stock search"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/categories", api = domain_catalog::CategoriesApiDoc),
        (path = "/products", api = domain_catalog::ProductsApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/categories",
            "/categories/{id}",
            "/products",
            "/products/{id}",
            "/products/category/{category_id}",
            "/products/search",
            "/products/price-range",
            "/products/low-stock",
        ] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
