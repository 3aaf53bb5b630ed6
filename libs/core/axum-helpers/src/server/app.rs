use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{create_cors_layer, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Wrap the API routes with documentation and the cross-cutting layers.
///
/// - Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`
/// - `apis` nested under `/api`
/// - JSON 404 fallback
/// - request tracing, security headers, CORS (only when origins are
///   configured) and response compression
///
/// `/health` and `/ready` are merged by the binary.
///
/// # Errors
/// Returns `InvalidInput` when a configured CORS origin is not a valid header value.
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors = create_cors_layer(&server_config.cors_allowed_origins).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
        )
    })?;

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers));

    match cors {
        Some(layer) => {
            info!(origins = ?server_config.cors_allowed_origins, "CORS enabled");
            router = router.layer(layer);
        }
        None => info!("CORS disabled, no allowed origins configured"),
    }

    Ok(router.layer(CompressionLayer::new()))
}

/// Serve with graceful shutdown, then run `cleanup` within `shutdown_timeout`.
///
/// In-flight requests drain before `cleanup` starts; a cleanup that overruns
/// its budget is abandoned with a warning.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (coordinator, mut shutdown_rx) = ShutdownCoordinator::new();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!(address = %listener.local_addr()?, "Server listening");

    let signal_handle = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.wait_for_signal().await })
    };

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Server encountered an error"));

    signal_handle.abort();

    info!(timeout = ?shutdown_timeout, "Running shutdown cleanup");
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed"),
        Err(_) => warn!(timeout = ?shutdown_timeout, "Cleanup exceeded timeout, forcing shutdown"),
    }

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(info(title = "test"))]
    struct EmptyDoc;

    fn api() -> Router {
        Router::new().route("/ping", get(|| async { "pong" }))
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_api() {
        let router = create_router::<EmptyDoc>(api(), &ServerConfig::default()).unwrap();

        let response = router
            .clone()
            .oneshot(Request::get("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");

        let response = router
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let router = create_router::<EmptyDoc>(api(), &ServerConfig::default()).unwrap();

        let response = router
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_when_origin_configured() {
        let config = ServerConfig::default().with_cors_origin("http://localhost:4200");
        let router = create_router::<EmptyDoc>(api(), &config).unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/ping")
                    .header(header::ORIGIN, "http://localhost:4200")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:4200"
        );
    }

    #[test]
    fn test_invalid_cors_origin_fails() {
        let config = ServerConfig::default().with_cors_origin("http://bad\norigin");
        let err = create_router::<EmptyDoc>(api(), &config).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
