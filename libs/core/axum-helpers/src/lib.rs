//! # Axum Helpers
//!
//! Shared HTTP plumbing for the catalog services.
//!
//! ## Modules
//!
//! - **[`errors`]**: [`AppError`] and its translation to status codes and JSON bodies
//! - **[`extractors`]**: [`IdPath`], [`ValidatedJson`], [`ApiQuery`]
//! - **[`http`]**: CORS and security headers
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let config = ServerConfig::default();
//! let router = create_router::<ApiDoc>(api_routes, &config)?.merge(health_router(app_info!()));
//! create_production_app(router, &config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse, ValidationErrorResponse, error_response};
pub use extractors::{ApiQuery, IdPath, ValidatedJson};
pub use http::{create_cors_layer, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};
