//! Catalog API - REST server for categories and products

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_catalog::InMemoryCatalog;
use migration::Migrator;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::{AppState, Storage};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let storage = match config.postgres.clone() {
        Some(postgres) => {
            info!(storage = %config.storage, "Connecting to PostgreSQL");

            let db = database::postgres::connect_from_config_with_retry(postgres, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

            if config.run_migrations {
                database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
            }

            Storage::Postgres(db)
        }
        None => {
            warn!(storage = %config.storage, "Using in-memory storage, data is lost on restart");
            Storage::Memory(InMemoryCatalog::new())
        }
    };

    let state = AppState { config, storage };

    // Build router with API routes (pass reference, not ownership!)
    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.server)?;

    // - /health: liveness check with app name/version
    // - /ready: readiness check against the configured store
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    let server_config = state.config.server.clone();
    let shutdown_timeout = state.config.shutdown_timeout;
    info!(
        timeout_secs = shutdown_timeout.as_secs(),
        "Starting Catalog API with graceful shutdown"
    );

    // Storage moves here for cleanup
    let storage = state.storage;
    create_production_app(app, &server_config, shutdown_timeout, async move {
        match storage {
            Storage::Postgres(db) => {
                info!("Shutting down: closing database connections");
                match db.close().await {
                    Ok(_) => info!("PostgreSQL connection closed successfully"),
                    Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
                }
            }
            Storage::Memory(_) => info!("Shutting down: dropping in-memory store"),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
