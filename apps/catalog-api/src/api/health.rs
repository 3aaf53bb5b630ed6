//! Readiness check against the configured store.

use crate::state::{AppState, Storage};
use axum::{extract::State, response::Response};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

/// Readiness check endpoint.
///
/// PostgreSQL is pinged with `SELECT 1`; the in-memory store is always ready.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = match &state.storage {
        Storage::Postgres(db) => vec![(
            "database",
            Box::pin(async move {
                database::postgres::check_health(db)
                    .await
                    .map_err(|e| e.to_string())
            }) as HealthCheckFuture<'_>,
        )],
        Storage::Memory(_) => vec![("storage", Box::pin(async { Ok(()) }) as HealthCheckFuture<'_>)],
    };

    run_health_checks(checks).await
}
