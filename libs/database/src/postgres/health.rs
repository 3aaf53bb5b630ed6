use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult};

/// Run `SELECT 1` against the pool. Used by the readiness endpoint.
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    debug!("PostgreSQL health check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::MockDatabase;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_check_health_succeeds_on_row() {
        let row: BTreeMap<&str, sea_orm::Value> = BTreeMap::from([("?column?", 1i32.into())]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();

        assert!(check_health(&db).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_health_reports_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("connection reset".into())])
            .into_connection();

        let err = check_health(&db).await.unwrap_err();
        assert!(matches!(err, DatabaseError::HealthCheckFailed(ref msg) if msg.contains("connection reset")));
        assert!(err.to_string().starts_with("Health check failed: "));
    }
}
