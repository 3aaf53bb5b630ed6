/// Errors raised by the database helpers.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
