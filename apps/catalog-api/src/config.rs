use core_config::{app_info, env_parse, server::ServerConfig, AppInfo, FromEnv};
use std::time::Duration;
use strum::{Display, EnumString};

// Import database configs from the database library
use database::postgres::PostgresConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Where categories and products are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Postgres,
    /// Process-local store, emptied on restart.
    Memory,
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub storage: StorageBackend,
    /// Present exactly when `storage` is [`StorageBackend::Postgres`].
    pub postgres: Option<PostgresConfig>,
    pub run_migrations: bool,
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let storage: StorageBackend = env_parse("CATALOG_STORAGE", "postgres")?;

        let postgres = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?), // DATABASE_URL required
            StorageBackend::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            storage,
            postgres,
            run_migrations: env_parse("RUN_MIGRATIONS", "true")?,
            shutdown_timeout: Duration::from_secs(env_parse("SHUTDOWN_TIMEOUT_SECS", "30")?),
        })
    }
}
