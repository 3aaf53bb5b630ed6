use crate::{env_or_default, env_parse, ConfigError, FromEnv};
use std::env;
use std::net::Ipv4Addr;

/// HTTP listener settings shared by the API binaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS. Empty leaves CORS disabled.
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            cors_allowed_origins: Vec::new(),
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_allowed_origins.push(origin.into());
        self
    }

    /// Socket address in "host:port" form.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    /// - HOST: defaults to 0.0.0.0
    /// - PORT: defaults to 8080
    /// - CORS_ALLOWED_ORIGIN: comma-separated origins, unset or blank disables CORS
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string());
        let port = env_parse("PORT", "8080")?;
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGIN")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED.to_string(), 8080)
    }
}
