use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

const PRODUCTION_FILTER: &str = "info,tower_http=info,sea_orm=warn,sqlx=warn";
const DEVELOPMENT_FILTER: &str = "debug,tower_http=debug,sea_orm=info,sqlx=warn,hyper=info";

/// Install color-eyre with file:line locations and no env section.
///
/// Call this first thing in `main()`. Repeated calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize the global subscriber for the given environment.
///
/// - **Production**: flattened JSON events without targets, for log shippers.
/// - **Development**: pretty, multi-line output.
///
/// Both attach [`tracing_error::ErrorLayer`] so `eyre` reports carry span
/// traces. `RUST_LOG` overrides the default filter. Calling this more than
/// once is harmless, which keeps tests free to call it.
pub fn init_tracing(environment: &Environment) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if is_production {
            PRODUCTION_FILTER
        } else {
            DEVELOPMENT_FILTER
        })
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Production);
    }

    #[test]
    fn test_init_tracing_honours_rust_log() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            init_tracing(&Environment::Production);
        });
    }

    #[test]
    fn test_default_filters_parse() {
        assert!(EnvFilter::try_new(PRODUCTION_FILTER).is_ok());
        assert!(EnvFilter::try_new(DEVELOPMENT_FILTER).is_ok());
    }
}
