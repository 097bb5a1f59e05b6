// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

// Parser crates log every recovered markup error at debug level
const DEFAULT_FILTER: &str = "info,html5ever=warn,selectors=warn,reqwest=warn";

/// Sets up the logging framework using tracing_subscriber.
/// Reads log level filters from the `RUST_LOG` environment variable,
/// falling back to info for this crate with quiet parser/HTTP internals.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("Logging setup complete.");
}
