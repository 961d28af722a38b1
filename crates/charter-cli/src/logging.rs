//! Tracing setup
//!
//! Logs go to stderr so stdout only carries the rendered draft.

use tracing_subscriber::EnvFilter;

/// Initialise the global subscriber; `RUST_LOG` wins over `default_level`
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
