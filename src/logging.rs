//! Tracing setup shared by both binaries.
//!
//! Logs go to stderr so the dashboard frame on stdout stays intact.
//! `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=wbids=debug`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "wbids=info";

pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();

    // A subscriber installed earlier (tests, embedding) wins.
    if let Err(e) = result {
        tracing::debug!("logging already initialized: {e}");
    }
}
