//! Diagnostic logging.
//!
//! Events go to stderr so stdout stays clean for the table, CSV or JSON an
//! estimate prints. The level comes from `RUST_LOG`; unset means `warn`.
//!
//! ```text
//! RUST_LOG=info dtf-cost estimate design.png
//! RUST_LOG=dtf_cost=debug dtf-cost estimate design.png
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Call once, before any work starts.
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
