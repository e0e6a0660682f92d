//! Profit First deposit allocation: the pure calculator, the saved defaults,
//! and the form/CLI front ends that drive them.

pub mod api;
pub mod cli;
pub mod core;
pub mod settings;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default
/// `profit_first=info` filter.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("profit_first=info"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
