//! Tracing setup for the `gamebk` binary

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_FILTER: &str = "gamebk=info,gamebk_backup=info,gamebk_storage=info";

/// Install the global subscriber, writing to stderr. Later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // another subscriber may already be installed (tests, embedding apps)
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
