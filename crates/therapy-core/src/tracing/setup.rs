//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging.
///
/// Reads `THERAPY_LOG` for per-crate log levels, e.g.
/// `THERAPY_LOG=therapy_storage=debug,therapy_etl=info`.
///
/// Falls back to `therapy=info` if `THERAPY_LOG` is not set or is invalid.
/// Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("THERAPY_LOG")
            .unwrap_or_else(|_| EnvFilter::new("therapy=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    });
}
