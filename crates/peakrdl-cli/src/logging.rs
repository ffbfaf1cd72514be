//! Tracing subscriber setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize a tracing subscriber writing to stderr.
///
/// The `RUST_LOG` environment variable controls verbosity; diagnostics
/// are off by default so normal runs print nothing but their own output.
pub fn init() {
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return;
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    // A second init (e.g. from tests) is fine to ignore.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
