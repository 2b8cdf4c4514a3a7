//! Logger setup based on `tracing-subscriber`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Build the default filter directive for a binary.
///
/// Crate names are normalised (`-` to `_`) because that is how targets appear
/// in `tracing` metadata.
pub fn default_directive(bin_name: &str, level: &str) -> String {
    let bin_target = bin_name.replace('-', "_");
    format!("{bin_target}={level},roomchat_client={level},roomchat_shared={level}")
}

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Output goes to stderr so
/// it does not mix with the interactive prompt on stdout. Calling this more
/// than once is harmless; later calls are ignored.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(bin_name, default_level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true),
        )
        .try_init();

    if result.is_err() {
        tracing::debug!("Logger already initialised, skipping");
    }
}
