//! eqcfg command implementations, exposed for testing

pub mod commands;
pub mod common;

pub use common::GlobalOpts;

use eqcfg_logger::Logger;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the `tracing` subscriber used by the library crates.
///
/// `RUST_LOG` wins over the level derived from the logger verbosity.
pub fn init_tracing(logger: &Logger) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger.filter_directive().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
