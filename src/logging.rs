//! Log output for embedding applications.
//!
//! The library itself only emits `tracing` events:
//!
//! - target `query`: DEBUG with the SQL before execution, INFO with the
//!   elapsed time afterwards
//! - target `slow_query`: WARN when a query exceeds the database's
//!   slow-query threshold
//!
//! Applications that do not install their own subscriber can call [`init`].

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install a formatting subscriber for the process.
///
/// `RUST_LOG` wins over the configured filter. Returns `false` when a global
/// subscriber was already installed, in which case nothing changes.
pub fn init(settings: &LoggingSettings) -> bool {
    // Colors only when stderr is a terminal and NO_COLOR is unset.
    let ansi = std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(settings.with_target)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.filter)),
        )
        .try_init()
        .is_ok()
}
