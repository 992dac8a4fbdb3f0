//! Logging setup utilities for the madang chat service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are enabled by the default filter.
const LIBRARY_TARGETS: &[&str] = &["madang_server", "madang_shared"];

/// Build the default `EnvFilter` directive string.
///
/// Every library crate of the workspace and the binary itself get `default_log_level`.
fn default_directives(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");

    LIBRARY_TARGETS
        .iter()
        .copied()
        .chain(
            std::iter::once(binary_target.as_str())
                .filter(|target| !LIBRARY_TARGETS.contains(target)),
        )
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "madang-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use madang_shared::logger::setup_logger;
///
/// setup_logger("madang-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
