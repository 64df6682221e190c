//! Logging setup for the Huddle binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose logs are enabled at the default level in addition to the binary itself.
const DEFAULT_TARGETS: &[&str] = &["huddle_server", "tower_http"];

/// Build the default filter directive, e.g. `huddle_server=debug,tower_http=debug,my_bin=debug`.
fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut targets: Vec<&str> = DEFAULT_TARGETS.to_vec();
    if !targets.contains(&binary_target.as_str()) {
        targets.push(&binary_target);
    }
    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use huddle_shared::logger::setup_logger;
///
/// setup_logger("huddle-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
