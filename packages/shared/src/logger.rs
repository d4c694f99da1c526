//! Logging setup for the Kodama workspace.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// The `RUST_LOG` environment variable takes precedence when set; otherwise
/// the application's own targets log at `default_level`. Cargo normalizes
/// crate names to underscores in log targets, so the app name is normalized
/// the same way before it is used as a filter directive.
///
/// # Examples
///
/// ```no_run
/// use kodama_shared::logger::setup_logger;
///
/// setup_logger("kodama-server", "info");
/// ```
pub fn setup_logger(app_name: &str, default_level: &str) {
    let directive = format!("{}={}", app_name.replace('-', "_"), default_level);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| directive.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!(
        "Logger initialized for '{}' (default level: {})",
        app_name,
        default_level
    );
}
