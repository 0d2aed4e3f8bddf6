//! Installs a `tracing_subscriber` formatting layer, filtered
//! by the environment.
//!
//! An example environment is shown:
//! ```bash
//! RUST_LOG=traffic_matcher=debug
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialises the tracer, using tracing subscription.
/// This is optional, not calling this function will simply
/// not log traces.
///
/// Instrumented spans are emitted on the matcher's hot paths
/// (layer generation, the forward pass, and routing) when the
/// `tracing` feature is enabled.
pub fn initialize_tracer() {
    let fmt_layer = tracing_subscriber::fmt::layer();

    // Calling twice (e.g. from several tests) is not an error.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(fmt_layer)
        .try_init();
}
