// ABOUTME: Tracing subscriber setup for binaries embedding hopper.
// ABOUTME: The library itself only emits tracing events.

use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is unset.
pub const DEFAULT_FILTER: &str = "hopper=info";

/// Install a fmt subscriber writing to stderr.
///
/// `RUST_LOG` wins over `filter`. Calling this more than once is harmless;
/// only the first call installs a subscriber.
pub fn init(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or(DEFAULT_FILTER)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
