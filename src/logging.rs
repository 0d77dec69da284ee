//! Log output for the command line tools.

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

/// The log level used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: filter::LevelFilter = filter::LevelFilter::INFO;

/// Install the global subscriber.
///
/// Logs go to stderr so that JSON printed on stdout can be piped elsewhere.
/// The filter is read from `RUST_LOG`, falling back to [DEFAULT_LOG_LEVEL].
/// Calling this more than once has no effect.
pub fn setup_logging() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(DEFAULT_LOG_LEVEL.into())
        .from_env_lossy();

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter))
        .try_init();
}
