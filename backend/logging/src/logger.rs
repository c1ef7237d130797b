//! Structured Logger
//!
//! Wraps `tracing` with a console layer and, when a directory is configured,
//! a JSON file layer rotated daily. `RUST_LOG` overrides the configured level.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "autoinspect.log";

/// Initialize the global logger.
///
/// Returns `false` when a global subscriber was already installed (tests,
/// or a second call), in which case nothing changes.
pub fn init_logger(level: &str, log_dir: Option<&Path>) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // NDJSON to `<dir>/autoinspect.log.YYYY-MM-DD`
    let file_layer = log_dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
}
