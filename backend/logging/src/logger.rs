//! Structured Logger
//!
//! Wraps `tracing` with a console layer, an optional daily-rolling NDJSON
//! file, and `RUST_LOG`-style level control.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the background file writer alive; drop it only at shutdown.
pub struct LoggerGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the global logger.
///
/// `RUST_LOG` takes precedence over `level`. With `log_dir` set, NDJSON is
/// also written to `<log_dir>/geoclass.log.YYYY-MM-DD`.
pub fn init_logger(log_dir: Option<&Path>, level: &str) -> LoggerGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "geoclass.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    LoggerGuard { _file: guard }
}
