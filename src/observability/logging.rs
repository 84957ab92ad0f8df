use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes the logging system with console and rolling file output.
///
/// Console output goes to stderr so it never interleaves with report lines on
/// stdout. The returned guard flushes the file writer when dropped; keep it
/// alive for the life of the process.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    // Respect RUST_LOG if set; otherwise info for our crate, warn elsewhere
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tabular_pipeline=info,warn"));

    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    if let Err(e) = fs::create_dir_all(&config.directory) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
        tracing::warn!(
            "Log directory {} unavailable, file logging disabled: {}",
            config.directory,
            e
        );
        return None;
    }

    // Non-blocking writer over a daily rolling file
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if config.json_file {
        registry
            .with(fmt::layer().json().with_writer(non_blocking_writer))
            .init();
    } else {
        registry
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking_writer))
            .init();
    }

    Some(guard)
}
