use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// Installs the global subscriber. Logs go to stderr so stdout only carries the report.
///
/// The returned guard flushes the log file on drop and must outlive the command.
pub fn setup_logging(level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log filter {:?}", level))?;

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(SystemTime)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file {:?} has no file name", path))?;

            let file_appender = RollingFileAppender::new(Rotation::NEVER, directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_timer(SystemTime)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    tracing::debug!("Logging system initialized");

    Ok(guard)
}
