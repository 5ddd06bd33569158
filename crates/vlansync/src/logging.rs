//! Tracing setup.
//!
//! The worker logs to stderr and to a rolling file through a
//! non-blocking writer; the returned guard must live until exit so
//! buffered lines are flushed. One-shot commands log to stderr only.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vlansync_config::{LogConfig, LogFormat, LogRotation};

use crate::error::CliError;

/// `-v` raises the level above whatever is configured.
fn level_for(configured: &str, verbosity: u8) -> &str {
    match verbosity {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

/// `RUST_LOG` wins over both the configured level and `-v`.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
    }
}

/// Console-only logging for one-shot commands.
///
/// Fails only when a global subscriber is already installed, in which
/// case that subscriber keeps receiving events.
pub fn init_console(verbosity: u8) {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter(level_for("warn", verbosity)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        tracing::debug!(error = %e, "console subscriber already installed, keeping it");
    }
}

/// Console plus rolling-file logging for the worker.
pub fn init_worker(config: &LogConfig, verbosity: u8) -> Result<WorkerGuard, CliError> {
    let logging_err = |reason: String| CliError::Logging {
        path: config.file.clone(),
        reason,
    };

    let dir = config
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let prefix = config
        .file
        .file_name()
        .ok_or_else(|| logging_err("not a file path".into()))?;

    std::fs::create_dir_all(dir).map_err(|e| logging_err(e.to_string()))?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation(config.rotation))
        .filename_prefix(prefix.to_string_lossy())
        .max_log_files(config.max_files)
        .build(dir)
        .map_err(|e| logging_err(e.to_string()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let (file_text, file_json) = match config.format {
        LogFormat::Text => (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(false),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter(level_for(&config.level, verbosity)))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_text)
        .with(file_json)
        .try_init()
        .map_err(|e| logging_err(e.to_string()))?;

    Ok(guard)
}
