use std::fs;
use std::io::stderr;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{ReportError, ReportResult};

pub const LOG_FILE_NAME: &str = "player_report.log";
const DEFAULT_DIRECTIVE: &str = "player_report=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber.
///
/// - `log_dir` set: daily rolling file in that directory (created if missing)
/// - `to_stderr`: also mirror to stderr; the terminal UI passes `false`
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the program.
pub fn setup_logging(log_dir: Option<&Path>, to_stderr: bool) -> ReportResult<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry();

    let Some(dir) = log_dir else {
        if to_stderr {
            registry
                .with(
                    fmt::Layer::new()
                        .with_writer(stderr)
                        .with_filter(env_filter()),
                )
                .try_init()
                .map_err(|e| ReportError::LogSetup(e.to_string()))?;
        }
        return Ok(None);
    };

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            ReportError::LogSetup(format!("failed to create log directory: {e}"))
        })?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter());

    let installed = if to_stderr {
        registry
            .with(file_layer)
            .with(
                fmt::Layer::new()
                    .with_writer(stderr)
                    .with_filter(env_filter()),
            )
            .try_init()
    } else {
        registry.with(file_layer).try_init()
    };
    installed.map_err(|e| ReportError::LogSetup(e.to_string()))?;

    tracing::info!(dir = %dir.display(), "logs are being written to {LOG_FILE_NAME}");
    Ok(Some(guard))
}
