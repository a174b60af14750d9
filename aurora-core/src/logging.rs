//! Logging setup for Aurora Shell, built on the `tracing` ecosystem.
//!
//! Console output goes to stderr; an optional daily-rolling log file can
//! be enabled through [`LoggingConfig`]. The file writer's worker guard
//! is kept in a process-wide static so buffered records are flushed on
//! shutdown.

use std::path::Path;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::CoreError;

/// Keeps the non-blocking file writer alive for the process lifetime.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Minimal stderr logging for early startup and tests.
///
/// Filters via `RUST_LOG`, defaulting to "info". Errors (e.g. a global
/// subscriber already being set) are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

/// Initialize the global logging system from [`LoggingConfig`].
///
/// Fails if the level filter is invalid or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| {
        CoreError::LoggingInitialization(format!("invalid level filter '{}': {e}", config.level))
    })?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr));

    match &config.file {
        Some(path) => {
            let (file, guard) = file_layer(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init()
                .map_err(|e| CoreError::LoggingInitialization(e.to_string()))?;
            *LOG_WORKER_GUARD.lock().expect("log guard mutex poisoned") = Some(guard);
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()
                .map_err(|e| CoreError::LoggingInitialization(e.to_string()))?;
        }
    }
    Ok(())
}

/// Build the daily-rolling file layer for `log_path`, creating the
/// parent directory if needed.
fn file_layer<S>(
    log_path: &Path,
) -> Result<(fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, tracing_appender::non_blocking::NonBlocking>, WorkerGuard), CoreError>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| CoreError::Filesystem {
                message: "failed to create log directory".to_string(),
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let directory = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("aurora-shell.log"));
    let appender = tracing_appender::rolling::daily(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    Ok((layer, guard))
}
